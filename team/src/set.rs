//! A single team member and field-level patches to it

use serde::{Deserialize, Serialize};
use winrate_protocol::Type;

use crate::stats::{EvSpread, IvSpread};

/// One Pokemon as it appears in a roster and in simulation requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonSet {
    /// Nickname; serialized as `name` to match the simulator payload
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    /// Species display name (e.g. "Articuno")
    pub species: String,

    /// Resolved type tags in slot order, once the species lookup has answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<Type>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nature: Option<String>,

    #[serde(default)]
    pub evs: EvSpread,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ivs: Option<IvSpread>,

    #[serde(default)]
    pub moves: Vec<String>,
}

impl PokemonSet {
    pub fn new(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            ..Self::default()
        }
    }

    /// Display name (nickname if set and non-empty, otherwise species)
    pub fn name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.species)
    }

    /// IVs in effect, filling in the default when no override is stored
    pub fn effective_ivs(&self) -> IvSpread {
        self.ivs.unwrap_or_default()
    }
}

/// A shallow field patch for [`PokemonSet`].
///
/// Absent fields leave the target untouched. Optional fields use a nested
/// `Option`: `Some(None)` clears the field. Nested values (`evs`, `ivs`,
/// `moves`) are replaced wholesale, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PokemonPatch {
    pub nickname: Option<Option<String>>,
    pub species: Option<String>,
    pub types: Option<Option<Vec<Type>>>,
    pub item: Option<Option<String>>,
    pub gender: Option<Option<String>>,
    pub ability: Option<Option<String>>,
    pub nature: Option<Option<String>>,
    pub evs: Option<EvSpread>,
    pub ivs: Option<Option<IvSpread>>,
    pub moves: Option<Vec<String>>,
}

impl PokemonPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(Some(nickname.into()));
        self
    }

    pub fn species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    pub fn types(mut self, types: Vec<Type>) -> Self {
        self.types = Some(Some(types));
        self
    }

    pub fn clear_types(mut self) -> Self {
        self.types = Some(None);
        self
    }

    pub fn item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(Some(item.into()));
        self
    }

    pub fn clear_item(mut self) -> Self {
        self.item = Some(None);
        self
    }

    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(Some(gender.into()));
        self
    }

    pub fn ability(mut self, ability: impl Into<String>) -> Self {
        self.ability = Some(Some(ability.into()));
        self
    }

    pub fn nature(mut self, nature: impl Into<String>) -> Self {
        self.nature = Some(Some(nature.into()));
        self
    }

    pub fn evs(mut self, evs: EvSpread) -> Self {
        self.evs = Some(evs);
        self
    }

    pub fn ivs(mut self, ivs: IvSpread) -> Self {
        self.ivs = Some(Some(ivs));
        self
    }

    pub fn moves<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moves = Some(moves.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch to `set`
    pub fn apply_to(self, set: &mut PokemonSet) {
        if let Some(nickname) = self.nickname {
            set.nickname = nickname;
        }
        if let Some(species) = self.species {
            set.species = species;
        }
        if let Some(types) = self.types {
            set.types = types;
        }
        if let Some(item) = self.item {
            set.item = item;
        }
        if let Some(gender) = self.gender {
            set.gender = gender;
        }
        if let Some(ability) = self.ability {
            set.ability = ability;
        }
        if let Some(nature) = self.nature {
            set.nature = nature;
        }
        if let Some(evs) = self.evs {
            set.evs = evs;
        }
        if let Some(ivs) = self.ivs {
            set.ivs = ivs;
        }
        if let Some(moves) = self.moves {
            set.moves = moves;
        }
    }
}
