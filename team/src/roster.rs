//! Bounded, ordered team rosters

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::set::{PokemonPatch, PokemonSet};

/// Maximum number of Pokemon on a team
pub const ROSTER_CAPACITY: usize = 6;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterError {
    #[error("Team is full (6)")]
    Full,

    #[error("No team slot at index {index} (team has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No team slot with id {0}")]
    UnknownSlot(SlotId),

    #[error("A team holds at most 6 Pokemon, got {0}")]
    TooMany(usize),
}

/// Identifier assigned to a roster entry when it is added.
///
/// Unlike an index it survives removals of other entries. Ids are unique
/// within one [`Roster`] value and are not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u32);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    id: SlotId,
    set: PokemonSet,
}

/// An ordered team of at most [`ROSTER_CAPACITY`] Pokemon.
///
/// Entries are addressed either by position or by [`SlotId`]. Removing an
/// entry shifts every later entry down by one position, so indices held
/// across a removal must be re-resolved; slot ids stay valid.
///
/// None of the operations check species, EV or move legality. Callers gate
/// edits through [`propose_ev`](crate::stats::propose_ev) and species
/// lookups before calling [`update`](Self::update).
///
/// Serializes as the plain ordered list of sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "Vec<PokemonSet>", try_from = "Vec<PokemonSet>")]
pub struct Roster {
    slots: Vec<Slot>,
    next_id: u32,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= ROSTER_CAPACITY
    }

    pub fn get(&self, index: usize) -> Option<&PokemonSet> {
        self.slots.get(index).map(|s| &s.set)
    }

    pub fn get_by_id(&self, id: SlotId) -> Option<&PokemonSet> {
        self.position(id).and_then(|index| self.get(index))
    }

    /// Current position of a slot
    pub fn position(&self, id: SlotId) -> Option<usize> {
        self.slots.iter().position(|s| s.id == id)
    }

    /// Slot id at a position
    pub fn id_at(&self, index: usize) -> Option<SlotId> {
        self.slots.get(index).map(|s| s.id)
    }

    /// Sets in display order
    pub fn iter(&self) -> impl Iterator<Item = &PokemonSet> {
        self.slots.iter().map(|s| &s.set)
    }

    /// Slot ids paired with their sets, in display order
    pub fn entries(&self) -> impl Iterator<Item = (SlotId, &PokemonSet)> {
        self.slots.iter().map(|s| (s.id, &s.set))
    }

    pub fn to_sets(&self) -> Vec<PokemonSet> {
        self.iter().cloned().collect()
    }

    /// Append a set. Existing positions are unaffected.
    pub fn add(&mut self, set: PokemonSet) -> Result<SlotId, RosterError> {
        if self.is_full() {
            return Err(RosterError::Full);
        }

        let id = SlotId(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot { id, set });
        Ok(id)
    }

    /// Shallow-merge `patch` onto the set at `index`
    pub fn update(&mut self, index: usize, patch: PokemonPatch) -> Result<(), RosterError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(RosterError::IndexOutOfRange { index, len })?;

        patch.apply_to(&mut slot.set);
        Ok(())
    }

    pub fn update_by_id(&mut self, id: SlotId, patch: PokemonPatch) -> Result<(), RosterError> {
        let index = self.position(id).ok_or(RosterError::UnknownSlot(id))?;
        self.update(index, patch)
    }

    /// Remove the set at `index`, shifting later entries down by one
    pub fn remove(&mut self, index: usize) -> Result<PokemonSet, RosterError> {
        if index >= self.slots.len() {
            return Err(RosterError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            });
        }

        Ok(self.slots.remove(index).set)
    }

    pub fn remove_by_id(&mut self, id: SlotId) -> Result<PokemonSet, RosterError> {
        let index = self.position(id).ok_or(RosterError::UnknownSlot(id))?;
        self.remove(index)
    }
}

/// Rosters compare by their sets in order; slot ids are not part of the value
impl PartialEq for Roster {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for Roster {}

impl From<Roster> for Vec<PokemonSet> {
    fn from(roster: Roster) -> Self {
        roster.slots.into_iter().map(|s| s.set).collect()
    }
}

impl TryFrom<Vec<PokemonSet>> for Roster {
    type Error = RosterError;

    fn try_from(sets: Vec<PokemonSet>) -> Result<Self, Self::Error> {
        if sets.len() > ROSTER_CAPACITY {
            return Err(RosterError::TooMany(sets.len()));
        }

        let mut roster = Roster::new();
        for set in sets {
            roster.add(set)?;
        }
        Ok(roster)
    }
}
