//! Species service payloads
//!
//! Only the part of the `/pokemon/{slug}` document the roster engine needs
//! is modelled; everything else in the body is ignored.

use serde::{Deserialize, Serialize};

use crate::{ParseError, Type};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// One entry of a species' type list, with its authoritative slot index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSlot {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokeApiPokemon {
    #[serde(default)]
    pub name: String,
    pub types: Vec<TypeSlot>,
}

impl PokeApiPokemon {
    /// Parse a species document from JSON
    pub fn parse(body: &str) -> Result<Self, ParseError> {
        serde_json::from_str(body).map_err(|e| ParseError::InvalidFormat(e.to_string()))
    }

    /// Types ordered by slot index, regardless of response order
    pub fn ordered_types(&self) -> Result<Vec<Type>, ParseError> {
        let mut slots: Vec<&TypeSlot> = self.types.iter().collect();
        slots.sort_by_key(|s| s.slot);

        slots
            .into_iter()
            .map(|s| s.kind.name.parse::<Type>())
            .collect()
    }
}
