//! Wire types shared by the roster engine and its service clients.
//!
//! ```text
//! winrate-protocol (wire format)
//!        │
//!        ├─> winrate-team (rosters, stat budgets, persistence)
//!        └─> winrate-client (species lookups, simulation runs)
//! ```

use thiserror::Error;

pub mod format;
pub mod pokemon_type;
pub mod simulation;
pub mod species;
pub mod stat;

pub use format::{FORMAT_CATALOG, Format};
pub use pokemon_type::Type;
pub use simulation::{SimulationResponse, SimulationSummary, TeamErrors, WinRates};
pub use species::{NamedResource, PokeApiPokemon, TypeSlot};
pub use stat::Stat;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Unknown format code: {0}")]
    UnknownFormat(String),
}
