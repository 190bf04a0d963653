//! Team rosters and the rules that constrain editing them.
//!
//! # Overview
//!
//! A team is an ordered [`Roster`] of at most six [`PokemonSet`]s. Edits are
//! field patches ([`PokemonPatch`]) applied by position or by [`SlotId`].
//! Stat edits go through [`propose_ev`] / [`propose_iv`] first, so a set
//! never exceeds 252 EVs in a stat or 510 in total.
//!
//! [`PersistedState`] mirrors a value to [`Storage`] once it has been
//! hydrated from it, and [`TeamEditor`] combines the pieces for one team:
//!
//! ```text
//! UI edit ──> TeamEditor ──> propose_ev / propose_iv
//!                 │
//!                 ├─> Roster (add / update / remove)
//!                 ├─> PersistedState<Roster> ──> Storage
//!                 └─> LookupTracker (species lookups, latest wins)
//! ```
//!
//! # Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use winrate_team::{MemoryStorage, PokemonSet, Roster, Stat, TeamEditor};
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let mut team = TeamEditor::open("team1", Roster::new(), storage.clone());
//!
//! team.add(PokemonSet::new("Articuno")).unwrap();
//! team.set_ev(0, Stat::Spa, 252).unwrap();
//! assert!(team.set_ev(0, Stat::Atk, 253).is_err());
//!
//! assert_eq!(storage.writes().len(), 2);
//! ```

pub mod editor;
pub mod lookup;
pub mod persist;
pub mod roster;
pub mod set;
pub mod slug;
pub mod stats;
pub mod storage;

pub use editor::{EditError, Resolution, TeamEditor};
pub use lookup::{LookupTicket, LookupTracker};
pub use persist::{Hydration, PersistError, PersistedState};
pub use roster::{ROSTER_CAPACITY, Roster, RosterError, SlotId};
pub use set::{PokemonPatch, PokemonSet};
pub use stats::{
    EvSpread, IvSpread, MAX_IV, MAX_STAT_EV, MAX_TOTAL_EV, StatError, propose_ev, propose_iv,
};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

pub use winrate_protocol::{Stat, Type};
