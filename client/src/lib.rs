//! Async side of the team win-rate calculator.
//!
//! [`SpeciesDirectory`] answers "is this a species, and what are its types"
//! with a shared cache and one upstream call per slug at a time.
//! [`BattleOrchestrator`] submits two rosters to the simulator and keeps
//! track of the run, refusing a second submit while one is in flight.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use winrate_client::{BattleOrchestrator, ClientConfig, HttpSimulator, PokeApiSource, SpeciesDirectory};
//! use winrate_team::{PokemonSet, Roster};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let species = SpeciesDirectory::new(Arc::new(PokeApiSource::new(&config.pokeapi_url)));
//! assert!(species.validate("Articuno").await?);
//!
//! let mut team1 = Roster::new();
//! team1.add(PokemonSet::new("Articuno"))?;
//! let mut team2 = Roster::new();
//! team2.add(PokemonSet::new("Ludicolo"))?;
//!
//! let battles = BattleOrchestrator::new(HttpSimulator::new(&config.simulator_url));
//! let summary = battles.run(&team1, &team2, config.format, config.trials).await?;
//! println!("{:.1}%", summary.win_rates.player1 * 100.0);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod orchestrator;
pub mod simulation;
pub mod species;

#[cfg(test)]
mod test_support;

pub use config::{ClientConfig, DEFAULT_TRIALS};
pub use orchestrator::{BattleFailure, BattleOrchestrator, RunError, RunState};
pub use simulation::{DEFAULT_SIMULATOR_URL, HttpSimulator, SimulationRequest, SimulationTransport, TransportError};
pub use species::{
    POKEAPI_URL, PokeApiSource, SpeciesCache, SpeciesDirectory, SpeciesEntry, SpeciesError,
    SpeciesSource,
};

pub use winrate_protocol::{Format, SimulationSummary, TeamErrors};
