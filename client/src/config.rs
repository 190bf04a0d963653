use std::path::PathBuf;

use anyhow::{Context, Result};
use winrate_protocol::Format;

use crate::simulation::DEFAULT_SIMULATOR_URL;
use crate::species::POKEAPI_URL;

pub const DEFAULT_TRIALS: u32 = 100;

/// Endpoints and defaults for a client session
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub pokeapi_url: String,
    pub simulator_url: String,
    /// Directory holding the persisted teams
    pub storage_dir: PathBuf,
    pub format: Format,
    pub trials: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            pokeapi_url: POKEAPI_URL.to_string(),
            simulator_url: DEFAULT_SIMULATOR_URL.to_string(),
            storage_dir: PathBuf::from("./teams"),
            format: Format::default(),
            trials: DEFAULT_TRIALS,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by any `WINRATE_*` variables that are set
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("WINRATE_POKEAPI_URL") {
            config.pokeapi_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("WINRATE_SIMULATOR_URL") {
            config.simulator_url = url;
        }
        if let Some(dir) = lookup("WINRATE_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(code) = lookup("WINRATE_FORMAT") {
            config.format = code
                .parse()
                .with_context(|| format!("WINRATE_FORMAT is not a known format: {code}"))?;
        }
        if let Some(trials) = lookup("WINRATE_TRIALS") {
            config.trials = trials
                .parse()
                .with_context(|| format!("WINRATE_TRIALS is not a number: {trials}"))?;
            anyhow::ensure!(config.trials > 0, "WINRATE_TRIALS must be at least 1");
        }

        Ok(config)
    }
}
