//! Runtime configuration
//!
//! Tunables for the scheduler and driver, loadable from an optional
//! `cadence.toml` with `CADENCE_*` environment overrides.

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bound on re-entrant resumes from synchronously fired continuations.
    /// A registrar chain that keeps firing synchronously past this depth
    /// fails its task instead of overflowing the stack.
    pub max_sync_resumes: usize,

    /// Tick budget for `block_on`; 0 means unbounded.
    pub max_ticks: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_sync_resumes: 64,
            max_ticks: 0,
        }
    }
}

impl Config {
    /// Load configuration from `cadence.toml` (if present) and `CADENCE_*`
    /// environment variables, falling back to defaults for anything unset.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("cadence").required(false))
            .add_source(config::Environment::with_prefix("CADENCE"))
            .build()
            .context("Failed to load configuration")?;

        settings
            .try_deserialize()
            .context("Failed to parse configuration")
    }
}
