// config.rs - Board size, cadence and seed, loaded from TOML

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::grid::{DEFAULT_COLS, DEFAULT_LIVE_PROBABILITY, DEFAULT_ROWS};

// Reference delay between two generations while running
pub const DEFAULT_STEP_DELAY_MS: u64 = 300;

/// Board and cadence settings, loaded from a TOML file such as `life.toml`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LifeConfig {
    pub rows: usize,
    pub cols: usize,
    pub step_delay_ms: u64,
    pub live_probability: f64,
    /// Fixed seed for the randomize intent; OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            live_probability: DEFAULT_LIVE_PROBABILITY,
            seed: None,
        }
    }
}

impl LifeConfig {
    /// Loads and validates the configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config: LifeConfig = toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML from '{}': {}", path_ref.display(), e))?;

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid config in '{}': {}", path_ref.display(), e))?;
        Ok(config)
    }

    /// Like [`LifeConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            log::debug!("No config at '{}', using defaults", path.as_ref().display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            anyhow::bail!("rows and cols must be greater than 0 (got {}x{}).", self.rows, self.cols);
        }
        if self.step_delay_ms == 0 {
            anyhow::bail!("step_delay_ms must be greater than 0.");
        }
        if !(0.0..=1.0).contains(&self.live_probability) {
            anyhow::bail!("live_probability must be within [0, 1] (got {}).", self.live_probability);
        }
        Ok(())
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}
