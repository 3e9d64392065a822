//! Sector configuration for the driver.
//!
//! A sector comes from a JSON file or the defaults, then environment
//! variables, then command-line flags, each layer overriding the last.

use bridge_movement::{RotationKind, SectorConfig};
use std::{fs, path::Path, str::FromStr};

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct SectorOverrides {
    pub name: Option<String>,
    pub movement: Option<RotationKind>,
    pub num_pairs: Option<u32>,
    pub boards_per_group: Option<u32>,
    pub relay_tables: Option<u32>,
    pub rounds: Option<u32>,
    pub switch_round: Option<u32>,
}

impl SectorOverrides {
    /// Fill unset values from `BM_MOVEMENT` and `BM_PAIRS`
    pub fn with_env(mut self) -> Self {
        self.movement = self.movement.or_else(|| env_value("BM_MOVEMENT"));
        self.num_pairs = self.num_pairs.or_else(|| env_value("BM_PAIRS"));
        self
    }

    fn apply(self, config: &mut SectorConfig) {
        if let Some(name) = self.name {
            config.name = name;
        }
        if let Some(movement) = self.movement {
            config.movement = movement;
        }
        if let Some(num_pairs) = self.num_pairs {
            config.num_pairs = num_pairs;
        }
        if let Some(boards_per_group) = self.boards_per_group {
            config.boards_per_group = boards_per_group;
        }
        if let Some(relay_tables) = self.relay_tables {
            config.relay_tables = relay_tables;
        }
        if self.rounds.is_some() {
            config.rounds = self.rounds;
        }
        if self.switch_round.is_some() {
            config.mitchell_switch_round = self.switch_round;
        }
    }
}

/// Load and validate the sector configuration
pub fn load_sector_config(
    path: Option<&Path>,
    overrides: SectorOverrides,
) -> Result<SectorConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            parse_sector_config(&text)?
        }
        None => SectorConfig::default(),
    };

    overrides.apply(&mut config);
    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}

/// Parse a JSON sector description; missing fields take their defaults
pub fn parse_sector_config(text: &str) -> Result<SectorConfig, ConfigError> {
    Ok(serde_json::from_str(text)?)
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid sector JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid sector configuration: {0}")]
    Invalid(String),
}

/// Helper to parse an environment variable, ignoring unparsable values
fn env_value<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
