//! Application configuration loaded from a TOML file.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `seed_csv` | none | CSV file to seed the registry from; built-in roster when absent. |
//! | `default_search_mode` | `by_name` | `by_name` \| `by_class` \| `all`. |
//! | `notification_ttl_ms` | 3000 | How long a notification stays on screen. |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::query::SearchMode;

fn default_notification_ttl_ms() -> u64 {
    3000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub seed_csv: Option<PathBuf>,

    #[serde(default)]
    pub default_search_mode: SearchMode,

    #[serde(default = "default_notification_ttl_ms")]
    pub notification_ttl_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            seed_csv: None,
            default_search_mode: SearchMode::default(),
            notification_ttl_ms: default_notification_ttl_ms(),
        }
    }
}

impl Config {
    /// Read `path`, or fall back to defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Config::default());
        };

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Config::from_toml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        // Relative seed paths are resolved against the config file's directory.
        if let (Some(seed), Some(dir)) = (config.seed_csv.as_ref(), path.parent()) {
            if seed.is_relative() {
                config.seed_csv = Some(dir.join(seed));
            }
        }

        log::debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }
}
