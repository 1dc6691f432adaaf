mod defaults;
mod io;
mod types;
mod validation;

pub use defaults::*;
pub use io::*;
pub use types::*;
pub use validation::*;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Top-level privops configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub masking: MaskingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file, environment, and defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path
            .map(PathBuf::from)
            .or_else(find_config_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if config_path.exists() {
            info!("Loading config from {}", config_path.display());
            load_config_file(&config_path)?
        } else {
            info!("No config file found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Write default configuration to a file.
    pub fn write_default(path: &str) -> Result<()> {
        write_config_file(Path::new(path), &Config::default())
    }

    /// Apply environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PRIVOPS_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid PRIVOPS_PORT '{port}'"),
            }
        }

        if let Some(bind) = lookup("PRIVOPS_BIND") {
            match bind.parse() {
                Ok(mode) => self.server.bind = mode,
                Err(e) => warn!("Ignoring PRIVOPS_BIND: {e}"),
            }
        }

        if let Some(level) = lookup("PRIVOPS_LOG_LEVEL") {
            match level.parse() {
                Ok(level) => self.logging.level = level,
                Err(e) => warn!("Ignoring PRIVOPS_LOG_LEVEL: {e}"),
            }
        }

        if let Some(key) = lookup("PRIVOPS_MASKING_HMAC_KEY") {
            self.masking.hmac_key = Some(key);
        }

        if let Some(key) = lookup("PRIVOPS_MASKING_ENCRYPTION_KEY") {
            self.masking.encryption_key = Some(key);
        }
    }
}

/// Find the configuration file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    let candidates = [
        PathBuf::from("privops.json"),
        PathBuf::from("privops.yaml"),
        PathBuf::from("privops.yml"),
        PathBuf::from("privops.toml"),
    ];

    if let Some(path) = candidates.iter().find(|p| p.exists()) {
        return Some(path.clone());
    }

    dirs::home_dir()
        .map(|home| home.join(HOME_CONFIG_DIR).join("config.json"))
        .filter(|p| p.exists())
}
