use super::Config;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Maximum size for a config file (1 MB).
pub const MAX_CONFIG_FILE_BYTES: u64 = 1024 * 1024;

/// Parse a JSON5 configuration string; plain JSON is a subset.
pub fn parse_config_json5(content: &str) -> Result<serde_json::Value> {
    let value: serde_json::Value = json5::from_str(content)?;
    Ok(value)
}

/// Read a configuration file into a JSON value, choosing the parser by extension.
pub fn read_config_value(path: &Path) -> Result<serde_json::Value> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Cannot stat config file '{}'", path.display()))?;

    if metadata.len() > MAX_CONFIG_FILE_BYTES {
        bail!(
            "Config file '{}' is {} bytes, exceeds limit of {} bytes",
            path.display(),
            metadata.len(),
            MAX_CONFIG_FILE_BYTES,
        );
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

    match path.extension().and_then(|e| e.to_str()).unwrap_or("json") {
        "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
        "toml" => Ok(toml::from_str(&content)?),
        _ => parse_config_json5(&content),
    }
}

/// Load a typed configuration from a file.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let value = read_config_value(path)?;
    serde_json::from_value(value)
        .with_context(|| format!("Invalid configuration in '{}'", path.display()))
}

/// Write configuration to a JSON file.
pub fn write_config_file(path: &Path, config: &Config) -> Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file '{}'", path.display()))?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
