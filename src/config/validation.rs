use super::{BindMode, Config};
use anyhow::Result;
use tracing::warn;

/// Validation errors for configuration.
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validate a configuration object.
pub fn validate_config(config: &Config) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ConfigValidationError {
            path: "server.port".to_string(),
            message: "Port must be greater than 0".to_string(),
        });
    }

    if config.server.bind == BindMode::Custom && config.server.custom_bind_host.is_none() {
        errors.push(ConfigValidationError {
            path: "server.customBindHost".to_string(),
            message: "Custom bind mode requires a host".to_string(),
        });
    }

    if let Some(key) = &config.masking.hmac_key {
        if key.is_empty() {
            errors.push(ConfigValidationError {
                path: "masking.hmacKey".to_string(),
                message: "HMAC key must not be empty".to_string(),
            });
        }
    } else {
        warn!("No masking HMAC key configured; a random key will be used for this process");
    }

    if let Some(key) = &config.masking.encryption_key {
        let hex_ok = key.chars().all(|c| c.is_ascii_hexdigit());
        if !hex_ok || !(key.len() == 32 || key.len() == 64) {
            errors.push(ConfigValidationError {
                path: "masking.encryptionKey".to_string(),
                message: "Encryption key must be 32 or 64 hex characters".to_string(),
            });
        }
    }

    errors
}

/// Validate configuration and return Result.
pub fn validate_config_object(config: &Config) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        anyhow::bail!("Configuration validation failed:\n{}", messages.join("\n"));
    }
}
