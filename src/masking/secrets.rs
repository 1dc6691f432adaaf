use super::aes_encrypt::parse_key;
use crate::config::MaskingConfig;
use crate::errors::{StrategyResult, ValidationError, ValidationErrors};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

/// Length of generated process secrets, in bytes.
const GENERATED_SECRET_LEN: usize = 32;

/// Process-wide keys used when a strategy configuration omits its own.
#[derive(Clone)]
pub struct MaskingSecrets {
    hmac_key: Vec<u8>,
    encryption_key: Vec<u8>,
}

impl MaskingSecrets {
    /// Draws fresh random keys from the OS generator.
    pub fn generate() -> Self {
        Self {
            hmac_key: random_bytes(GENERATED_SECRET_LEN),
            encryption_key: random_bytes(GENERATED_SECRET_LEN),
        }
    }

    /// Uses configured keys, generating whichever is not configured.
    pub fn from_config(config: &MaskingConfig) -> StrategyResult<Self> {
        let mut errors = Vec::new();

        let hmac_key = match config.hmac_key.as_deref() {
            Some("") => {
                errors.push(ValidationError::new("masking.hmacKey", "must not be empty"));
                Vec::new()
            }
            Some(key) => key.as_bytes().to_vec(),
            None => random_bytes(GENERATED_SECRET_LEN),
        };

        let encryption_key = match config.encryption_key.as_deref() {
            Some(hex_key) => parse_key(hex_key).unwrap_or_else(|msg| {
                errors.push(ValidationError::new("masking.encryptionKey", msg));
                Vec::new()
            }),
            None => random_bytes(GENERATED_SECRET_LEN),
        };

        if !errors.is_empty() {
            return Err(ValidationErrors::new(errors).into());
        }
        Ok(Self {
            hmac_key,
            encryption_key,
        })
    }

    pub fn hmac_key(&self) -> &[u8] {
        &self.hmac_key
    }

    pub fn encryption_key(&self) -> &[u8] {
        &self.encryption_key
    }
}

impl fmt::Debug for MaskingSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskingSecrets")
            .field("hmac_key", &"<redacted>")
            .field("encryption_key", &"<redacted>")
            .finish()
    }
}

fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secrets_differ() {
        let a = MaskingSecrets::generate();
        let b = MaskingSecrets::generate();
        assert_eq!(a.encryption_key().len(), 32);
        assert_ne!(a.hmac_key(), b.hmac_key());
        assert_ne!(a.encryption_key(), b.encryption_key());
    }

    #[test]
    fn configured_keys_are_used() {
        let config = MaskingConfig {
            hmac_key: Some("process-hmac".into()),
            encryption_key: Some("00112233445566778899aabbccddeeff".into()),
        };
        let secrets = MaskingSecrets::from_config(&config).unwrap();
        assert_eq!(secrets.hmac_key(), b"process-hmac");
        assert_eq!(secrets.encryption_key().len(), 16);
    }

    #[test]
    fn invalid_configured_keys_are_rejected() {
        let config = MaskingConfig {
            hmac_key: Some(String::new()),
            encryption_key: Some("not-hex".into()),
        };
        let err = MaskingSecrets::from_config(&config).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn debug_output_hides_keys() {
        let rendered = format!("{:?}", MaskingSecrets::generate());
        assert!(rendered.contains("<redacted>"));
    }
}
