use super::format::{format_preservation_field, preserve, FormatPreservation};
use super::hash::{algorithm_field, HashAlgorithm};
use super::{try_mask_each, MaskingSecrets, MaskingStrategy};
use crate::errors::{StrategyError, StrategyResult, ValidationErrors};
use crate::registry::StrategyDescriptor;
use crate::schema::{ConfigSchema, FieldSpec, ValidatedConfig};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::{Sha256, Sha512};
use std::fmt;

pub(super) const KEY: &str = "hmac";

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

pub(super) fn descriptor() -> StrategyDescriptor {
    StrategyDescriptor::new(
        KEY,
        "Masks the input value by using the HMAC algorithm along with a hashed version of the data and a secret key",
        ConfigSchema::new()
            .field(algorithm_field())
            .field(FieldSpec::text(
                "key",
                "Secret key; defaults to the process masking key when omitted",
            ))
            .field(
                FieldSpec::text("salt", "Appended to the value before signing")
                    .with_default(json!("")),
            )
            .field(format_preservation_field()),
    )
}

pub(super) fn build(
    config: ValidatedConfig,
    secrets: &MaskingSecrets,
) -> StrategyResult<MaskingStrategy> {
    let config: HmacConfig = config.into_typed()?;
    Ok(MaskingStrategy::Hmac(HmacStrategy::new(config, secrets)?))
}

#[derive(Debug, Clone, Deserialize)]
pub struct HmacConfig {
    #[serde(default)]
    pub algorithm: HashAlgorithm,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub salt: String,
    #[serde(default)]
    pub format_preservation: Option<FormatPreservation>,
}

/// Keyed digest of `value || salt`, rendered as lowercase hex.
#[derive(Clone)]
pub struct HmacStrategy {
    algorithm: HashAlgorithm,
    key: Vec<u8>,
    salt: String,
    format_preservation: Option<FormatPreservation>,
}

impl HmacStrategy {
    /// Fails when an explicit key is empty.
    pub fn new(config: HmacConfig, secrets: &MaskingSecrets) -> StrategyResult<Self> {
        let key = match config.key {
            Some(key) if key.is_empty() => {
                return Err(ValidationErrors::single("key", "must not be empty").into());
            }
            Some(key) => key.into_bytes(),
            None => secrets.hmac_key().to_vec(),
        };
        Ok(Self {
            algorithm: config.algorithm,
            key,
            salt: config.salt,
            format_preservation: config.format_preservation,
        })
    }

    pub fn mask(&self, values: &[Option<String>]) -> StrategyResult<Vec<Option<String>>> {
        try_mask_each(values, |value| {
            let signed = self.sign(value)?;
            Ok(preserve(self.format_preservation.as_ref(), signed))
        })
    }

    fn sign(&self, value: &str) -> StrategyResult<String> {
        let invalid_key = |e: hmac::digest::InvalidLength| StrategyError::Crypto(e.to_string());
        match self.algorithm {
            HashAlgorithm::Sha256 => {
                let mut mac = HmacSha256::new_from_slice(&self.key).map_err(invalid_key)?;
                mac.update(value.as_bytes());
                mac.update(self.salt.as_bytes());
                Ok(hex::encode(mac.finalize().into_bytes()))
            }
            HashAlgorithm::Sha512 => {
                let mut mac = HmacSha512::new_from_slice(&self.key).map_err(invalid_key)?;
                mac.update(value.as_bytes());
                mac.update(self.salt.as_bytes());
                Ok(hex::encode(mac.finalize().into_bytes()))
            }
        }
    }
}

impl fmt::Debug for HmacStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacStrategy")
            .field("algorithm", &self.algorithm)
            .field("key", &"<redacted>")
            .field("format_preservation", &self.format_preservation)
            .finish_non_exhaustive()
    }
}
