use super::format::{format_preservation_field, preserve, FormatPreservation};
use super::{mask_each, MaskingSecrets, MaskingStrategy};
use crate::errors::StrategyResult;
use crate::registry::StrategyDescriptor;
use crate::schema::{ConfigSchema, FieldSpec, ValidatedConfig};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256, Sha512};

pub(super) const KEY: &str = "hash";

/// Accepted values of the `algorithm` field.
pub const HASH_ALGORITHMS: &[&str] = &["SHA-256", "SHA-512"];

/// Digest used by the hash and HMAC strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "SHA-256")]
    Sha256,
    #[serde(rename = "SHA-512")]
    Sha512,
}

pub(super) fn algorithm_field() -> FieldSpec {
    FieldSpec::choice("algorithm", HASH_ALGORITHMS, "Specifies the hash algorithm")
        .with_default(json!("SHA-256"))
}

pub(super) fn descriptor() -> StrategyDescriptor {
    StrategyDescriptor::new(
        KEY,
        "Masks the input value by returning a hashed version of the input value",
        ConfigSchema::new()
            .field(algorithm_field())
            .field(
                FieldSpec::text("salt", "Prepended to the value before hashing")
                    .with_default(json!("")),
            )
            .field(format_preservation_field()),
    )
}

pub(super) fn build(
    config: ValidatedConfig,
    _: &MaskingSecrets,
) -> StrategyResult<MaskingStrategy> {
    let config: HashConfig = config.into_typed()?;
    Ok(MaskingStrategy::Hash(HashStrategy::new(config)))
}

#[derive(Debug, Clone, Deserialize)]
pub struct HashConfig {
    #[serde(default)]
    pub algorithm: HashAlgorithm,
    #[serde(default)]
    pub salt: String,
    #[serde(default)]
    pub format_preservation: Option<FormatPreservation>,
}

/// One-way digest of `salt || value`, rendered as lowercase hex.
#[derive(Debug, Clone)]
pub struct HashStrategy {
    algorithm: HashAlgorithm,
    salt: String,
    format_preservation: Option<FormatPreservation>,
}

impl HashStrategy {
    pub fn new(config: HashConfig) -> Self {
        Self {
            algorithm: config.algorithm,
            salt: config.salt,
            format_preservation: config.format_preservation,
        }
    }

    pub fn mask(&self, values: &[Option<String>]) -> Vec<Option<String>> {
        mask_each(values, |value| {
            preserve(self.format_preservation.as_ref(), self.digest(value))
        })
    }

    fn digest(&self, value: &str) -> String {
        match self.algorithm {
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(self.salt.as_bytes());
                hasher.update(value.as_bytes());
                hex::encode(hasher.finalize())
            }
            HashAlgorithm::Sha512 => {
                let mut hasher = Sha512::new();
                hasher.update(self.salt.as_bytes());
                hasher.update(value.as_bytes());
                hex::encode(hasher.finalize())
            }
        }
    }
}
