use super::format::{format_preservation_field, preserve, FormatPreservation};
use super::{mask_each, MaskingSecrets, MaskingStrategy};
use crate::errors::StrategyResult;
use crate::registry::StrategyDescriptor;
use crate::schema::{ConfigSchema, FieldSpec, ValidatedConfig};
use rand::rngs::OsRng;
use rand::Rng;
use serde::Deserialize;
use serde_json::json;

pub(super) const KEY: &str = "random_string_rewrite";

/// Characters random replacements are drawn from.
pub const RANDOM_STRING_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Replacement length when none is configured.
pub const DEFAULT_RANDOM_STRING_LENGTH: usize = 30;

/// Longest replacement a configuration may request.
pub const MAX_RANDOM_STRING_LENGTH: usize = 4096;

pub(super) fn descriptor() -> StrategyDescriptor {
    StrategyDescriptor::new(
        KEY,
        "Masks the input value with a random string of a specified length",
        ConfigSchema::new()
            .field(
                FieldSpec::integer("length", 1, "Specifies the length of the random string")
                    .at_most(MAX_RANDOM_STRING_LENGTH as i64)
                    .with_default(json!(DEFAULT_RANDOM_STRING_LENGTH)),
            )
            .field(format_preservation_field()),
    )
}

pub(super) fn build(
    config: ValidatedConfig,
    _: &MaskingSecrets,
) -> StrategyResult<MaskingStrategy> {
    let config: RandomStringRewriteConfig = config.into_typed()?;
    Ok(MaskingStrategy::RandomStringRewrite(
        RandomStringRewriteStrategy::new(config),
    ))
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomStringRewriteConfig {
    pub length: usize,
    #[serde(default)]
    pub format_preservation: Option<FormatPreservation>,
}

/// Replaces every present value with fresh random characters.
///
/// Draws come straight from the OS generator, so concurrent callers never
/// share generator state.
#[derive(Debug, Clone)]
pub struct RandomStringRewriteStrategy {
    length: usize,
    format_preservation: Option<FormatPreservation>,
}

impl RandomStringRewriteStrategy {
    pub fn new(config: RandomStringRewriteConfig) -> Self {
        Self {
            length: config.length,
            format_preservation: config.format_preservation,
        }
    }

    pub fn mask(&self, values: &[Option<String>]) -> Vec<Option<String>> {
        mask_each(values, |_| {
            preserve(self.format_preservation.as_ref(), random_string(self.length))
        })
    }
}

fn random_string(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| RANDOM_STRING_ALPHABET[rng.gen_range(0..RANDOM_STRING_ALPHABET.len())] as char)
        .collect()
}
