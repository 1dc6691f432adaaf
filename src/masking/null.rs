use super::{MaskingSecrets, MaskingStrategy};
use crate::errors::StrategyResult;
use crate::registry::StrategyDescriptor;
use crate::schema::{ConfigSchema, ValidatedConfig};

pub(super) const KEY: &str = "null_rewrite";

pub(super) fn descriptor() -> StrategyDescriptor {
    StrategyDescriptor::new(
        KEY,
        "Masks the input value with a null value",
        ConfigSchema::new(),
    )
}

pub(super) fn build(_: ValidatedConfig, _: &MaskingSecrets) -> StrategyResult<MaskingStrategy> {
    Ok(MaskingStrategy::Null(NullRewriteStrategy))
}

/// Replaces every value with an absent one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRewriteStrategy;

impl NullRewriteStrategy {
    pub fn mask(&self, values: &[Option<String>]) -> Vec<Option<String>> {
        vec![None; values.len()]
    }
}
