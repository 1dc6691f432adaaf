//! Masking strategies.
//!
//! Every strategy maps a sequence of optional values to a sequence of the
//! same length and order. Elements are masked independently and an absent
//! input always yields an absent output.

mod aes_encrypt;
mod format;
mod hash;
mod keyed_hash;
mod null;
mod random_string;
mod secrets;
mod string_rewrite;

pub use aes_encrypt::*;
pub use format::*;
pub use hash::*;
pub use keyed_hash::*;
pub use null::*;
pub use random_string::*;
pub use secrets::*;
pub use string_rewrite::*;

use crate::errors::{StrategyFamily, StrategyResult};
use crate::registry::StrategyRegistry;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Registry type for the masking family.
pub type MaskingRegistry = StrategyRegistry<MaskingStrategy, MaskingSecrets>;

/// Caller metadata passed alongside the values being masked.
#[derive(Debug, Clone, Default)]
pub struct MaskingContext {
    pub request_id: Option<String>,
}

/// Plain values alongside their masked counterparts, position by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskingResult {
    pub plain: Vec<Option<String>>,
    #[serde(rename = "masked_values")]
    pub masked: Vec<Option<String>>,
}

/// A configured masking strategy.
#[derive(Debug)]
pub enum MaskingStrategy {
    Null(NullRewriteStrategy),
    StringRewrite(StringRewriteStrategy),
    RandomStringRewrite(RandomStringRewriteStrategy),
    Hash(HashStrategy),
    Hmac(HmacStrategy),
    AesEncrypt(AesEncryptStrategy),
}

impl MaskingStrategy {
    pub fn key(&self) -> &'static str {
        match self {
            MaskingStrategy::Null(_) => null::KEY,
            MaskingStrategy::StringRewrite(_) => string_rewrite::KEY,
            MaskingStrategy::RandomStringRewrite(_) => random_string::KEY,
            MaskingStrategy::Hash(_) => hash::KEY,
            MaskingStrategy::Hmac(_) => keyed_hash::KEY,
            MaskingStrategy::AesEncrypt(_) => aes_encrypt::KEY,
        }
    }

    pub fn mask(
        &self,
        values: &[Option<String>],
        context: Option<&MaskingContext>,
    ) -> StrategyResult<Vec<Option<String>>> {
        debug!(
            strategy = self.key(),
            count = values.len(),
            request_id = context.and_then(|c| c.request_id.as_deref()),
            "Masking values"
        );
        match self {
            MaskingStrategy::Null(s) => Ok(s.mask(values)),
            MaskingStrategy::StringRewrite(s) => Ok(s.mask(values)),
            MaskingStrategy::RandomStringRewrite(s) => Ok(s.mask(values)),
            MaskingStrategy::Hash(s) => Ok(s.mask(values)),
            MaskingStrategy::Hmac(s) => s.mask(values),
            MaskingStrategy::AesEncrypt(s) => s.mask(values),
        }
    }
}

/// Registers the built-in masking strategies in catalog order.
pub fn register_builtin(registry: &mut MaskingRegistry) -> StrategyResult<()> {
    registry.register(null::descriptor(), null::build)?;
    registry.register(string_rewrite::descriptor(), string_rewrite::build)?;
    registry.register(random_string::descriptor(), random_string::build)?;
    registry.register(hash::descriptor(), hash::build)?;
    registry.register(keyed_hash::descriptor(), keyed_hash::build)?;
    registry.register(aes_encrypt::descriptor(), aes_encrypt::build)?;
    Ok(())
}

/// A fresh registry holding the built-in masking strategies.
pub fn builtin_registry() -> StrategyResult<MaskingRegistry> {
    let mut registry = StrategyRegistry::new(StrategyFamily::Masking);
    register_builtin(&mut registry)?;
    Ok(registry)
}

/// Applies `f` to every present value, keeping absent ones absent.
fn mask_each<F>(values: &[Option<String>], mut f: F) -> Vec<Option<String>>
where
    F: FnMut(&str) -> String,
{
    values.iter().map(|v| v.as_deref().map(&mut f)).collect()
}

/// Fallible variant of [`mask_each`]; stops at the first failure.
fn try_mask_each<F>(values: &[Option<String>], mut f: F) -> StrategyResult<Vec<Option<String>>>
where
    F: FnMut(&str) -> StrategyResult<String>,
{
    values
        .iter()
        .map(|v| v.as_deref().map(&mut f).transpose())
        .collect()
}
