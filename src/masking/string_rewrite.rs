use super::format::{format_preservation_field, preserve, FormatPreservation};
use super::{mask_each, MaskingSecrets, MaskingStrategy};
use crate::errors::StrategyResult;
use crate::registry::StrategyDescriptor;
use crate::schema::{ConfigSchema, FieldSpec, ValidatedConfig};
use serde::Deserialize;

pub(super) const KEY: &str = "string_rewrite";

pub(super) fn descriptor() -> StrategyDescriptor {
    StrategyDescriptor::new(
        KEY,
        "Masks the input value with a default string value",
        ConfigSchema::new()
            .field(
                FieldSpec::text("rewrite_value", "The string that will replace existing values")
                    .required(),
            )
            .field(format_preservation_field()),
    )
}

pub(super) fn build(
    config: ValidatedConfig,
    _: &MaskingSecrets,
) -> StrategyResult<MaskingStrategy> {
    let config: StringRewriteConfig = config.into_typed()?;
    Ok(MaskingStrategy::StringRewrite(StringRewriteStrategy::new(config)))
}

#[derive(Debug, Clone, Deserialize)]
pub struct StringRewriteConfig {
    pub rewrite_value: String,
    #[serde(default)]
    pub format_preservation: Option<FormatPreservation>,
}

/// Replaces every present value with a fixed string.
#[derive(Debug, Clone)]
pub struct StringRewriteStrategy {
    rewrite_value: String,
    format_preservation: Option<FormatPreservation>,
}

impl StringRewriteStrategy {
    pub fn new(config: StringRewriteConfig) -> Self {
        Self {
            rewrite_value: config.rewrite_value,
            format_preservation: config.format_preservation,
        }
    }

    pub fn mask(&self, values: &[Option<String>]) -> Vec<Option<String>> {
        mask_each(values, |_| {
            preserve(self.format_preservation.as_ref(), self.rewrite_value.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(rewrite_value: &str, suffix: Option<&str>) -> StringRewriteStrategy {
        StringRewriteStrategy::new(StringRewriteConfig {
            rewrite_value: rewrite_value.into(),
            format_preservation: suffix.map(|s| FormatPreservation { suffix: s.into() }),
        })
    }

    #[test]
    fn rewrites_verbatim() {
        let masked = strategy("mate", None).mask(&[Some("check".into())]);
        assert_eq!(masked, vec![Some("mate".to_string())]);
    }

    #[test]
    fn keeps_positions_and_absent_values() {
        let masked = strategy("x", None).mask(&[Some("a".into()), None, Some("a".into())]);
        assert_eq!(masked, vec![Some("x".into()), None, Some("x".into())]);
    }

    #[test]
    fn applies_format_preservation() {
        let masked = strategy("masked", Some("@example.com")).mask(&[Some("me@here.org".into())]);
        assert_eq!(masked, vec![Some("masked@example.com".to_string())]);
    }

    #[test]
    fn rewrite_value_is_required() {
        let err = descriptor()
            .schema
            .validate(&serde_json::json!({"wrong": "config"}))
            .unwrap_err();
        let paths: Vec<&str> = err.errors().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["wrong", "rewrite_value"]);
    }
}
