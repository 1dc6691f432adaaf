use crate::schema::{ConfigSchema, FieldSpec};
use serde::Deserialize;

/// Keeps the shape of a masked value recognizable, e.g. an email domain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormatPreservation {
    pub suffix: String,
}

impl FormatPreservation {
    pub fn apply(&self, mut masked: String) -> String {
        masked.push_str(&self.suffix);
        masked
    }
}

/// Schema field shared by strategies that support format preservation.
pub fn format_preservation_field() -> FieldSpec {
    FieldSpec::object(
        "format_preservation",
        ConfigSchema::new().field(
            FieldSpec::text("suffix", "Appended to every masked value").required(),
        ),
        "Preserve the format of the masked value",
    )
}

pub(crate) fn preserve(format: Option<&FormatPreservation>, masked: String) -> String {
    match format {
        Some(f) => f.apply(masked),
        None => masked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn suffix_is_appended() {
        let format = FormatPreservation {
            suffix: "@masked.com".into(),
        };
        assert_eq!(preserve(Some(&format), "abc".into()), "abc@masked.com");
        assert_eq!(preserve(None, "abc".into()), "abc");
    }

    #[test]
    fn field_requires_suffix() {
        let schema = ConfigSchema::new().field(format_preservation_field());
        assert!(schema
            .validate(&json!({"format_preservation": {}}))
            .is_err());
        assert!(schema
            .validate(&json!({"format_preservation": {"suffix": "@x"}}))
            .is_ok());
    }
}
