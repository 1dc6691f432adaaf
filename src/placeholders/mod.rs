//! Secret placeholder resolution for connector templates.
//!
//! A placeholder is a secret name in angle brackets, `<name>` or `<<name>>`.
//! Every referenced name must exist in the connection secrets; if one is
//! missing nothing is substituted and the whole template fails.

use crate::errors::{StrategyError, StrategyResult};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use tracing::debug;

/// Secret name to value, owned by the calling connection configuration.
pub type ConnectionSecrets = HashMap<String, String>;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<<([A-Za-z0-9_.\-]+)>>|<([A-Za-z0-9_.\-]+)>")
        .expect("placeholder pattern is valid")
});

/// A placeholder occurrence inside a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRef<'a> {
    /// The referenced secret name.
    pub name: &'a str,
    /// The full token as written, brackets included.
    pub raw: &'a str,
}

fn captured_name<'a>(caps: &Captures<'a>) -> Option<&'a str> {
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Lists placeholders in order of appearance.
pub fn find_placeholders(template: &str) -> Vec<PlaceholderRef<'_>> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| {
            let raw = caps.get(0)?.as_str();
            captured_name(&caps).map(|name| PlaceholderRef { name, raw })
        })
        .collect()
}

/// Substitutes every placeholder in `template` with its secret value.
pub fn resolve(template: &str, secrets: &ConnectionSecrets) -> StrategyResult<String> {
    let refs = find_placeholders(template);
    if let Some(missing) = refs.iter().find(|r| !secrets.contains_key(r.name)) {
        return Err(StrategyError::MissingSecret {
            name: missing.name.to_string(),
        });
    }
    debug!(placeholders = refs.len(), "Resolving template placeholders");

    let resolved = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        captured_name(caps)
            .and_then(|name| secrets.get(name))
            .cloned()
            .unwrap_or_default()
    });
    Ok(resolved.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets(pairs: &[(&str, &str)]) -> ConnectionSecrets {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn resolves_double_bracket_token() {
        let out = resolve("<<api_key>>", &secrets(&[("api_key", "abc")])).unwrap();
        assert_eq!(out, "abc");
    }

    #[test]
    fn resolves_single_bracket_token() {
        let out = resolve("<api_key>", &secrets(&[("api_key", "abc")])).unwrap();
        assert_eq!(out, "abc");
    }

    #[test]
    fn resolves_inline_tokens() {
        let out = resolve(
            "https://<domain>/v1?user=<username>&pw=<<password>>",
            &secrets(&[("domain", "api.example.com"), ("username", "u"), ("password", "p")]),
        )
        .unwrap();
        assert_eq!(out, "https://api.example.com/v1?user=u&pw=p");
    }

    #[test]
    fn missing_secret_fails_whole_template() {
        let err = resolve("<present>:<absent>", &secrets(&[("present", "x")])).unwrap_err();
        assert!(matches!(err, StrategyError::MissingSecret { ref name } if name == "absent"));
    }

    #[test]
    fn empty_secrets_fail() {
        let err = resolve("<<api_key>>", &ConnectionSecrets::new()).unwrap_err();
        assert!(matches!(err, StrategyError::MissingSecret { ref name } if name == "api_key"));
    }

    #[test]
    fn literal_templates_pass_through() {
        let out = resolve("static-token", &ConnectionSecrets::new()).unwrap();
        assert_eq!(out, "static-token");
        // Brackets around whitespace are not placeholders.
        assert_eq!(resolve("a < b > c", &ConnectionSecrets::new()).unwrap(), "a < b > c");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let out = resolve("<outer>", &secrets(&[("outer", "<inner>")])).unwrap();
        assert_eq!(out, "<inner>");
    }

    #[test]
    fn find_placeholders_reports_raw_tokens() {
        let refs = find_placeholders("<<a>> and <b.c>");
        assert_eq!(
            refs,
            vec![
                PlaceholderRef { name: "a", raw: "<<a>>" },
                PlaceholderRef { name: "b.c", raw: "<b.c>" },
            ]
        );
    }
}
