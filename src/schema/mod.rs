//! Data-driven configuration schemas.
//!
//! A schema is an ordered list of field descriptors interpreted generically:
//! one validator serves every strategy instead of a hand-written type per
//! configuration shape. Schemas are closed-world: keys the schema does not
//! declare are rejected, never ignored.

use crate::errors::{ValidationError, ValidationErrors};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

// ============================================================================
// Field Descriptors
// ============================================================================

/// The value shape a field accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Any JSON string.
    Text,
    /// A JSON string or `null`.
    NullableText,
    /// A whole number in `minimum..=maximum`; no upper bound when `maximum` is `None`.
    Integer { minimum: i64, maximum: Option<i64> },
    /// One of a fixed set of strings.
    Choice(&'static [&'static str]),
    /// A nested object validated against its own schema.
    Object(ConfigSchema),
}

impl FieldKind {
    fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text | FieldKind::NullableText => "string",
            FieldKind::Integer { .. } => "integer",
            FieldKind::Choice(_) => "enum",
            FieldKind::Object(_) => "object",
        }
    }
}

/// A single declared configuration field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
    pub description: String,
}

impl FieldSpec {
    fn new(name: impl Into<String>, kind: FieldKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            description: description.into(),
        }
    }

    pub fn text(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text, description)
    }

    pub fn nullable_text(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, FieldKind::NullableText, description)
    }

    pub fn integer(
        name: impl Into<String>,
        minimum: i64,
        description: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            FieldKind::Integer {
                minimum,
                maximum: None,
            },
            description,
        )
    }

    pub fn choice(
        name: impl Into<String>,
        options: &'static [&'static str],
        description: impl Into<String>,
    ) -> Self {
        Self::new(name, FieldKind::Choice(options), description)
    }

    pub fn object(
        name: impl Into<String>,
        schema: ConfigSchema,
        description: impl Into<String>,
    ) -> Self {
        Self::new(name, FieldKind::Object(schema), description)
    }

    /// Caps an integer field; no effect on other kinds.
    #[must_use]
    pub fn at_most(mut self, limit: i64) -> Self {
        if let FieldKind::Integer { maximum, .. } = &mut self.kind {
            *maximum = Some(limit);
        }
        self
    }

    /// Marks the field as mandatory.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value filled in when the field is omitted.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Ordered, closed-world set of field descriptors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSchema {
    fields: Vec<FieldSpec>,
}

impl ConfigSchema {
    /// An empty schema; it only accepts an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field descriptor.
    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Builds a schema of optional nullable text fields, one per label.
    ///
    /// Used for records uploaded by hand where the set of labels is only
    /// known at runtime.
    pub fn optional_text_fields<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        labels.into_iter().fold(Self::new(), |schema, label| {
            schema.field(FieldSpec::nullable_text(label, ""))
        })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Maps every declared field to `null`.
    pub fn blank_record(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), Value::Null))
            .collect()
    }

    /// Validates a raw configuration against this schema.
    ///
    /// `null` is accepted as an empty configuration. All problems are
    /// collected before returning so callers see every offending field.
    pub fn validate(&self, raw: &Value) -> Result<ValidatedConfig, ValidationErrors> {
        let empty = Map::new();
        let map = match raw {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => {
                return Err(ValidationErrors::single(
                    "",
                    format!("configuration must be an object, got {}", json_type(other)),
                ))
            }
        };

        let mut errors = Vec::new();
        let values = self.validate_map(map, "", &mut errors);
        if errors.is_empty() {
            Ok(ValidatedConfig { values })
        } else {
            Err(ValidationErrors::new(errors))
        }
    }

    fn validate_map(
        &self,
        map: &Map<String, Value>,
        prefix: &str,
        errors: &mut Vec<ValidationError>,
    ) -> Map<String, Value> {
        for key in map.keys() {
            if !self.fields.iter().any(|f| &f.name == key) {
                errors.push(ValidationError::new(
                    join_path(prefix, key),
                    "extra fields not permitted",
                ));
            }
        }

        let mut out = Map::new();
        for spec in &self.fields {
            let path = join_path(prefix, &spec.name);
            let supplied = match map.get(&spec.name) {
                Some(Value::Null) if !matches!(spec.kind, FieldKind::NullableText) => None,
                other => other,
            };

            match supplied {
                Some(value) => {
                    if let Some(accepted) = check_kind(&spec.kind, value, &path, errors) {
                        out.insert(spec.name.clone(), accepted);
                    }
                }
                None if spec.required => {
                    errors.push(ValidationError::new(path, "field required"));
                }
                None => {
                    if let Some(default) = &spec.default {
                        out.insert(spec.name.clone(), default.clone());
                    }
                }
            }
        }
        out
    }

    /// Describes the schema for the public strategy catalog.
    pub fn describe(&self) -> Vec<FieldDescription> {
        self.fields
            .iter()
            .map(|f| FieldDescription {
                key: f.name.clone(),
                field_type: f.kind.type_name(),
                required: f.required,
                default: f.default.clone(),
                minimum: match &f.kind {
                    FieldKind::Integer { minimum, .. } => Some(*minimum),
                    _ => None,
                },
                maximum: match &f.kind {
                    FieldKind::Integer { maximum, .. } => *maximum,
                    _ => None,
                },
                options: match &f.kind {
                    FieldKind::Choice(options) => Some(options.to_vec()),
                    _ => None,
                },
                description: f.description.clone(),
                configurations: match &f.kind {
                    FieldKind::Object(nested) => Some(nested.describe()),
                    _ => None,
                },
            })
            .collect()
    }
}

fn check_kind(
    kind: &FieldKind,
    value: &Value,
    path: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<Value> {
    match (kind, value) {
        (FieldKind::Text, Value::String(_)) => Some(value.clone()),
        (FieldKind::NullableText, Value::String(_) | Value::Null) => Some(value.clone()),
        (FieldKind::Integer { minimum, maximum }, Value::Number(n)) => match n.as_i64() {
            Some(i) if i < *minimum => {
                errors.push(ValidationError::new(
                    path,
                    format!("must be greater than or equal to {minimum}"),
                ));
                None
            }
            Some(i) => match maximum {
                Some(max) if i > *max => {
                    errors.push(ValidationError::new(
                        path,
                        format!("must be less than or equal to {max}"),
                    ));
                    None
                }
                _ => Some(value.clone()),
            },
            None => {
                errors.push(ValidationError::new(path, "value is not a valid integer"));
                None
            }
        },
        (FieldKind::Choice(options), Value::String(s)) => {
            if options.contains(&s.as_str()) {
                Some(value.clone())
            } else {
                errors.push(ValidationError::new(
                    path,
                    format!("must be one of: {}", options.join(", ")),
                ));
                None
            }
        }
        (FieldKind::Object(schema), Value::Object(map)) => {
            Some(Value::Object(schema.validate_map(map, path, errors)))
        }
        (kind, other) => {
            errors.push(ValidationError::new(
                path,
                format!("expected {}, got {}", kind.type_name(), json_type(other)),
            ));
            None
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Validated Output
// ============================================================================

/// Configuration that passed schema validation, with defaults filled in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedConfig {
    values: Map<String, Value>,
}

impl ValidatedConfig {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Converts into a typed configuration struct.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ValidationErrors> {
        serde_json::from_value(Value::Object(self.values))
            .map_err(|e| ValidationErrors::single("", e.to_string()))
    }
}

/// Catalog entry for one configuration field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescription {
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<&'static str>>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configurations: Option<Vec<FieldDescription>>,
}
