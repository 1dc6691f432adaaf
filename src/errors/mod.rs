//! Error taxonomy shared by the masking and authentication families.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Which strategy family a registry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyFamily {
    Masking,
    Authentication,
}

impl fmt::Display for StrategyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyFamily::Masking => f.write_str("masking"),
            StrategyFamily::Authentication => f.write_str("authentication"),
        }
    }
}

/// A single configuration problem, located by dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// One or more configuration problems found in a single validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }

    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![ValidationError::new(path, message)])
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("No {family} strategy found with name '{key}'")]
    NoSuchStrategy { family: StrategyFamily, key: String },

    #[error("Invalid strategy configuration:\n{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid value at position {index}: {reason}")]
    InvalidValue { index: usize, reason: String },

    #[error("Secret '{name}' referenced by placeholder is not defined for this connection")]
    MissingSecret { name: String },

    #[error("A {family} strategy named '{key}' is already registered")]
    DuplicateStrategy { family: StrategyFamily, key: String },

    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),
}

impl StrategyError {
    /// HTTP status the route layer reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            StrategyError::NoSuchStrategy { .. } => 404,
            StrategyError::Validation(_) | StrategyError::InvalidValue { .. } => 400,
            StrategyError::MissingSecret { .. } => 424,
            StrategyError::DuplicateStrategy { .. } | StrategyError::Crypto(_) => 500,
        }
    }
}

pub type StrategyResult<T> = Result<T, StrategyError>;
