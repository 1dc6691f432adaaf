//! Write-once strategy registry.
//!
//! A registry is filled by explicit `register` calls while the catalog is
//! being built and is only read afterwards, so lookups need no locking.
//! Registration order is kept for the public listing.

use crate::errors::{StrategyError, StrategyFamily, StrategyResult};
use crate::schema::{ConfigSchema, FieldDescription, ValidatedConfig};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Static description of a strategy: its key, schema and help text.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyDescriptor {
    pub key: &'static str,
    pub description: &'static str,
    pub schema: ConfigSchema,
}

impl StrategyDescriptor {
    pub fn new(key: &'static str, description: &'static str, schema: ConfigSchema) -> Self {
        Self {
            key,
            description,
            schema,
        }
    }

    /// Public catalog representation.
    pub fn describe(&self) -> StrategyDescription {
        StrategyDescription {
            name: self.key.to_string(),
            description: self.description.to_string(),
            configurations: self.schema.describe(),
        }
    }
}

/// Catalog entry returned by the strategy listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyDescription {
    pub name: String,
    pub description: String,
    pub configurations: Vec<FieldDescription>,
}

/// Builds a strategy from validated configuration plus shared context.
pub type Constructor<S, C> = fn(ValidatedConfig, &C) -> StrategyResult<S>;

/// A descriptor together with the constructor for its strategy.
pub struct RegisteredStrategy<S, C> {
    pub descriptor: StrategyDescriptor,
    construct: Constructor<S, C>,
}

/// Registry of one strategy family, keyed by strategy name.
pub struct StrategyRegistry<S, C = ()> {
    family: StrategyFamily,
    entries: Vec<RegisteredStrategy<S, C>>,
    index: HashMap<&'static str, usize>,
}

impl<S, C> StrategyRegistry<S, C> {
    pub fn new(family: StrategyFamily) -> Self {
        Self {
            family,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn family(&self) -> StrategyFamily {
        self.family
    }

    /// Adds a strategy. Keys are unique within a family.
    pub fn register(
        &mut self,
        descriptor: StrategyDescriptor,
        construct: Constructor<S, C>,
    ) -> StrategyResult<()> {
        if self.index.contains_key(descriptor.key) {
            return Err(StrategyError::DuplicateStrategy {
                family: self.family,
                key: descriptor.key.to_string(),
            });
        }
        debug!(family = %self.family, key = descriptor.key, "Registering strategy");
        self.index.insert(descriptor.key, self.entries.len());
        self.entries.push(RegisteredStrategy {
            descriptor,
            construct,
        });
        Ok(())
    }

    pub fn lookup(&self, key: &str) -> StrategyResult<&RegisteredStrategy<S, C>> {
        self.index
            .get(key)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| StrategyError::NoSuchStrategy {
                family: self.family,
                key: key.to_string(),
            })
    }

    /// Descriptors in registration order.
    pub fn list_all(&self) -> impl Iterator<Item = &StrategyDescriptor> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves `key`, validates `configuration` and constructs the strategy.
    ///
    /// Nothing is constructed unless validation succeeds.
    pub fn build(
        &self,
        key: &str,
        configuration: &serde_json::Value,
        context: &C,
    ) -> StrategyResult<S> {
        let entry = self.lookup(key)?;
        let validated = entry
            .descriptor
            .schema
            .validate(configuration)
            .map_err(|e| {
                warn!(
                    family = %self.family,
                    key,
                    errors = e.errors().len(),
                    "Rejected strategy configuration"
                );
                e
            })?;
        (entry.construct)(validated, context)
    }
}
