use super::{AuthenticationStrategy, OutboundRequest};
use crate::errors::StrategyResult;
use crate::placeholders::{resolve, ConnectionSecrets};
use crate::registry::StrategyDescriptor;
use crate::schema::{ConfigSchema, FieldSpec, ValidatedConfig};
use serde::Deserialize;

pub(super) const KEY: &str = "header";

pub(super) fn descriptor() -> StrategyDescriptor {
    StrategyDescriptor::new(
        KEY,
        "Replaces the value placeholder with the actual credentials and adds it as a request header",
        ConfigSchema::new()
            .field(FieldSpec::text("name", "Header name").required())
            .field(
                FieldSpec::text("value", "Header value; may reference secrets as <name>")
                    .required(),
            ),
    )
}

pub(super) fn build(config: ValidatedConfig, _: &()) -> StrategyResult<AuthenticationStrategy> {
    let config: HeaderConfig = config.into_typed()?;
    Ok(AuthenticationStrategy::Header(HeaderAuthentication::new(config)))
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeaderConfig {
    pub name: String,
    pub value: String,
}

/// Adds a resolved credential as a header.
#[derive(Debug, Clone)]
pub struct HeaderAuthentication {
    name: String,
    value: String,
}

impl HeaderAuthentication {
    pub fn new(config: HeaderConfig) -> Self {
        Self {
            name: config.name,
            value: config.value,
        }
    }

    pub fn add_authentication(
        &self,
        mut request: OutboundRequest,
        secrets: &ConnectionSecrets,
    ) -> StrategyResult<OutboundRequest> {
        let value = resolve(&self.value, secrets)?;
        request.set_header(&self.name, value);
        Ok(request)
    }
}
