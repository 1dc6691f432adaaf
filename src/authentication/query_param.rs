use super::{AuthenticationStrategy, OutboundRequest};
use crate::errors::StrategyResult;
use crate::placeholders::{resolve, ConnectionSecrets};
use crate::registry::StrategyDescriptor;
use crate::schema::{ConfigSchema, FieldSpec, ValidatedConfig};
use serde::Deserialize;

pub(super) const KEY: &str = "query_param";

pub(super) fn descriptor() -> StrategyDescriptor {
    StrategyDescriptor::new(
        KEY,
        "Replaces the value placeholder with the actual credentials and adds it as a query param",
        ConfigSchema::new()
            .field(FieldSpec::text("name", "Query parameter name").required())
            .field(
                FieldSpec::text("value", "Parameter value; may reference secrets as <name>")
                    .required(),
            ),
    )
}

pub(super) fn build(config: ValidatedConfig, _: &()) -> StrategyResult<AuthenticationStrategy> {
    let config: QueryParamConfig = config.into_typed()?;
    Ok(AuthenticationStrategy::QueryParam(
        QueryParamAuthentication::new(config),
    ))
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryParamConfig {
    pub name: String,
    pub value: String,
}

/// Adds a resolved credential as a query parameter.
#[derive(Debug, Clone)]
pub struct QueryParamAuthentication {
    name: String,
    value: String,
}

impl QueryParamAuthentication {
    pub fn new(config: QueryParamConfig) -> Self {
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
        request.set_query_param(&self.name, value);
        Ok(request)
    }
}
