use super::{AuthenticationStrategy, OutboundRequest};
use crate::errors::StrategyResult;
use crate::placeholders::{resolve, ConnectionSecrets};
use crate::registry::StrategyDescriptor;
use crate::schema::{ConfigSchema, FieldSpec, ValidatedConfig};
use serde::Deserialize;

pub(super) const KEY: &str = "bearer";

pub(super) fn descriptor() -> StrategyDescriptor {
    StrategyDescriptor::new(
        KEY,
        "Adds a bearer token authorization header",
        ConfigSchema::new()
            .field(FieldSpec::text("token", "Token; may reference secrets as <name>").required()),
    )
}

pub(super) fn build(config: ValidatedConfig, _: &()) -> StrategyResult<AuthenticationStrategy> {
    let config: BearerConfig = config.into_typed()?;
    Ok(AuthenticationStrategy::Bearer(BearerAuthentication::new(config)))
}

#[derive(Debug, Clone, Deserialize)]
pub struct BearerConfig {
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct BearerAuthentication {
    token: String,
}

impl BearerAuthentication {
    pub fn new(config: BearerConfig) -> Self {
        Self {
            token: config.token,
        }
    }

    pub fn add_authentication(
        &self,
        mut request: OutboundRequest,
        secrets: &ConnectionSecrets,
    ) -> StrategyResult<OutboundRequest> {
        let token = resolve(&self.token, secrets)?;
        request.set_header("Authorization", format!("Bearer {token}"));
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_bearer_header() {
        let strategy = BearerAuthentication::new(BearerConfig {
            token: "<<access_token>>".into(),
        });
        let secrets =
            ConnectionSecrets::from([("access_token".to_string(), "tok-123".to_string())]);
        let request = strategy
            .add_authentication(OutboundRequest::new("GET", "https://x.test"), &secrets)
            .unwrap();
        assert_eq!(request.header("authorization"), Some("Bearer tok-123"));
        assert!(request.query_params.is_empty());
    }
}
