use super::{AuthenticationStrategy, OutboundRequest};
use crate::errors::StrategyResult;
use crate::placeholders::{resolve, ConnectionSecrets};
use crate::registry::StrategyDescriptor;
use crate::schema::{ConfigSchema, FieldSpec, ValidatedConfig};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;

pub(super) const KEY: &str = "basic";

pub(super) fn descriptor() -> StrategyDescriptor {
    StrategyDescriptor::new(
        KEY,
        "Adds an HTTP Basic authorization header built from username and password",
        ConfigSchema::new()
            .field(FieldSpec::text("username", "Username; may reference secrets").required())
            .field(
                FieldSpec::text("password", "Password; may reference secrets")
                    .with_default(json!("")),
            ),
    )
}

pub(super) fn build(config: ValidatedConfig, _: &()) -> StrategyResult<AuthenticationStrategy> {
    let config: BasicConfig = config.into_typed()?;
    Ok(AuthenticationStrategy::Basic(BasicAuthentication::new(config)))
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasicConfig {
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct BasicAuthentication {
    username: String,
    password: String,
}

impl BasicAuthentication {
    pub fn new(config: BasicConfig) -> Self {
        Self {
            username: config.username,
            password: config.password,
        }
    }

    pub fn add_authentication(
        &self,
        mut request: OutboundRequest,
        secrets: &ConnectionSecrets,
    ) -> StrategyResult<OutboundRequest> {
        let username = resolve(&self.username, secrets)?;
        let password = resolve(&self.password, secrets)?;
        let credentials = STANDARD.encode(format!("{username}:{password}"));
        request.set_header("Authorization", format!("Basic {credentials}"));
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StrategyError;

    fn secrets() -> ConnectionSecrets {
        ConnectionSecrets::from([
            ("username".to_string(), "Aladdin".to_string()),
            ("password".to_string(), "open sesame".to_string()),
        ])
    }

    #[test]
    fn encodes_credential_pair() {
        let strategy = BasicAuthentication::new(BasicConfig {
            username: "<username>".into(),
            password: "<password>".into(),
        });
        let request = strategy
            .add_authentication(OutboundRequest::new("GET", "https://x.test"), &secrets())
            .unwrap();
        assert_eq!(
            request.header("Authorization"),
            Some("Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==")
        );
    }

    #[test]
    fn password_failure_is_reported_even_when_username_resolves() {
        let strategy = BasicAuthentication::new(BasicConfig {
            username: "<username>".into(),
            password: "<api_secret>".into(),
        });
        let err = strategy
            .add_authentication(OutboundRequest::new("GET", "https://x.test"), &secrets())
            .unwrap_err();
        assert!(matches!(err, StrategyError::MissingSecret { ref name } if name == "api_secret"));
    }
}
