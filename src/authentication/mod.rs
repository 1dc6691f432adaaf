//! Outbound-request authentication strategies.
//!
//! Each strategy resolves its secret placeholders first and only then writes
//! the result into the request, so a missing secret leaves the request
//! untouched. Strategies differ only in where the resolved value lands.

mod basic;
mod bearer;
mod header;
mod query_param;
mod request;

pub use basic::*;
pub use bearer::*;
pub use header::*;
pub use query_param::*;
pub use request::*;

use crate::errors::{StrategyFamily, StrategyResult};
use crate::placeholders::ConnectionSecrets;
use crate::registry::StrategyRegistry;
use tracing::debug;

/// Registry type for the authentication family.
pub type AuthenticationRegistry = StrategyRegistry<AuthenticationStrategy>;

/// A configured authentication strategy.
#[derive(Debug, Clone)]
pub enum AuthenticationStrategy {
    QueryParam(QueryParamAuthentication),
    Header(HeaderAuthentication),
    Basic(BasicAuthentication),
    Bearer(BearerAuthentication),
}

impl AuthenticationStrategy {
    pub fn key(&self) -> &'static str {
        match self {
            AuthenticationStrategy::QueryParam(_) => query_param::KEY,
            AuthenticationStrategy::Header(_) => header::KEY,
            AuthenticationStrategy::Basic(_) => basic::KEY,
            AuthenticationStrategy::Bearer(_) => bearer::KEY,
        }
    }

    /// Returns `request` with credentials added.
    pub fn add_authentication(
        &self,
        request: OutboundRequest,
        secrets: &ConnectionSecrets,
    ) -> StrategyResult<OutboundRequest> {
        debug!(strategy = self.key(), method = %request.method, "Adding authentication");
        match self {
            AuthenticationStrategy::QueryParam(s) => s.add_authentication(request, secrets),
            AuthenticationStrategy::Header(s) => s.add_authentication(request, secrets),
            AuthenticationStrategy::Basic(s) => s.add_authentication(request, secrets),
            AuthenticationStrategy::Bearer(s) => s.add_authentication(request, secrets),
        }
    }
}

/// Registers the built-in authentication strategies in catalog order.
pub fn register_builtin(registry: &mut AuthenticationRegistry) -> StrategyResult<()> {
    registry.register(query_param::descriptor(), query_param::build)?;
    registry.register(header::descriptor(), header::build)?;
    registry.register(basic::descriptor(), basic::build)?;
    registry.register(bearer::descriptor(), bearer::build)?;
    Ok(())
}

/// A fresh registry holding the built-in authentication strategies.
pub fn builtin_registry() -> StrategyResult<AuthenticationRegistry> {
    let mut registry = StrategyRegistry::new(StrategyFamily::Authentication);
    register_builtin(&mut registry)?;
    Ok(registry)
}
