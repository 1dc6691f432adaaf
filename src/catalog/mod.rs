//! Strategy catalog and the public dispatch functions.
//!
//! The catalog is built once at startup from explicit registration calls and
//! is read-only afterwards. Dispatch always runs lookup, then configuration
//! validation, then construction, and only then touches any value.

use crate::authentication::{self, AuthenticationRegistry, OutboundRequest};
use crate::config::MaskingConfig;
use crate::errors::{StrategyError, StrategyResult};
use crate::masking::{
    self, MaskingContext, MaskingRegistry, MaskingResult, MaskingSecrets, MaskingStrategy,
};
use crate::placeholders::ConnectionSecrets;
use crate::registry::StrategyDescription;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Both strategy registries plus the process masking secrets.
pub struct Catalog {
    masking: MaskingRegistry,
    authentication: AuthenticationRegistry,
    secrets: MaskingSecrets,
}

impl Catalog {
    /// Registers every built-in strategy.
    pub fn builtin(secrets: MaskingSecrets) -> StrategyResult<Self> {
        let catalog = Self {
            masking: masking::builtin_registry()?,
            authentication: authentication::builtin_registry()?,
            secrets,
        };
        info!(
            masking = catalog.masking.len(),
            authentication = catalog.authentication.len(),
            "Strategy catalog ready"
        );
        Ok(catalog)
    }

    pub fn from_config(config: &MaskingConfig) -> StrategyResult<Self> {
        Self::builtin(MaskingSecrets::from_config(config)?)
    }

    pub fn masking(&self) -> &MaskingRegistry {
        &self.masking
    }

    pub fn authentication(&self) -> &AuthenticationRegistry {
        &self.authentication
    }

    /// Masks JSON values, which must each be a string or `null`.
    pub fn mask(
        &self,
        strategy_key: &str,
        configuration: &Value,
        values: &[Value],
        context: Option<&MaskingContext>,
    ) -> StrategyResult<MaskingResult> {
        let strategy = self.masking.build(strategy_key, configuration, &self.secrets)?;
        let plain = values_from_json(values)?;
        run_masking(strategy_key, &strategy, plain, context)
    }

    /// Masks already-typed values.
    pub fn mask_values(
        &self,
        strategy_key: &str,
        configuration: &Value,
        values: Vec<Option<String>>,
        context: Option<&MaskingContext>,
    ) -> StrategyResult<MaskingResult> {
        let strategy = self.masking.build(strategy_key, configuration, &self.secrets)?;
        run_masking(strategy_key, &strategy, values, context)
    }

    /// Public description of every masking strategy, in registration order.
    pub fn list_masking_strategies(&self) -> Vec<StrategyDescription> {
        self.masking.list_all().map(|d| d.describe()).collect()
    }

    pub fn list_authentication_strategies(&self) -> Vec<StrategyDescription> {
        self.authentication.list_all().map(|d| d.describe()).collect()
    }

    /// Adds credentials to `request` using the named strategy.
    pub fn authenticate(
        &self,
        strategy_key: &str,
        configuration: &Value,
        request: OutboundRequest,
        secrets: &ConnectionSecrets,
    ) -> StrategyResult<OutboundRequest> {
        let strategy = self.authentication.build(strategy_key, configuration, &())?;
        debug!(
            strategy = strategy_key,
            secrets = secrets.len(),
            "Authenticating outbound request"
        );
        strategy.add_authentication(request, secrets)
    }
}

fn run_masking(
    strategy_key: &str,
    strategy: &MaskingStrategy,
    plain: Vec<Option<String>>,
    context: Option<&MaskingContext>,
) -> StrategyResult<MaskingResult> {
    info!(
        strategy = strategy_key,
        count = plain.len(),
        request_id = context.and_then(|c| c.request_id.as_deref()),
        "Starting masking"
    );
    let masked = strategy.mask(&plain, context)?;
    Ok(MaskingResult { plain, masked })
}

/// Converts JSON values into optional strings, rejecting other JSON types.
pub fn values_from_json(values: &[Value]) -> StrategyResult<Vec<Option<String>>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            other => Err(StrategyError::InvalidValue {
                index,
                reason: format!("expected a string or null, got {other}"),
            }),
        })
        .collect()
}

// ============================================================================
// Process-wide catalog
// ============================================================================

static CATALOG: OnceCell<Arc<Catalog>> = OnceCell::new();

/// Builds the process catalog from configuration.
///
/// Call once at startup, before any dispatch function. Later calls keep the
/// catalog already installed.
pub fn init(config: &MaskingConfig) -> StrategyResult<Arc<Catalog>> {
    let mut built = false;
    let catalog = CATALOG.get_or_try_init(|| {
        built = true;
        Catalog::from_config(config).map(Arc::new)
    })?;
    if built {
        info!("Process strategy catalog initialized from configuration");
    } else {
        warn!("Strategy catalog already initialized; ignoring new masking configuration");
    }
    Ok(Arc::clone(catalog))
}

/// The process catalog, built with generated secrets if [`init`] was never called.
pub fn global() -> StrategyResult<Arc<Catalog>> {
    CATALOG
        .get_or_try_init(|| Catalog::builtin(MaskingSecrets::generate()).map(Arc::new))
        .map(Arc::clone)
}

/// Masks `values` with the named strategy.
pub fn mask(
    strategy_key: &str,
    configuration: &Value,
    values: &[Value],
) -> StrategyResult<MaskingResult> {
    global()?.mask(strategy_key, configuration, values, None)
}

/// Lists the available masking strategies with their schemas.
pub fn list_masking_strategies() -> StrategyResult<Vec<StrategyDescription>> {
    Ok(global()?.list_masking_strategies())
}

/// Adds credentials to an outbound request with the named strategy.
pub fn authenticate(
    strategy_key: &str,
    configuration: &Value,
    request: OutboundRequest,
    secrets: &ConnectionSecrets,
) -> StrategyResult<OutboundRequest> {
    global()?.authenticate(strategy_key, configuration, request, secrets)
}
