use crate::catalog::Catalog;
use crate::masking::{MaskingContext, MaskingResult};
use crate::registry::StrategyDescription;
use crate::server::protocol::*;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub start_time: Instant,
    pub version: String,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Build all routes for the service.
pub fn build_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_handler))
        .route(&format!("{API_V1_PREFIX}/masking"), put(mask_handler))
        .route(
            &format!("{API_V1_PREFIX}/masking/strategy"),
            get(strategies_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health
// ============================================================================

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        uptime: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// Masking
// ============================================================================

async fn mask_handler(
    State(state): State<AppState>,
    body: Result<Json<MaskingApiRequest>, JsonRejection>,
) -> Result<Json<MaskingResult>, ApiError> {
    let Json(request) =
        body.map_err(|e| ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e.body_text()))?;

    let context = MaskingContext {
        request_id: Some(uuid::Uuid::new_v4().to_string()),
    };
    let spec = request.masking_strategy;

    state
        .catalog
        .mask(
            &spec.strategy,
            &spec.configuration,
            &request.values,
            Some(&context),
        )
        .map(Json)
        .map_err(|e| {
            warn!(
                strategy = %spec.strategy,
                request_id = context.request_id.as_deref(),
                "Masking request rejected: {e}"
            );
            ApiError::from(e)
        })
}

async fn strategies_handler(State(state): State<AppState>) -> Json<Vec<StrategyDescription>> {
    info!("Getting available masking strategies");
    Json(state.catalog.list_masking_strategies())
}
