//! Request and response bodies for the HTTP surface.

use crate::errors::StrategyError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const API_V1_PREFIX: &str = "/api/v1";

/// Body of `PUT /api/v1/masking`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskingApiRequest {
    pub values: Vec<Value>,
    pub masking_strategy: MaskingStrategySpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskingStrategySpec {
    pub strategy: String,
    #[serde(default)]
    pub configuration: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// An error rendered as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<StrategyError> for ApiError {
    fn from(err: StrategyError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}
