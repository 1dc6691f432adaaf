//! Integration tests for the HTTP masking surface.
//!
//! Requests go through the full router (CORS and trace layers included)
//! via `tower::ServiceExt::oneshot`, without binding a socket.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use privops::catalog::Catalog;
use privops::config::MaskingConfig;
use privops::server::{build_routes, AppState};

const ENCRYPTION_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

fn app() -> axum::Router {
    let config = MaskingConfig {
        hmac_key: Some("test-hmac-key".into()),
        encryption_key: Some(ENCRYPTION_KEY.into()),
    };
    let catalog = Catalog::from_config(&config).unwrap();
    build_routes(AppState::new(Arc::new(catalog)))
}

async fn send(method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn mask(strategy: &str, configuration: Value, values: Value) -> (StatusCode, Value) {
    send(
        Method::PUT,
        "/api/v1/masking",
        Some(json!({
            "values": values,
            "masking_strategy": {"strategy": strategy, "configuration": configuration},
        })),
    )
    .await
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn lists_strategies_in_registration_order() {
    let (status, body) = send(Method::GET, "/api/v1/masking/strategy", None).await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "null_rewrite",
            "string_rewrite",
            "random_string_rewrite",
            "hash",
            "hmac",
            "aes_encrypt"
        ]
    );

    let string_rewrite = &body[1];
    let keys: Vec<&str> = string_rewrite["configurations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["rewrite_value", "format_preservation"]);
}

#[tokio::test]
async fn string_rewrite_masks_each_value() {
    let (status, body) = mask(
        "string_rewrite",
        json!({"rewrite_value": "mate"}),
        json!(["check", null]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"plain": ["check", null], "masked_values": ["mate", null]})
    );
}

#[tokio::test]
async fn random_string_honours_length() {
    let (status, body) = mask(
        "random_string_rewrite",
        json!({"length": 20}),
        json!(["my email"]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plain"][0], "my email");
    assert_eq!(body["masked_values"][0].as_str().unwrap().len(), 20);
}

#[tokio::test]
async fn oversized_random_length_is_bad_request() {
    for length in [json!(4097), json!(i64::MAX)] {
        let (status, body) = mask(
            "random_string_rewrite",
            json!({ "length": length }),
            json!(["my email"]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .contains("must be less than or equal to 4096"));
    }
}

#[tokio::test]
async fn listing_documents_random_length_bounds() {
    let (_, body) = send(Method::GET, "/api/v1/masking/strategy", None).await;
    let length = &body[2]["configurations"][0];
    assert_eq!(length["key"], "length");
    assert_eq!(length["minimum"], 1);
    assert_eq!(length["maximum"], 4096);
}

#[tokio::test]
async fn hash_is_deterministic_across_requests() {
    let (_, first) = mask("hash", json!({"salt": "s"}), json!(["867-5309"])).await;
    let (_, second) = mask("hash", json!({"salt": "s"}), json!(["867-5309"])).await;
    assert_eq!(first["masked_values"], second["masked_values"]);
    assert_eq!(first["masked_values"][0].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn hmac_uses_configured_process_key() {
    let (status, body) = mask("hmac", json!({}), json!(["value"])).await;
    assert_eq!(status, StatusCode::OK);
    let (_, again) = mask("hmac", json!({}), json!(["value"])).await;
    assert_eq!(body["masked_values"], again["masked_values"]);
}

#[tokio::test]
async fn empty_hmac_key_is_bad_request() {
    let (status, body) = mask("hmac", json!({"key": ""}), json!(["value"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("key: must not be empty"));
}

#[tokio::test]
async fn aes_ciphertext_differs_per_call() {
    let (status, body) = mask(
        "aes_encrypt",
        json!({"mode": "GCM"}),
        json!(["same", "same"]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["masked_values"][0], body["masked_values"][1]);
}

#[tokio::test]
async fn unknown_strategy_is_not_found() {
    let (status, body) = mask("No Such Strategy", json!({}), json!(["check"])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["detail"],
        "No masking strategy found with name 'No Such Strategy'"
    );
}

#[tokio::test]
async fn undeclared_configuration_field_is_bad_request() {
    let (status, body) = mask(
        "string_rewrite",
        json!({"wrong": "config"}),
        json!(["check"]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("wrong"));
}

#[tokio::test]
async fn unsupported_aes_mode_is_bad_request() {
    let (status, _) = mask("aes_encrypt", json!({"mode": "CBC"}), json!(["x"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_string_value_is_bad_request() {
    let (status, body) = mask("hash", json!({}), json!(["ok", 7])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn malformed_body_is_unprocessable() {
    let (status, body) = send(
        Method::PUT,
        "/api/v1/masking",
        Some(json!({"values": ["x"]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}
