//! Behavioural tests for the strategy catalog through the public API.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use privops::authentication::OutboundRequest;
use privops::catalog::{self, Catalog};
use privops::errors::StrategyError;
use privops::masking::{MaskingSecrets, MaskingStrategy};
use privops::placeholders::ConnectionSecrets;

fn catalog() -> Catalog {
    Catalog::builtin(MaskingSecrets::generate()).unwrap()
}

fn masked(
    catalog: &Catalog,
    key: &str,
    configuration: Value,
    values: Value,
) -> Vec<Option<String>> {
    let values = values.as_array().cloned().unwrap_or_default();
    catalog
        .mask(key, &configuration, &values, None)
        .unwrap()
        .masked
}

#[test]
fn every_key_resolves_to_itself_and_is_listed_once() {
    let catalog = catalog();
    let keys: Vec<_> = catalog.masking().list_all().map(|d| d.key).collect();
    for key in &keys {
        assert_eq!(catalog.masking().lookup(key).unwrap().descriptor.key, *key);
        assert_eq!(keys.iter().filter(|k| *k == key).count(), 1);
    }

    let auth_keys: Vec<_> = catalog.authentication().list_all().map(|d| d.key).collect();
    assert_eq!(auth_keys, vec!["query_param", "header", "basic", "bearer"]);
}

#[test]
fn null_rewrite_returns_one_absent_per_input() {
    let out = masked(
        &catalog(),
        "null_rewrite",
        json!({}),
        json!(["a", null, "c", ""]),
    );
    assert_eq!(out, vec![None, None, None, None]);
}

#[test]
fn hash_and_hmac_are_deterministic() {
    let catalog = catalog();
    for key in ["hash", "hmac"] {
        let first = masked(&catalog, key, json!({"algorithm": "SHA-512"}), json!(["v"]));
        let second = masked(&catalog, key, json!({"algorithm": "SHA-512"}), json!(["v"]));
        assert_eq!(first, second, "{key} must be deterministic");
        assert_ne!(first[0].as_deref(), Some("v"));
        assert_eq!(first[0].as_ref().unwrap().len(), 128);
    }
}

#[test]
fn duplicate_inputs_hash_identically() {
    let out = masked(
        &catalog(),
        "hash",
        json!({}),
        json!(["867-5309", "867-5309"]),
    );
    assert_eq!(out[0], out[1]);
    assert_ne!(out[0].as_deref(), Some("867-5309"));
}

#[test]
fn hmac_key_override_changes_output() {
    let catalog = catalog();
    let default_key = masked(&catalog, "hmac", json!({}), json!(["v"]));
    let explicit = masked(&catalog, "hmac", json!({"key": "other"}), json!(["v"]));
    assert_ne!(default_key, explicit);
}

#[test]
fn random_strings_have_length_and_differ() {
    let catalog = catalog();
    let mask_once = || {
        masked(
            &catalog,
            "random_string_rewrite",
            json!({"length": 20}),
            json!(["my email"]),
        )
    };
    let first = mask_once();
    let second = mask_once();
    assert_eq!(first[0].as_ref().unwrap().len(), 20);
    assert_ne!(first, second);
}

#[test]
fn format_preservation_appends_suffix() {
    let out = masked(
        &catalog(),
        "string_rewrite",
        json!({"rewrite_value": "masked", "format_preservation": {"suffix": "@example.com"}}),
        json!(["jane@example.com", null]),
    );
    assert_eq!(out, vec![Some("masked@example.com".to_string()), None]);
}

#[test]
fn aes_outputs_differ_and_decrypt() {
    let catalog = catalog();
    let strategy = catalog
        .masking()
        .build("aes_encrypt", &json!({"mode": "GCM"}), &MaskingSecrets::generate())
        .unwrap();
    let MaskingStrategy::AesEncrypt(aes) = &strategy else {
        panic!("expected aes_encrypt, got {}", strategy.key());
    };

    let out = strategy
        .mask(&[Some("secret".into()), Some("secret".into())], None)
        .unwrap();
    assert_ne!(out[0], out[1]);
    for encoded in out.iter().flatten() {
        assert_eq!(aes.decrypt(encoded).unwrap(), "secret");
    }
}

#[test]
fn unknown_key_is_no_such_strategy() {
    let err = catalog()
        .mask("No Such Strategy", &json!({}), &[json!("check")], None)
        .unwrap_err();
    assert!(matches!(err, StrategyError::NoSuchStrategy { .. }));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn undeclared_field_fails_validation_with_path() {
    let err = catalog()
        .mask(
            "string_rewrite",
            &json!({"rewrite_value": "x", "wrong": "config"}),
            &[json!("check")],
            None,
        )
        .unwrap_err();
    match err {
        StrategyError::Validation(errors) => {
            assert_eq!(errors.errors()[0].path, "wrong");
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn catalog_is_shared_across_threads() {
    let catalog = catalog();
    let outputs: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| masked(&catalog, "hash", json!({}), json!(["same"]))))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn query_param_resolves_secret_through_global_catalog() {
    let configuration = json!({"name": "api_key", "value": "<<api_key>>"});
    let request = OutboundRequest::new("GET", "https://api.example.com/v1/users");

    let secrets = ConnectionSecrets::from([("api_key".to_string(), "abc".to_string())]);
    let authenticated =
        catalog::authenticate("query_param", &configuration, request.clone(), &secrets).unwrap();
    assert_eq!(
        authenticated.full_url().unwrap().as_str(),
        "https://api.example.com/v1/users?api_key=abc"
    );

    let err = catalog::authenticate(
        "query_param",
        &configuration,
        request,
        &ConnectionSecrets::new(),
    )
    .unwrap_err();
    assert!(matches!(err, StrategyError::MissingSecret { ref name } if name == "api_key"));
    assert_eq!(err.status_code(), 424);
}

#[test]
fn query_param_overrides_credential_already_in_url() {
    let configuration = json!({"name": "api_key", "value": "<<api_key>>"});
    let request = OutboundRequest::new("GET", "https://api.example.com/users?api_key=old&page=2");
    let secrets = ConnectionSecrets::from([("api_key".to_string(), "abc".to_string())]);

    let authenticated = catalog()
        .authenticate("query_param", &configuration, request, &secrets)
        .unwrap();
    let url = authenticated.full_url().unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/users?api_key=abc&page=2");
    assert_eq!(url.query_pairs().filter(|(k, _)| k == "api_key").count(), 1);
}

#[test]
fn global_mask_matches_catalog_listing() {
    let listed = catalog::list_masking_strategies().unwrap();
    assert_eq!(listed.len(), 6);
    let result = catalog::mask(
        "string_rewrite",
        &json!({"rewrite_value": "mate"}),
        &[json!("check")],
    )
    .unwrap();
    assert_eq!(result.masked, vec![Some("mate".to_string())]);
}
