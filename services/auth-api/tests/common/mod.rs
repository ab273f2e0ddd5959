//! Shared helpers for auth-api HTTP tests

#![allow(dead_code)]

use auth_api::config::Config;
use auth_api::state::AppState;
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

pub const BOT_TOKEN: &str = "123456789:AAH-http-test-bot-token";
pub const SECRET_KEY: &str = "http-test-signing-key-0123456789abcdef";
pub const TEST_TOKEN: &str = "secret_token";

pub fn config(test_mode: bool) -> Config {
    let mut vars = vec![
        ("TELEGRAM_BOT_TOKEN", BOT_TOKEN),
        ("SECRET_KEY", SECRET_KEY),
    ];
    if test_mode {
        vars.push(("TEST_MODE_ENABLED", "true"));
        vars.push(("TEST_MODE_TOKEN", TEST_TOKEN));
    }
    Config::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .expect("config")
}

pub fn app(test_mode: bool) -> Router {
    let state = AppState::from_config(config(test_mode)).expect("state");
    auth_api::build_router(state)
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn bearer_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Sign a login widget payload the way Telegram does: HMAC-SHA256 keyed with
/// SHA-256(bot token) over the sorted `key=value` lines.
pub fn sign_widget_payload(bot_token: &str, mut payload: serde_json::Value) -> serde_json::Value {
    let object = payload.as_object_mut().expect("object payload");
    let mut lines: Vec<String> = object
        .iter()
        .filter_map(|(k, v)| {
            let rendered = match v {
                serde_json::Value::Null => return None,
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (!rendered.is_empty()).then(|| format!("{k}={rendered}"))
        })
        .collect();
    lines.sort();

    let secret = Sha256::digest(bot_token.as_bytes());
    let mut mac = Hmac::<Sha256>::new_from_slice(&secret).expect("hmac key");
    mac.update(lines.join("\n").as_bytes());
    let hash = hex::encode(mac.finalize().into_bytes());

    object.insert("hash".to_string(), serde_json::Value::String(hash));
    payload
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
