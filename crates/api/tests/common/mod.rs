#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use pcrs_core::territory::{TerritoryIndex, TerritoryRegistry};
use pcrs_core::validation::Validator;
use tower::ServiceExt;

use pcrs_api::config::{ServerConfig, TerritorySource};
use pcrs_api::router::build_app_router;
use pcrs_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        territories: TerritorySource::File("superficies.json".into()),
        territory_lookup_timeout_ms: 500,
    }
}

/// Territories known to every test app.
pub fn test_territories() -> TerritoryIndex {
    TerritoryIndex::from_keys([
        "epci:200054781",
        "departement:75",
        "commune:75056",
        "commune:69123",
    ])
}

/// Build the full application router over the given territory registry.
pub fn build_app_with(territories: Arc<dyn TerritoryRegistry>) -> Router {
    let config = test_config();
    let validator = Validator::new(territories).with_lookup_timeout(config.lookup_timeout());
    let state = AppState {
        validator: Arc::new(validator),
    };
    build_app_router(state, &config)
}

/// Build the full application router with the in-memory test territories.
///
/// Goes through [`build_app_router`] so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app() -> Router {
    build_app_with(Arc::new(test_territories()))
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
