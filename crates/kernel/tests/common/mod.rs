#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! This module provides test infrastructure that uses the REAL kernel code,
//! not mock implementations. Tests that need storage call
//! [`TestApp::try_new`] and return early when `DATABASE_URL` is not
//! configured, so the suite stays runnable without infrastructure.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use sqlx::PgPool;
use tower::ServiceExt;

use tradotto_kernel::{AppState, Config};

/// Test application wrapper using the real kernel routes and state.
pub struct TestApp {
    router: Router,
    pub db: PgPool,
    pub state: AppState,
}

impl TestApp {
    /// Create a test application with full kernel initialization, or `None`
    /// when no database is configured.
    pub async fn try_new() -> Option<Self> {
        // Load test environment
        dotenvy::dotenv().ok();

        if std::env::var("DATABASE_URL").is_err() {
            eprintln!("skipping: DATABASE_URL not set");
            return None;
        }

        // Create config from environment
        let config = Config::from_env().expect("Failed to load config");

        // Initialize the REAL AppState (database pool, migrations, etc.)
        let state = AppState::new(&config)
            .await
            .expect("Failed to initialize AppState");

        let db = state.db().clone();

        // Build the REAL router with all kernel routes (must match main.rs)
        let router = Router::new()
            .merge(tradotto_kernel::routes::health::router())
            .merge(tradotto_kernel::routes::language::router())
            .merge(tradotto_kernel::routes::settings::router())
            .merge(tradotto_kernel::routes::translations::router())
            .merge(tradotto_kernel::routes::resolve::router())
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                tradotto_kernel::middleware::negotiate_language,
            ))
            .with_state(state.clone());

        Some(Self { router, db, state })
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a GET request.
    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Send a PUT request with a JSON body.
    pub async fn put_json(&self, uri: &str, body: serde_json::Value) -> Response {
        self.request(
            Request::put(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Send a POST request with a JSON body.
    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response {
        self.request(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, uri: &str) -> Response {
        self.request(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Enable en_US + fr_FR with en_US default — the baseline fixture every
    /// language-dependent test writes, so parallel tests never conflict.
    pub async fn enable_french(&self) {
        let response = self
            .put_json(
                "/api/settings",
                serde_json::json!({
                    "enabled_languages": ["en_US", "fr_FR"],
                    "default_language": "en_US",
                    "translate_slugs": true
                }),
            )
            .await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    /// Remove every translation for an object so tests start clean.
    pub async fn cleanup_object(&self, object_type: &str, object_id: i64) {
        sqlx::query("DELETE FROM translation WHERE object_id = $1 AND object_type = $2")
            .bind(object_id)
            .bind(object_type)
            .execute(&self.db)
            .await
            .ok();
    }
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    use http_body_util::BodyExt;

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body was not valid JSON")
}
