//! Common test utilities for the admin API.
//!
//! This module provides a test fixture that builds the router in-process
//! over a temporary SQLite registry, so requests go through the real
//! middleware and handlers via `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use classrelay_core::{
    config::{AuthConfig, DatabaseConfig, ServerConfig},
    AdminKeyAuthenticator, AuthMethod, Authenticator, Config, NoneAuthenticator, Registry,
    SqliteRegistry,
};
use classrelay_server::state::AppState;

/// Test fixture for the admin API.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_add_channel() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/channels", json!({
///         "id": "-100123",
///         "name": "Physics"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Registry behind the router, for direct assertions
    pub registry: Arc<SqliteRegistry>,
    /// Temporary directory holding the registry database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture without admin authentication.
    pub fn new() -> Self {
        Self::with_auth(AuthConfig {
            method: AuthMethod::None,
            api_key: None,
        })
    }

    /// Create a fixture guarded by an admin key.
    pub fn with_api_key(key: &str) -> Self {
        Self::with_auth(AuthConfig {
            method: AuthMethod::ApiKey,
            api_key: Some(key.to_string()),
        })
    }

    fn with_auth(auth: AuthConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let authenticator: Arc<dyn Authenticator> = match auth.method {
            AuthMethod::None => Arc::new(NoneAuthenticator::new()),
            AuthMethod::ApiKey => Arc::new(AdminKeyAuthenticator::new(
                auth.api_key.clone().expect("api key"),
            )),
        };

        let config = Config {
            auth,
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            origin: Default::default(),
            downloader: Default::default(),
            pipeline: Default::default(),
            telegram: None,
        };

        let registry =
            Arc::new(SqliteRegistry::new(&db_path).expect("Failed to create registry"));

        let state = Arc::new(AppState::new(
            config,
            authenticator,
            Arc::clone(&registry) as Arc<dyn Registry>,
        ));
        let router = classrelay_server::api::create_router(state);

        Self {
            router,
            registry,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a DELETE request with JSON body.
    pub async fn delete_with_body(&self, path: &str, body: Value) -> TestResponse {
        self.request("DELETE", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.request_raw("POST", path, body, "application/json").await
    }

    /// Send a request with raw string body and custom content type.
    async fn request_raw(
        &self,
        method: &str,
        path: &str,
        body: &str,
        content_type: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        self.request_with_headers(method, path, body, &[]).await
    }

    /// Send a request with extra headers.
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            request_builder = request_builder.header(*name, *value);
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
