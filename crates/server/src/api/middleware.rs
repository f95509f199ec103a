//! Authentication and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::{FromRequestParts, MatchedPath, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use classrelay_core::{AuthError, AuthRequest, Identity};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use crate::metrics::{
    AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION,
    UNMATCHED_PATH,
};
use crate::state::AppState;

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// Requests are labelled with the route template (`/api/v1/batches/{id}`),
/// never the raw path.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Authentication middleware for the admin routes.
///
/// Rejects with 401 when the configured authenticator does not accept the
/// request; otherwise stores the [`Identity`] in the request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let authenticator = state.authenticator();

    if authenticator.method_name() == "none" {
        request.extensions_mut().insert(Identity::anonymous());
        return Ok(next.run(request).await);
    }

    let headers: HashMap<String, String> = request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect();

    match authenticator.authenticate(&AuthRequest { headers }).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(AuthError::NotAuthenticated) => {
            AUTH_FAILURES_TOTAL
                .with_label_values(&["not_authenticated"])
                .inc();
            Err(StatusCode::UNAUTHORIZED)
        }
        Err(AuthError::InvalidCredentials(_)) => {
            AUTH_FAILURES_TOTAL
                .with_label_values(&["invalid_credentials"])
                .inc();
            Err(StatusCode::UNAUTHORIZED)
        }
        Err(e) => {
            warn!(error = %e, "Authenticator failed");
            AUTH_FAILURES_TOTAL.with_label_values(&["internal_error"]).inc();
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Principal of the authenticated admin, "anonymous" without auth.
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub String);

impl<S> FromRequestParts<S> for AdminPrincipal
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let principal = parts
            .extensions
            .get::<Identity>()
            .map(|id| id.principal.clone())
            .unwrap_or_else(|| "anonymous".to_string());
        std::future::ready(Ok(AdminPrincipal(principal)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::header, middleware, routing::get, Router};
    use classrelay_core::{
        config::{AuthConfig, DatabaseConfig, ServerConfig},
        AdminKeyAuthenticator, AuthMethod, Authenticator, Config, NoneAuthenticator,
        SqliteRegistry,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn principal_handler(AdminPrincipal(principal): AdminPrincipal) -> String {
        principal
    }

    fn create_test_state(auth_config: AuthConfig) -> Arc<AppState> {
        let authenticator: Arc<dyn Authenticator> = match auth_config.method {
            AuthMethod::None => Arc::new(NoneAuthenticator::new()),
            AuthMethod::ApiKey => Arc::new(AdminKeyAuthenticator::new(
                auth_config.api_key.clone().unwrap(),
            )),
        };

        let config = Config {
            auth: auth_config,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            origin: Default::default(),
            downloader: Default::default(),
            pipeline: Default::default(),
            telegram: None,
        };

        Arc::new(AppState::new(
            config,
            authenticator,
            Arc::new(SqliteRegistry::in_memory().unwrap()),
        ))
    }

    fn api_key_state() -> Arc<AppState> {
        create_test_state(AuthConfig {
            method: AuthMethod::ApiKey,
            api_key: Some("secret-key".to_string()),
        })
    }

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/test", get(principal_handler))
            .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    async fn body_text(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_none_auth_allows_all() {
        let state = create_test_state(AuthConfig {
            method: AuthMethod::None,
            api_key: None,
        });

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "anonymous");
    }

    #[tokio::test]
    async fn test_api_key_bearer_valid() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer secret-key")
            .body(Body::empty())
            .unwrap();

        let response = app(api_key_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "admin");
    }

    #[tokio::test]
    async fn test_api_key_invalid() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer wrong-key")
            .body(Body::empty())
            .unwrap();

        let response = app(api_key_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_api_key_missing() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app(api_key_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_x_api_key_header() {
        let request = Request::builder()
            .uri("/test")
            .header("X-API-Key", "secret-key")
            .body(Body::empty())
            .unwrap();

        let response = app(api_key_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
