use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::middleware::{auth_middleware, metrics_middleware};
use super::{handlers, registry};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Admin routes, behind the configured authenticator
    let protected = Router::new()
        .route("/config", get(handlers::get_config))
        // Registry
        .route("/registry", get(registry::get_registry))
        .route("/channels", post(registry::add_channel))
        .route("/channels/{id}", delete(registry::delete_channel))
        .route("/batches", post(registry::add_batch))
        .route("/batches/{id}", delete(registry::delete_batch))
        .route("/connections", post(registry::connect))
        .route("/connections", delete(registry::disconnect))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
