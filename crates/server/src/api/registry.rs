//! Registry admin API handlers.
//!
//! Channels, batches and the links between them. Batch tokens can be set
//! but are never returned.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use classrelay_core::{registry::RegistrySnapshot, Batch, RegistryError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::middleware::AdminPrincipal;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for registering a channel
#[derive(Debug, Deserialize)]
pub struct AddChannelBody {
    /// Telegram chat id, e.g. "-100123"
    pub id: String,
    pub name: String,
}

/// Request body for registering a batch
#[derive(Debug, Deserialize)]
pub struct AddBatchBody {
    /// Subject id on the course site
    pub id: String,
    pub name: String,
    /// Session token used as the site cookie
    pub token: String,
}

/// Request body for linking a channel and a batch
#[derive(Debug, Deserialize)]
pub struct ConnectionBody {
    pub channel: String,
    pub batch: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct RegistryErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<RegistryErrorResponse>);

fn ok() -> Json<SuccessResponse> {
    Json(SuccessResponse { success: true })
}

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(RegistryErrorResponse {
            error: message.into(),
        }),
    )
}

fn map_registry_error(e: RegistryError) -> ApiError {
    match e {
        RegistryError::ChannelNotFound(_) => error_response(StatusCode::NOT_FOUND, e.to_string()),
        RegistryError::Database(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("{} cannot be empty", field),
        ));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Whole registry, tokens omitted
pub async fn get_registry(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RegistrySnapshot>, ApiError> {
    let registry = state.registry();
    let channels = registry.list_channels().map_err(map_registry_error)?;
    let batches = registry.list_batches().map_err(map_registry_error)?;
    Ok(Json(RegistrySnapshot::new(channels, batches)))
}

/// Register a channel. An existing channel with the same id is replaced
/// and loses its batch links.
pub async fn add_channel(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(by): AdminPrincipal,
    Json(body): Json<AddChannelBody>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require("id", &body.id)?;
    state
        .registry()
        .add_channel(&body.id, &body.name)
        .map_err(map_registry_error)?;
    info!(by = %by, channel_id = %body.id, "Channel registered");
    Ok(ok())
}

pub async fn delete_channel(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(by): AdminPrincipal,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let removed = state
        .registry()
        .delete_channel(&id)
        .map_err(map_registry_error)?;
    info!(by = %by, channel_id = %id, removed, "Channel deleted");
    Ok(ok())
}

pub async fn add_batch(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(by): AdminPrincipal,
    Json(body): Json<AddBatchBody>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require("id", &body.id)?;
    require("token", &body.token)?;
    let batch_id = body.id.clone();
    state
        .registry()
        .add_batch(Batch {
            id: body.id,
            name: body.name,
            token: body.token,
        })
        .map_err(map_registry_error)?;
    info!(by = %by, batch_id = %batch_id, "Batch registered");
    Ok(ok())
}

/// Delete a batch. Channels linked to it keep the link and report
/// "batch not found" on their next check.
pub async fn delete_batch(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(by): AdminPrincipal,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let removed = state
        .registry()
        .delete_batch(&id)
        .map_err(map_registry_error)?;
    info!(by = %by, batch_id = %id, removed, "Batch deleted");
    Ok(ok())
}

pub async fn connect(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(by): AdminPrincipal,
    Json(body): Json<ConnectionBody>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require("batch", &body.batch)?;
    state
        .registry()
        .connect(&body.channel, &body.batch)
        .map_err(map_registry_error)?;
    info!(by = %by, channel_id = %body.channel, batch_id = %body.batch, "Batch connected");
    Ok(ok())
}

pub async fn disconnect(
    State(state): State<Arc<AppState>>,
    AdminPrincipal(by): AdminPrincipal,
    Json(body): Json<ConnectionBody>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .registry()
        .disconnect(&body.channel, &body.batch)
        .map_err(map_registry_error)?;
    info!(by = %by, channel_id = %body.channel, batch_id = %body.batch, "Batch disconnected");
    Ok(ok())
}
