//! HTTP API handlers — registration and read-only daemon state as JSON.

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use beckon_core::PresenceEntry;
use beckon_services::{DirectoryError, SignalingHub};

#[derive(Clone)]
pub struct ApiState {
    pub hub: Arc<SignalingHub>,
    pub started_at: Instant,
}

// ── /register ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

pub async fn handle_register(
    State(state): State<ApiState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), (StatusCode, String)> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name and email required".to_string()));
    }

    let user = state
        .hub
        .directory()
        .register(&req.name, &req.email, &req.password)
        .map_err(|e| match e {
            DirectoryError::DuplicateEmail => (StatusCode::CONFLICT, e.to_string()),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            name: user.name,
            email: user.email,
        }),
    ))
}

// ── /status ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    pub online: usize,
    pub registered_users: usize,
    pub uptime_secs: u64,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        online: state.hub.online_count(),
        registered_users: state.hub.directory().len(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

// ── /presence ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PresenceResponse {
    pub users: Vec<PresenceEntry>,
}

pub async fn handle_presence(State(state): State<ApiState>) -> Json<PresenceResponse> {
    Json(PresenceResponse {
        users: state.hub.online_users(),
    })
}
