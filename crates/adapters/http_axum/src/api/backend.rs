//! Active privilege backend.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use patchwork_app::ports::settings::USE_ROOT_KEY;
use patchwork_app::ports::{PrivilegeBackend, SettingsStore};
use patchwork_domain::backend::{BackendKind, BackendStatus};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for selecting a backend.
#[derive(Deserialize)]
pub struct SelectBackendRequest {
    pub backend: BackendKind,
}

/// `GET /api/backend` — probe the active backend.
pub async fn status<S, R, P>(
    State(state): State<AppState<S, R, P>>,
) -> Result<Json<BackendStatus>, ApiError>
where
    S: SettingsStore + 'static,
    R: PrivilegeBackend + 'static,
    P: PrivilegeBackend + 'static,
{
    Ok(Json(state.gateway.status().await))
}

/// `PUT /api/backend` — persist the backend choice; effective on the next call.
pub async fn select<S, R, P>(
    State(state): State<AppState<S, R, P>>,
    Json(req): Json<SelectBackendRequest>,
) -> Result<Json<BackendStatus>, ApiError>
where
    S: SettingsStore + 'static,
    R: PrivilegeBackend + 'static,
    P: PrivilegeBackend + 'static,
{
    let use_root = req.backend == BackendKind::Root;
    state.settings.set_bool(USE_ROOT_KEY, use_root).await?;
    tracing::info!(backend = %req.backend, "backend selected");
    Ok(Json(state.gateway.status().await))
}
