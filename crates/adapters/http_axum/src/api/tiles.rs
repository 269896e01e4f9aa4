//! Quick-toggle tiles.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use patchwork_app::ports::{PrivilegeBackend, SettingsStore};
use patchwork_domain::error::NotFoundError;
use patchwork_domain::tile::{TileSnapshot, TileState};

use crate::error::ApiError;
use crate::state::AppState;

/// Body returned after a toggle was issued.
#[derive(Serialize)]
pub struct Toggled {
    pub id: String,
    /// State that was requested. Query the tile again to confirm it.
    pub requested: TileState,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<TileSnapshot>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<TileSnapshot>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the toggle endpoint.
pub enum ToggleResponse {
    Accepted(Json<Toggled>),
}

impl IntoResponse for ToggleResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted(json) => (StatusCode::ACCEPTED, json).into_response(),
        }
    }
}

fn not_found(id: String) -> NotFoundError {
    NotFoundError { entity: "Tile", id }
}

/// `GET /api/tiles` — query every tile.
pub async fn list<S, R, P>(State(state): State<AppState<S, R, P>>) -> Result<ListResponse, ApiError>
where
    S: SettingsStore + 'static,
    R: PrivilegeBackend + 'static,
    P: PrivilegeBackend + 'static,
{
    Ok(ListResponse::Ok(Json(state.tiles.snapshot().await)))
}

/// `GET /api/tiles/{id}` — query one tile.
pub async fn get<S, R, P>(
    State(state): State<AppState<S, R, P>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    S: SettingsStore + 'static,
    R: PrivilegeBackend + 'static,
    P: PrivilegeBackend + 'static,
{
    let tile = state.tiles.get(&id).ok_or_else(|| not_found(id.clone()))?;
    let snapshot = TileSnapshot::new(tile.id(), tile.label(), tile.query_state().await);
    Ok(GetResponse::Ok(Json(snapshot)))
}

/// `POST /api/tiles/{id}/toggle` — activate a tile.
pub async fn toggle<S, R, P>(
    State(state): State<AppState<S, R, P>>,
    Path(id): Path<String>,
) -> Result<ToggleResponse, ApiError>
where
    S: SettingsStore + 'static,
    R: PrivilegeBackend + 'static,
    P: PrivilegeBackend + 'static,
{
    let tile = state.tiles.get(&id).ok_or_else(|| not_found(id.clone()))?;
    let requested = tile.toggle().await?;
    Ok(ToggleResponse::Accepted(Json(Toggled { id, requested })))
}
