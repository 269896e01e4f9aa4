//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod backend;
#[allow(clippy::missing_errors_doc)]
pub mod modules;
#[allow(clippy::missing_errors_doc)]
pub mod tiles;
#[allow(clippy::missing_errors_doc)]
pub mod triggers;

use axum::Router;
use axum::routing::{get, post};

use patchwork_app::ports::{PrivilegeBackend, SettingsStore};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<S, R, P>() -> Router<AppState<S, R, P>>
where
    S: SettingsStore + 'static,
    R: PrivilegeBackend + 'static,
    P: PrivilegeBackend + 'static,
{
    Router::new()
        // Triggers
        .route("/triggers/{trigger}", post(triggers::publish::<S, R, P>))
        // Tiles
        .route("/tiles", get(tiles::list::<S, R, P>))
        .route("/tiles/{id}", get(tiles::get::<S, R, P>))
        .route("/tiles/{id}/toggle", post(tiles::toggle::<S, R, P>))
        // Backend
        .route(
            "/backend",
            get(backend::status::<S, R, P>).put(backend::select::<S, R, P>),
        )
        // Modules
        .route("/modules", get(modules::list::<S, R, P>))
        .route(
            "/modules/{id}/automations",
            get(modules::automations::<S, R, P>).put(modules::replace_automations::<S, R, P>),
        )
        .route(
            "/automations/enabled",
            get(modules::enabled::<S, R, P>).put(modules::set_enabled::<S, R, P>),
        )
}
