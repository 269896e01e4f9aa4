//! Trigger input from the host.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use patchwork_app::ports::{PrivilegeBackend, SettingsStore, TriggerPublisher};
use patchwork_domain::automation::Trigger;

use crate::error::ApiError;
use crate::state::AppState;

/// Body returned once a trigger has been handed to the modules.
#[derive(Serialize)]
pub struct Published {
    pub trigger: Trigger,
    /// Number of running modules that received it.
    pub delivered: usize,
}

/// Possible responses from the publish endpoint.
pub enum PublishResponse {
    Accepted(Json<Published>),
}

impl IntoResponse for PublishResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted(json) => (StatusCode::ACCEPTED, json).into_response(),
        }
    }
}

/// `POST /api/triggers/{trigger}` — fire a device trigger.
///
/// Returns as soon as the trigger is queued; automations run in the
/// background.
pub async fn publish<S, R, P>(
    State(state): State<AppState<S, R, P>>,
    Path(trigger): Path<String>,
) -> Result<PublishResponse, ApiError>
where
    S: SettingsStore + 'static,
    R: PrivilegeBackend + 'static,
    P: PrivilegeBackend + 'static,
{
    let trigger: Trigger = trigger.parse()?;
    let delivered = state.bus.publish(trigger).await;
    tracing::info!(%trigger, delivered, "trigger received");
    Ok(PublishResponse::Accepted(Json(Published {
        trigger,
        delivered,
    })))
}
