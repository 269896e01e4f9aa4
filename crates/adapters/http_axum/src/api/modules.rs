//! Automation modules and the global automations switch.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use patchwork_app::ports::settings::AUTOMATIONS_ENABLED_KEY;
use patchwork_app::ports::{PrivilegeBackend, SettingsStore};
use patchwork_domain::automation::{Action, Automation, Trigger};
use patchwork_domain::error::{NotFoundError, PatchworkError};
use patchwork_domain::id::{AutomationId, ModuleId};
use patchwork_domain::module::ModuleStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// One automation as submitted by the host.
#[derive(Deserialize)]
pub struct AutomationRequest {
    pub id: Option<AutomationId>,
    pub name: String,
    pub enabled: Option<bool>,
    pub trigger: Trigger,
    pub actions: Vec<Action>,
}

impl AutomationRequest {
    fn into_automation(self) -> Result<Automation, PatchworkError> {
        let mut builder = Automation::builder().name(self.name).trigger(self.trigger);
        if let Some(id) = self.id {
            builder = builder.id(id);
        }
        if let Some(enabled) = self.enabled {
            builder = builder.enabled(enabled);
        }
        self.actions
            .into_iter()
            .fold(builder, |builder, action| builder.action(action))
            .build()
    }
}

/// Request and response body of the global switch.
#[derive(Deserialize, Serialize)]
pub struct EnabledBody {
    pub enabled: bool,
}

fn lookup_module<S, R, P>(
    state: &AppState<S, R, P>,
    raw: String,
) -> Result<ModuleId, ApiError> {
    let id = ModuleId::new(raw)?;
    if state.registry.get(&id).is_none() {
        return Err(NotFoundError {
            entity: "Module",
            id: id.to_string(),
        }
        .into());
    }
    Ok(id)
}

/// `GET /api/modules` — lifecycle and last runs of every module.
pub async fn list<S, R, P>(
    State(state): State<AppState<S, R, P>>,
) -> Result<Json<Vec<ModuleStatus>>, ApiError>
where
    S: SettingsStore + 'static,
    R: PrivilegeBackend + 'static,
    P: PrivilegeBackend + 'static,
{
    Ok(Json(state.registry.statuses()))
}

/// `GET /api/modules/{id}/automations` — the module's current list.
pub async fn automations<S, R, P>(
    State(state): State<AppState<S, R, P>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Automation>>, ApiError>
where
    S: SettingsStore + 'static,
    R: PrivilegeBackend + 'static,
    P: PrivilegeBackend + 'static,
{
    let id = lookup_module(&state, id)?;
    let automations = state
        .registry
        .get(&id)
        .map(|module| module.automations())
        .unwrap_or_default();
    Ok(Json(automations))
}

/// `PUT /api/modules/{id}/automations` — validate, persist, then hand the
/// list to the running module.
pub async fn replace_automations<S, R, P>(
    State(state): State<AppState<S, R, P>>,
    Path(id): Path<String>,
    Json(req): Json<Vec<AutomationRequest>>,
) -> Result<Json<Vec<Automation>>, ApiError>
where
    S: SettingsStore + 'static,
    R: PrivilegeBackend + 'static,
    P: PrivilegeBackend + 'static,
{
    let id = lookup_module(&state, id)?;
    let automations = req
        .into_iter()
        .map(AutomationRequest::into_automation)
        .collect::<Result<Vec<_>, _>>()?;
    state.registry.check_automations(&id, &automations)?;
    state.settings.set_automations(&id, &automations).await?;
    state.registry.update_automations(&id, automations.clone());
    tracing::info!(module = %id, count = automations.len(), "automations replaced");
    Ok(Json(automations))
}

/// `GET /api/automations/enabled`
pub async fn enabled<S, R, P>(
    State(state): State<AppState<S, R, P>>,
) -> Result<Json<EnabledBody>, ApiError>
where
    S: SettingsStore + 'static,
    R: PrivilegeBackend + 'static,
    P: PrivilegeBackend + 'static,
{
    Ok(Json(EnabledBody {
        enabled: state.registry.is_enabled(),
    }))
}

/// `PUT /api/automations/enabled` — persist the switch and start or stop
/// every module accordingly.
pub async fn set_enabled<S, R, P>(
    State(state): State<AppState<S, R, P>>,
    Json(req): Json<EnabledBody>,
) -> Result<Json<EnabledBody>, ApiError>
where
    S: SettingsStore + 'static,
    R: PrivilegeBackend + 'static,
    P: PrivilegeBackend + 'static,
{
    state
        .settings
        .set_bool(AUTOMATIONS_ENABLED_KEY, req.enabled)
        .await?;
    state.registry.set_global_enabled(req.enabled).await;
    Ok(Json(EnabledBody {
        enabled: state.registry.is_enabled(),
    }))
}
