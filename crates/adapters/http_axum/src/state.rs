//! Shared application state for axum handlers.

use std::sync::Arc;

use patchwork_app::gateway::CommandGateway;
use patchwork_app::registry::ModuleRegistry;
use patchwork_app::tiles::TileBoard;
use patchwork_app::trigger_bus::InProcessTriggerBus;

/// Gateway whose preference store is shared with the HTTP layer.
pub type SharedGateway<S, R, P> = CommandGateway<Arc<S>, R, P>;

/// Application state shared across all axum handlers.
///
/// Generic over the settings store and the two privilege backends to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<S, R, P> {
    /// Persisted preferences and automation lists.
    pub settings: Arc<S>,
    /// Routes privileged calls to the active backend.
    pub gateway: Arc<SharedGateway<S, R, P>>,
    /// Fan-out of device triggers to running modules.
    pub bus: Arc<InProcessTriggerBus>,
    pub registry: Arc<ModuleRegistry>,
    pub tiles: Arc<TileBoard>,
}

impl<S, R, P> Clone for AppState<S, R, P> {
    fn clone(&self) -> Self {
        Self {
            settings: Arc::clone(&self.settings),
            gateway: Arc::clone(&self.gateway),
            bus: Arc::clone(&self.bus),
            registry: Arc::clone(&self.registry),
            tiles: Arc::clone(&self.tiles),
        }
    }
}

impl<S, R, P> AppState<S, R, P> {
    /// Create a new application state from components already shared with
    /// background tasks.
    pub fn from_arcs(
        settings: Arc<S>,
        gateway: Arc<SharedGateway<S, R, P>>,
        bus: Arc<InProcessTriggerBus>,
        registry: Arc<ModuleRegistry>,
        tiles: Arc<TileBoard>,
    ) -> Self {
        Self {
            settings,
            gateway,
            bus,
            registry,
            tiles,
        }
    }
}
