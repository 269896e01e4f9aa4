//! Tile reflectors — tri-state views of a device setting for quick toggles.
//!
//! A reflector reads through the gateway, classifies the answer as on, off
//! or unavailable, and on activation issues exactly one write. The next
//! query is the source of truth; a toggle never confirms its own effect.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use patchwork_domain::backend::UnavailableReason;
use patchwork_domain::command;
use patchwork_domain::error::ExecutionError;
use patchwork_domain::settings::SettingsNamespace;
use patchwork_domain::tile::{TileSnapshot, TileState};

use crate::ports::{DeviceSettingsReader, PrivilegeBackend};

/// A quick-toggle backed by some device state.
#[async_trait]
pub trait TileReflector: Send + Sync {
    fn id(&self) -> &str;

    fn label(&self) -> &str;

    /// Read and classify the current state.
    async fn query_state(&self) -> TileState;

    /// Request the opposite of the last queried state.
    ///
    /// Returns the state that was requested, not a confirmed one.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecutionError`] when the tile is unavailable or the
    /// write is not accepted.
    async fn toggle(&self) -> Result<TileState, ExecutionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reading {
    Value(bool),
    Unavailable(UnavailableReason),
}

impl Reading {
    fn state(self) -> TileState {
        match self {
            Self::Value(true) => TileState::On,
            Self::Value(false) => TileState::Off,
            Self::Unavailable(_) => TileState::Unavailable,
        }
    }
}

fn unavailable_reason(err: &ExecutionError) -> UnavailableReason {
    match err {
        ExecutionError::Unavailable { reason } => *reason,
        ExecutionError::PermissionDenied => UnavailableReason::PermissionDenied,
        ExecutionError::Failed { .. } | ExecutionError::Programmer(_) => {
            UnavailableReason::Unreachable
        }
    }
}

/// Reflects a single `settings` key that flips between two values.
pub struct SettingTile<G, R> {
    id: String,
    label: String,
    namespace: SettingsNamespace,
    key: String,
    on: String,
    off: String,
    gateway: Arc<G>,
    reader: R,
    last: Mutex<Option<Reading>>,
}

impl<G, R> SettingTile<G, R>
where
    G: PrivilegeBackend,
    R: DeviceSettingsReader,
{
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        namespace: SettingsNamespace,
        key: impl Into<String>,
        gateway: Arc<G>,
        reader: R,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            namespace,
            key: key.into(),
            on: "1".to_string(),
            off: "0".to_string(),
            gateway,
            reader,
            last: Mutex::new(None),
        }
    }

    /// Override the values written for on and off.
    #[must_use]
    pub fn with_values(mut self, on: impl Into<String>, off: impl Into<String>) -> Self {
        self.on = on.into();
        self.off = off.into();
        self
    }

    /// `system/master_mono`: mix stereo audio down to mono.
    #[must_use]
    pub fn mono_audio(gateway: Arc<G>, reader: R) -> Self {
        Self::new(
            "mono_audio",
            "Mono audio",
            SettingsNamespace::System,
            "master_mono",
            gateway,
            reader,
        )
    }

    fn last(&self) -> Option<Reading> {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remember(&self, reading: Reading) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(reading);
    }

    async fn read(&self) -> Reading {
        if !self.gateway.is_available().await {
            return Reading::Unavailable(UnavailableReason::NotInstalled);
        }
        if !self.gateway.has_permission().await {
            return Reading::Unavailable(UnavailableReason::PermissionDenied);
        }
        match self.reader.read(self.namespace, &self.key).await {
            Ok(Some(value)) => Reading::Value(value.trim() == self.on),
            Ok(None) => Reading::Value(false),
            Err(err) => {
                tracing::warn!(tile = %self.id, error = %err, "failed to read tile setting");
                Reading::Unavailable(unavailable_reason(&err))
            }
        }
    }
}

#[async_trait]
impl<G, R> TileReflector for SettingTile<G, R>
where
    G: PrivilegeBackend + 'static,
    R: DeviceSettingsReader + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    async fn query_state(&self) -> TileState {
        let reading = self.read().await;
        self.remember(reading);
        tracing::debug!(tile = %self.id, ?reading, "tile queried");
        reading.state()
    }

    async fn toggle(&self) -> Result<TileState, ExecutionError> {
        let reading = match self.last() {
            Some(reading) => reading,
            None => {
                let reading = self.read().await;
                self.remember(reading);
                reading
            }
        };
        let current = match reading {
            Reading::Value(current) => current,
            Reading::Unavailable(UnavailableReason::PermissionDenied) => {
                return Err(ExecutionError::PermissionDenied);
            }
            Reading::Unavailable(reason) => return Err(ExecutionError::Unavailable { reason }),
        };
        let value = if current { &self.off } else { &self.on };
        self.gateway
            .run(&command::settings_put(self.namespace, &self.key, value))
            .await
            .into_result()?;
        let requested = Reading::Value(!current).state();
        tracing::info!(tile = %self.id, state = %requested, "tile toggled");
        Ok(requested)
    }
}

/// Reads device settings with `settings get` through a privilege backend.
pub struct GatewaySettingsReader<G> {
    gateway: Arc<G>,
}

impl<G> GatewaySettingsReader<G> {
    #[must_use]
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

impl<G: PrivilegeBackend> DeviceSettingsReader for GatewaySettingsReader<G> {
    async fn read(
        &self,
        namespace: SettingsNamespace,
        key: &str,
    ) -> Result<Option<String>, ExecutionError> {
        let stdout = self
            .gateway
            .run(&command::settings_get(namespace, key))
            .await
            .into_result()?;
        let value = stdout.trim();
        if value.is_empty() || value == "null" {
            Ok(None)
        } else {
            Ok(Some(value.to_string()))
        }
    }
}

/// The set of tiles exposed to quick-toggle surfaces.
#[derive(Default)]
pub struct TileBoard {
    tiles: Vec<Arc<dyn TileReflector>>,
}

impl TileBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tile, replacing any tile with the same id.
    #[must_use]
    pub fn with(mut self, tile: Arc<dyn TileReflector>) -> Self {
        self.tiles.retain(|existing| existing.id() != tile.id());
        self.tiles.push(tile);
        self
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<dyn TileReflector>> {
        self.tiles.iter().find(|tile| tile.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Query every tile in registration order.
    pub async fn snapshot(&self) -> Vec<TileSnapshot> {
        let mut snapshots = Vec::with_capacity(self.tiles.len());
        for tile in &self.tiles {
            let state = tile.query_state().await;
            snapshots.push(TileSnapshot::new(tile.id(), tile.label(), state));
        }
        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubBackend;

    type StubTile = SettingTile<StubBackend, GatewaySettingsReader<StubBackend>>;

    fn mono(backend: &Arc<StubBackend>) -> StubTile {
        SettingTile::mono_audio(backend.clone(), GatewaySettingsReader::new(backend.clone()))
    }

    #[tokio::test]
    async fn should_negate_state_when_queried_toggled_and_queried() {
        let backend = Arc::new(StubBackend::ready());
        backend.put_device_setting("system", "master_mono", "0");
        let tile = mono(&backend);

        let before = tile.query_state().await;
        let requested = tile.toggle().await.unwrap();
        let after = tile.query_state().await;

        assert_eq!(before, TileState::Off);
        assert_eq!(requested, TileState::On);
        assert_eq!(after, TileState::On);
    }

    #[tokio::test]
    async fn should_issue_exactly_one_run_when_toggled() {
        let backend = Arc::new(StubBackend::ready());
        backend.put_device_setting("system", "master_mono", "1");
        let tile = mono(&backend);
        tile.query_state().await;
        let calls_before = backend.calls().len();

        tile.toggle().await.unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), calls_before + 1);
        assert_eq!(
            calls.last().map(String::as_str),
            Some("settings put system master_mono 0")
        );
    }

    #[tokio::test]
    async fn should_treat_unset_setting_as_off() {
        let backend = Arc::new(StubBackend::ready());
        let tile = mono(&backend);
        assert_eq!(tile.query_state().await, TileState::Off);
    }

    #[tokio::test]
    async fn should_be_unavailable_when_backend_missing() {
        let backend = Arc::new(StubBackend::missing());
        let tile = mono(&backend);

        assert_eq!(tile.query_state().await, TileState::Unavailable);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn should_be_unavailable_when_permission_refused() {
        let backend = Arc::new(StubBackend::ready());
        backend.set_permitted(false);
        let tile = mono(&backend);

        assert_eq!(tile.query_state().await, TileState::Unavailable);
        assert_eq!(tile.toggle().await, Err(ExecutionError::PermissionDenied));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn should_not_write_when_unavailable() {
        let backend = Arc::new(StubBackend::missing());
        let tile = mono(&backend);
        tile.query_state().await;

        let err = tile.toggle().await.unwrap_err();
        assert_eq!(
            err,
            ExecutionError::Unavailable {
                reason: UnavailableReason::NotInstalled
            }
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn should_be_unavailable_when_read_fails() {
        let backend = Arc::new(StubBackend::ready());
        backend.fail_on("settings get");
        let tile = mono(&backend);

        assert_eq!(tile.query_state().await, TileState::Unavailable);
    }

    #[tokio::test]
    async fn should_query_first_when_toggled_without_prior_reading() {
        let backend = Arc::new(StubBackend::ready());
        backend.put_device_setting("system", "master_mono", "1");
        let tile = mono(&backend);

        assert_eq!(tile.toggle().await.unwrap(), TileState::Off);
        assert_eq!(
            backend.device_setting("system", "master_mono").as_deref(),
            Some("0")
        );
    }

    #[tokio::test]
    async fn should_use_custom_values_when_configured() {
        let backend = Arc::new(StubBackend::ready());
        backend.put_device_setting("global", "stay_on_while_plugged_in", "7");
        let tile = SettingTile::new(
            "stay_awake",
            "Stay awake",
            SettingsNamespace::Global,
            "stay_on_while_plugged_in",
            backend.clone(),
            GatewaySettingsReader::new(backend.clone()),
        )
        .with_values("7", "0");

        assert_eq!(tile.query_state().await, TileState::On);
        assert_eq!(tile.toggle().await.unwrap(), TileState::Off);
    }

    #[tokio::test]
    async fn should_snapshot_every_tile_in_order() {
        let backend = Arc::new(StubBackend::ready());
        backend.put_device_setting("system", "master_mono", "1");
        let board = TileBoard::new().with(Arc::new(mono(&backend)));

        let snapshot = board.snapshot().await;

        assert_eq!(
            snapshot,
            vec![TileSnapshot::new("mono_audio", "Mono audio", TileState::On)]
        );
        assert!(board.get("mono_audio").is_some());
        assert!(board.get("missing").is_none());
    }
}
