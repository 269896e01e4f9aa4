//! Command gateway — the one place that picks the active privilege backend.
//!
//! The `use_root` preference is read on every call, so flipping it takes
//! effect on the next command without restarting anything.

use patchwork_domain::backend::{BackendKind, BackendStatus, CommandOutcome};
use patchwork_domain::error::ProgrammerError;

use crate::ports::privilege::check_argv;
use crate::ports::settings::USE_ROOT_KEY;
use crate::ports::{PrivilegeBackend, ProcessHandle, SettingsStore};

/// Routes privileged operations to either the root shell or the
/// privileged service according to the `use_root` preference.
pub struct CommandGateway<S, R, P> {
    settings: S,
    root: R,
    service: P,
}

impl<S, R, P> CommandGateway<S, R, P>
where
    S: SettingsStore,
    R: PrivilegeBackend,
    P: PrivilegeBackend,
{
    #[must_use]
    pub fn new(settings: S, root: R, service: P) -> Self {
        Self {
            settings,
            root,
            service,
        }
    }

    /// Backend selected by the current preference.
    ///
    /// A missing preference, or a store that cannot be read, selects the
    /// privileged service.
    pub async fn active_backend(&self) -> BackendKind {
        match self.settings.get_bool(USE_ROOT_KEY).await {
            Ok(value) => BackendKind::from_use_root(value.unwrap_or(false)),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read backend preference, using privileged service");
                BackendKind::PrivilegedService
            }
        }
    }

    /// Probe the active backend.
    ///
    /// The preference is read once, so both checks target the backend
    /// that is reported.
    pub async fn status(&self) -> BackendStatus {
        let backend = self.active_backend().await;
        let available = self.backend_available(backend).await;
        let permitted = available && self.backend_permitted(backend).await;
        BackendStatus {
            backend,
            available,
            permitted,
        }
    }

    async fn backend_available(&self, backend: BackendKind) -> bool {
        match backend {
            BackendKind::Root => self.root.is_available().await,
            BackendKind::PrivilegedService => self.service.is_available().await,
        }
    }

    async fn backend_permitted(&self, backend: BackendKind) -> bool {
        match backend {
            BackendKind::Root => self.root.has_permission().await,
            BackendKind::PrivilegedService => self.service.has_permission().await,
        }
    }
}

impl<S, R, P> PrivilegeBackend for CommandGateway<S, R, P>
where
    S: SettingsStore,
    R: PrivilegeBackend,
    P: PrivilegeBackend,
{
    async fn is_available(&self) -> bool {
        self.backend_available(self.active_backend().await).await
    }

    async fn has_permission(&self) -> bool {
        self.backend_permitted(self.active_backend().await).await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn run(&self, command: &str) -> CommandOutcome {
        let backend = self.active_backend().await;
        let outcome = match backend {
            BackendKind::Root => self.root.run(command).await,
            BackendKind::PrivilegedService => self.service.run(command).await,
        };
        if !outcome.is_success() {
            tracing::debug!(%backend, ?outcome, "privileged command did not succeed");
        }
        outcome
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn spawn(&self, argv: &[String]) -> Result<Option<ProcessHandle>, ProgrammerError> {
        check_argv(argv)?;
        match self.active_backend().await {
            BackendKind::Root => self.root.spawn(argv).await,
            BackendKind::PrivilegedService => self.service.spawn(argv).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use patchwork_domain::backend::UnavailableReason;

    use super::*;
    use crate::testing::{MemorySettings, StubBackend};

    type TestGateway = CommandGateway<Arc<MemorySettings>, Arc<StubBackend>, Arc<StubBackend>>;

    fn gateway(
        settings: MemorySettings,
    ) -> (
        TestGateway,
        Arc<MemorySettings>,
        Arc<StubBackend>,
        Arc<StubBackend>,
    ) {
        let settings = Arc::new(settings);
        let root = Arc::new(StubBackend::ready());
        let service = Arc::new(StubBackend::ready());
        let gateway = CommandGateway::new(settings.clone(), root.clone(), service.clone());
        (gateway, settings, root, service)
    }

    #[tokio::test]
    async fn should_use_privileged_service_when_preference_missing() {
        let (gateway, _, root, service) = gateway(MemorySettings::default());

        assert_eq!(gateway.active_backend().await, BackendKind::PrivilegedService);
        gateway.run("id").await;

        assert!(root.calls().is_empty());
        assert_eq!(service.calls(), vec!["id".to_string()]);
    }

    #[tokio::test]
    async fn should_use_privileged_service_when_store_unreadable() {
        let (gateway, settings, root, _) = gateway(MemorySettings::with(USE_ROOT_KEY, true));
        settings.break_reads();

        assert_eq!(gateway.active_backend().await, BackendKind::PrivilegedService);
        gateway.run("id").await;
        assert!(root.calls().is_empty());
    }

    #[tokio::test]
    async fn should_switch_backend_between_calls_when_preference_changes() {
        let (gateway, settings, root, service) = gateway(MemorySettings::with(USE_ROOT_KEY, true));

        gateway.run("first").await;
        settings.set_bool(USE_ROOT_KEY, false).await.unwrap();
        gateway.run("second").await;

        assert_eq!(root.calls(), vec!["first".to_string()]);
        assert_eq!(service.calls(), vec!["second".to_string()]);
    }

    #[tokio::test]
    async fn should_report_success_matching_exit_code_when_running_setting_write() {
        let (gateway, _, root, _) = gateway(MemorySettings::with(USE_ROOT_KEY, true));

        let outcome = gateway.run("settings put system master_mono 1").await;
        assert!(outcome.is_success());
        assert_eq!(root.calls().len(), 1);
        assert_eq!(
            root.device_setting("system", "master_mono").as_deref(),
            Some("1")
        );

        root.set_exit_code(255);
        let outcome = gateway.run("settings put system master_mono 1").await;
        assert_eq!(outcome, CommandOutcome::failure(Some(255), ""));
        assert_eq!(root.calls().len(), 2);
    }

    #[tokio::test]
    async fn should_return_unavailable_outcome_when_backend_missing() {
        let settings = Arc::new(MemorySettings::default());
        let service = Arc::new(StubBackend::missing());
        let gateway = CommandGateway::new(settings, Arc::new(StubBackend::ready()), service);

        let outcome = gateway.run("id").await;
        assert_eq!(
            outcome,
            CommandOutcome::unavailable(UnavailableReason::NotInstalled)
        );
        assert!(!gateway.is_available().await);
    }

    #[tokio::test]
    async fn should_reject_empty_argv_before_reaching_backend() {
        let (gateway, _, root, service) = gateway(MemorySettings::with(USE_ROOT_KEY, true));

        let result = gateway.spawn(&[]).await;
        assert!(matches!(result, Err(ProgrammerError::EmptyArgv)));
        assert!(root.spawned().is_empty());
        assert!(service.spawned().is_empty());
    }

    #[tokio::test]
    async fn should_route_spawn_to_active_backend() {
        let (gateway, _, root, service) = gateway(MemorySettings::with(USE_ROOT_KEY, true));

        let argv = vec!["logcat".to_string(), "-d".to_string()];
        let handle = gateway.spawn(&argv).await.unwrap();
        assert!(handle.is_none());
        assert_eq!(root.spawned(), vec![argv]);
        assert!(service.spawned().is_empty());
    }

    #[tokio::test]
    async fn should_report_status_of_active_backend() {
        let (gateway, _, root, _) = gateway(MemorySettings::with(USE_ROOT_KEY, true));
        root.set_permitted(false);

        let status = gateway.status().await;
        assert_eq!(status.backend, BackendKind::Root);
        assert!(status.available);
        assert!(!status.permitted);
        assert!(!status.is_ready());
    }

    #[tokio::test]
    async fn should_read_preference_once_when_reporting_status() {
        let (gateway, settings, root, _) = gateway(MemorySettings::with(USE_ROOT_KEY, true));
        root.set_available(false);

        let status = gateway.status().await;

        assert_eq!(settings.reads(), 1);
        assert_eq!(status.backend, BackendKind::Root);
        assert!(!status.available);
        assert!(!status.permitted);
    }
}
