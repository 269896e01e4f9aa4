//! # patchwork-adapter-virtual
//!
//! Simulated privileged service for demos and tests. It implements the
//! [`PrivilegeBackend`] and [`DeviceSettingsReader`] ports against an
//! in-memory [`VirtualDevice`].
//!
//! ## Understood commands
//!
//! | Command | Effect |
//! |---------|--------|
//! | `settings get\|put\|delete <ns> <key> [value]` | Settings table |
//! | `setprop <key> <value>` / `getprop <key>` | System properties |
//! | `am start -n <pkg/.Activity>` | Recorded in the launch log |
//! | `id`, `true`, `false` | Fixed answers |
//!
//! Anything else fails with exit code 127. `spawn` starts the argv as an
//! ordinary local process.
//!
//! ## Dependency rule
//!
//! Depends on `patchwork-app` (port traits) and `patchwork-domain` only.

mod device;
mod shell;

pub use device::VirtualDevice;

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::process::Command;

use patchwork_app::ports::privilege::check_argv;
use patchwork_app::ports::{DeviceSettingsReader, PrivilegeBackend, ProcessHandle};
use patchwork_domain::backend::{CommandOutcome, UnavailableReason};
use patchwork_domain::error::{ExecutionError, ProgrammerError};
use patchwork_domain::settings::SettingsNamespace;

/// A privileged service that is running and has granted permission unless
/// told otherwise.
pub struct VirtualPrivilegedService {
    running: AtomicBool,
    permitted: AtomicBool,
    device: VirtualDevice,
}

impl Default for VirtualPrivilegedService {
    fn default() -> Self {
        let device = VirtualDevice::default();
        device.put_setting(SettingsNamespace::System, "master_mono", "0");
        Self {
            running: AtomicBool::new(true),
            permitted: AtomicBool::new(true),
            device,
        }
    }
}

impl VirtualPrivilegedService {
    /// Simulate the service process starting or dying.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    /// Simulate the user granting or revoking the service permission.
    pub fn set_permitted(&self, permitted: bool) {
        self.permitted.store(permitted, Ordering::SeqCst);
    }

    #[must_use]
    pub fn device(&self) -> &VirtualDevice {
        &self.device
    }

    fn refusal(&self) -> Option<UnavailableReason> {
        if !self.running.load(Ordering::SeqCst) {
            Some(UnavailableReason::Unreachable)
        } else if !self.permitted.load(Ordering::SeqCst) {
            Some(UnavailableReason::PermissionDenied)
        } else {
            None
        }
    }
}

impl PrivilegeBackend for VirtualPrivilegedService {
    async fn is_available(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn has_permission(&self) -> bool {
        self.refusal().is_none()
    }

    async fn run(&self, command: &str) -> CommandOutcome {
        if let Some(reason) = self.refusal() {
            tracing::debug!(%reason, "virtual service refused command");
            return CommandOutcome::unavailable(reason);
        }
        let outcome = self.device.execute(command);
        tracing::debug!(command, ?outcome, "virtual service ran command");
        outcome
    }

    async fn spawn(&self, argv: &[String]) -> Result<Option<ProcessHandle>, ProgrammerError> {
        check_argv(argv)?;
        if self.refusal().is_some() {
            return Ok(None);
        }
        let spawned = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        match spawned {
            Ok(child) => Ok(Some(ProcessHandle::new(child))),
            Err(err) => {
                tracing::warn!(program = %argv[0], error = %err, "failed to spawn process");
                Ok(None)
            }
        }
    }
}

impl DeviceSettingsReader for VirtualPrivilegedService {
    async fn read(
        &self,
        namespace: SettingsNamespace,
        key: &str,
    ) -> Result<Option<String>, ExecutionError> {
        Ok(self.device.setting(namespace, key))
    }
}
