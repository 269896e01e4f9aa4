//! # patchwork-adapter-root-shell
//!
//! Root-shell implementation of the
//! [`PrivilegeBackend`](patchwork_app::ports::PrivilegeBackend) port.
//!
//! ## Behaviour
//! - Availability: `sh -c "command -v su"`, bounded by the probe timeout
//! - Permission: `su -c id`, granted only on exit code 0 within the timeout
//! - `run`: the command text is written to the stdin of an `su` shell
//! - `spawn`: `su -c <quoted argv>`, killed when the handle is dropped
//!
//! A probe that times out is killed and reaped, and reports `false`.

use std::io::ErrorKind;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use patchwork_app::ports::privilege::check_argv;
use patchwork_app::ports::{PrivilegeBackend, ProcessHandle};
use patchwork_domain::backend::{CommandOutcome, UnavailableReason};
use patchwork_domain::command;
use patchwork_domain::error::ProgrammerError;

/// Where to find the elevation binary and how long probes may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootShellConfig {
    /// Elevation binary, resolved on `PATH` when not absolute.
    pub su_path: String,
    /// Unprivileged shell used for the availability probe.
    pub shell_path: String,
    pub probe_timeout: Duration,
}

impl Default for RootShellConfig {
    fn default() -> Self {
        Self {
            su_path: "su".to_string(),
            shell_path: "sh".to_string(),
            probe_timeout: Duration::from_secs(2),
        }
    }
}

/// Privilege backend driving the device's `su` binary.
#[derive(Debug, Clone, Default)]
pub struct RootShell {
    config: RootShellConfig,
}

enum Probe {
    Exited(ExitStatus),
    TimedOut,
    Failed,
}

impl RootShell {
    #[must_use]
    pub fn new(config: RootShellConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RootShellConfig {
        &self.config
    }

    async fn probe(&self, program: &str, args: &[&str]) -> Probe {
        let mut child = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                tracing::debug!(program, error = %err, "probe could not be spawned");
                return Probe::Failed;
            }
        };

        match tokio::time::timeout(self.config.probe_timeout, child.wait()).await {
            Ok(Ok(status)) => Probe::Exited(status),
            Ok(Err(err)) => {
                tracing::warn!(program, error = %err, "failed to wait for probe");
                Probe::Failed
            }
            Err(_) => {
                tracing::warn!(
                    program,
                    timeout_ms = self.config.probe_timeout.as_millis(),
                    "probe timed out, killing it"
                );
                if let Err(err) = child.kill().await {
                    tracing::warn!(program, error = %err, "failed to kill timed out probe");
                }
                Probe::TimedOut
            }
        }
    }
}

impl PrivilegeBackend for RootShell {
    #[tracing::instrument(level = "debug", skip(self), fields(su = %self.config.su_path))]
    async fn is_available(&self) -> bool {
        let lookup = format!("command -v {}", command::quote(&self.config.su_path));
        matches!(
            self.probe(&self.config.shell_path, &["-c", &lookup]).await,
            Probe::Exited(status) if status.success()
        )
    }

    #[tracing::instrument(level = "debug", skip(self), fields(su = %self.config.su_path))]
    async fn has_permission(&self) -> bool {
        match self.probe(&self.config.su_path, &["-c", "id"]).await {
            Probe::Exited(status) => status.success(),
            Probe::TimedOut | Probe::Failed => false,
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn run(&self, command: &str) -> CommandOutcome {
        let mut child = match Command::new(&self.config.su_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return CommandOutcome::unavailable(UnavailableReason::NotInstalled);
            }
            Err(err) if err.kind() == ErrorKind::PermissionDenied => {
                return CommandOutcome::unavailable(UnavailableReason::PermissionDenied);
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to start root shell");
                return CommandOutcome::unavailable(UnavailableReason::Unreachable);
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            let script = format!("{command}\nexit\n");
            if let Err(err) = stdin.write_all(script.as_bytes()).await {
                tracing::debug!(error = %err, "root shell closed its input early");
            }
        }

        match child.wait_with_output().await {
            Ok(output) if output.status.success() => {
                CommandOutcome::success(String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => CommandOutcome::failure(
                output.status.code(),
                String::from_utf8_lossy(&output.stderr),
            ),
            Err(err) => {
                tracing::warn!(error = %err, "failed to collect root shell output");
                CommandOutcome::unavailable(UnavailableReason::Unreachable)
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn spawn(&self, argv: &[String]) -> Result<Option<ProcessHandle>, ProgrammerError> {
        check_argv(argv)?;
        let spawned = Command::new(&self.config.su_path)
            .arg("-c")
            .arg(command::join(argv))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        match spawned {
            Ok(child) => Ok(Some(ProcessHandle::new(child))),
            Err(err) => {
                tracing::warn!(error = %err, "failed to spawn privileged process");
                Ok(None)
            }
        }
    }
}
