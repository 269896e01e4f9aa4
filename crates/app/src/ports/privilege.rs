//! Privilege port — the capability contract every elevation backend offers.
//!
//! Two adapters implement it (root shell, privileged service) and the
//! [`CommandGateway`](crate::gateway::CommandGateway) implements it again on
//! top of them, so callers never learn which backend is active.

use std::future::Future;
use std::process::ExitStatus;

use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};

use patchwork_domain::backend::CommandOutcome;
use patchwork_domain::error::ProgrammerError;

/// Probe, run and spawn through one privilege-elevation mechanism.
///
/// Implementations must be safe for concurrent use and must never report
/// unavailability or refusal as an error: those are
/// [`CommandOutcome::Unavailable`] values, `false` probes, or `Ok(None)`.
pub trait PrivilegeBackend: Send + Sync {
    /// Whether the backend is installed and reachable.
    fn is_available(&self) -> impl Future<Output = bool> + Send;

    /// Whether elevation has been granted to this process.
    fn has_permission(&self) -> impl Future<Output = bool> + Send;

    /// Run a shell-syntax command verbatim in the elevated shell.
    ///
    /// Never retried internally.
    fn run(&self, command: &str) -> impl Future<Output = CommandOutcome> + Send;

    /// Launch a literal argv as a privileged process, without shell
    /// interpretation.
    ///
    /// Returns `Ok(None)` when the backend refuses or fails to launch.
    ///
    /// # Errors
    ///
    /// Returns [`ProgrammerError::EmptyArgv`] when `argv` is empty.
    fn spawn(
        &self,
        argv: &[String],
    ) -> impl Future<Output = Result<Option<ProcessHandle>, ProgrammerError>> + Send;
}

impl<T: PrivilegeBackend> PrivilegeBackend for std::sync::Arc<T> {
    fn is_available(&self) -> impl Future<Output = bool> + Send {
        (**self).is_available()
    }

    fn has_permission(&self) -> impl Future<Output = bool> + Send {
        (**self).has_permission()
    }

    fn run(&self, command: &str) -> impl Future<Output = CommandOutcome> + Send {
        (**self).run(command)
    }

    fn spawn(
        &self,
        argv: &[String],
    ) -> impl Future<Output = Result<Option<ProcessHandle>, ProgrammerError>> + Send {
        (**self).spawn(argv)
    }
}

/// Reject an empty argv before it reaches a backend.
///
/// # Errors
///
/// Returns [`ProgrammerError::EmptyArgv`] when `argv` has no program.
pub fn check_argv(argv: &[String]) -> Result<(), ProgrammerError> {
    match argv.first() {
        Some(program) if !program.is_empty() => Ok(()),
        _ => Err(ProgrammerError::EmptyArgv),
    }
}

/// A live privileged process, exclusively owned by the caller.
///
/// The process is killed when the handle is dropped, so every exit path
/// releases it.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
}

impl ProcessHandle {
    #[must_use]
    pub fn new(child: Child) -> Self {
        Self { child }
    }

    /// OS process id, `None` once the process has been reaped.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Wait for the process to exit.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if waiting fails.
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Kill the process and reap it.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the signal cannot be delivered.
    pub async fn terminate(&mut self) -> std::io::Result<()> {
        self.child.kill().await
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.start_kill();
        }
    }
}
