//! Backend — the privilege-elevation mechanism a call is routed to.

use serde::{Deserialize, Serialize};

use crate::error::ExecutionError;

/// One of the two mutually exclusive privilege-elevation mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Elevated shell obtained through an `su` binary.
    Root,
    /// Externally managed privileged IPC service.
    PrivilegedService,
}

impl BackendKind {
    /// Map the persisted "use root" preference to a backend.
    #[must_use]
    pub fn from_use_root(use_root: bool) -> Self {
        if use_root {
            Self::Root
        } else {
            Self::PrivilegedService
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => f.write_str("root"),
            Self::PrivilegedService => f.write_str("privileged_service"),
        }
    }
}

/// Why a backend could not answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The backend is not installed or not running.
    NotInstalled,
    /// The backend is reachable but refused elevation.
    PermissionDenied,
    /// The backend could not be reached (spawn or IPC failure).
    Unreachable,
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInstalled => f.write_str("not installed"),
            Self::PermissionDenied => f.write_str("permission denied"),
            Self::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// Outcome of a privileged command. Every gateway call resolves to exactly
/// one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Success { stdout: String },
    Failure { code: Option<i32>, stderr: String },
    Unavailable { reason: UnavailableReason },
}

impl CommandOutcome {
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self::Success {
            stdout: stdout.into(),
        }
    }

    #[must_use]
    pub fn failure(code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::Failure {
            code,
            stderr: stderr.into(),
        }
    }

    #[must_use]
    pub fn unavailable(reason: UnavailableReason) -> Self {
        Self::Unavailable { reason }
    }

    /// Whether the backend reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Convert into a `Result`, yielding captured stdout on success.
    ///
    /// # Errors
    ///
    /// - [`ExecutionError::PermissionDenied`] when elevation was refused
    /// - [`ExecutionError::Unavailable`] for any other unavailability
    /// - [`ExecutionError::Failed`] when the command itself failed
    pub fn into_result(self) -> Result<String, ExecutionError> {
        match self {
            Self::Success { stdout } => Ok(stdout),
            Self::Failure { code, stderr } => Err(ExecutionError::Failed { code, stderr }),
            Self::Unavailable {
                reason: UnavailableReason::PermissionDenied,
            } => Err(ExecutionError::PermissionDenied),
            Self::Unavailable { reason } => Err(ExecutionError::Unavailable { reason }),
        }
    }
}

/// Readiness of the backend currently selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    pub backend: BackendKind,
    pub available: bool,
    pub permitted: bool,
}

impl BackendStatus {
    /// Both reachable and permitted, i.e. privileged calls can be issued.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.available && self.permitted
    }
}
