//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`PatchworkError`] via `#[from]` when crossing a port boundary.
//!
//! Ordinary backend unavailability and permission refusal are **not**
//! errors at the gateway level; they are values of
//! [`CommandOutcome`](crate::backend::CommandOutcome). They only become
//! [`ExecutionError`]s once an executor decides an action could not run.

use serde::Serialize;

use crate::automation::{ActionKind, Trigger};
use crate::backend::UnavailableReason;

/// Umbrella error for the application and adapter layers.
#[derive(Debug, thiserror::Error)]
pub enum PatchworkError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("action execution failed")]
    Execution(#[from] ActionError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated while building or loading a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("automation must contain at least one action")]
    NoActions,

    #[error("invalid module id {0:?}")]
    InvalidModuleId(String),

    #[error("action #{index} is invalid: {reason}")]
    InvalidAction { index: usize, reason: &'static str },

    #[error("unknown trigger {0:?}")]
    UnknownTrigger(String),

    #[error("module {0} is already registered")]
    DuplicateModule(String),

    #[error("automation #{index} fires on {actual} but the module listens for {expected}")]
    TriggerMismatch {
        index: usize,
        expected: Trigger,
        actual: Trigger,
    },
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Misuse of an API that correct configuration never produces.
///
/// These abort the operation at hand and must not be retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ProgrammerError {
    #[error("spawn requires a non-empty argv")]
    EmptyArgv,

    #[error("no executor registered for {kind} actions")]
    UnsupportedKind { kind: ActionKind },

    #[error("{expected} executor received a {actual} action")]
    MismatchedKind {
        expected: ActionKind,
        actual: ActionKind,
    },

    #[error("an executor for {kind} actions is already registered")]
    DuplicateExecutor { kind: ActionKind },
}

/// Why a privileged operation did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionError {
    /// Backend missing, unreachable or timed out.
    #[error("privilege backend unavailable ({reason})")]
    Unavailable { reason: UnavailableReason },

    /// Backend reachable but elevation refused.
    #[error("privilege elevation refused")]
    PermissionDenied,

    /// Backend ran the command and it reported failure.
    #[error("command failed (exit code {code:?}): {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error(transparent)]
    Programmer(#[from] ProgrammerError),
}

/// How a failure should surface to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserHint {
    /// Show the control disabled with an explanation.
    DisableControl,
    /// Ask the user to grant permission again.
    RequestPermission,
    /// Show a transient failure the user may retry.
    Retry,
    /// Configuration bug; nothing the user can do.
    ReportBug,
}

impl ExecutionError {
    #[must_use]
    pub fn user_hint(&self) -> UserHint {
        match self {
            Self::Unavailable { .. } => UserHint::DisableControl,
            Self::PermissionDenied => UserHint::RequestPermission,
            Self::Failed { .. } => UserHint::Retry,
            Self::Programmer(_) => UserHint::ReportBug,
        }
    }

    #[must_use]
    pub fn is_programmer_error(&self) -> bool {
        matches!(self, Self::Programmer(_))
    }
}

/// A failed action, tagged with the kind of action that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind} action failed")]
pub struct ActionError {
    pub kind: ActionKind,
    #[source]
    pub source: ExecutionError,
}

impl ActionError {
    #[must_use]
    pub fn new(kind: ActionKind, source: impl Into<ExecutionError>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }
}
