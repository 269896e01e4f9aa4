//! Action executors — one per [`ActionKind`], registered in an [`ExecutorSet`].
//!
//! Every privileged executor goes through the same
//! [`PrivilegeBackend`](crate::ports::PrivilegeBackend), normally the
//! [`CommandGateway`](crate::gateway::CommandGateway), and never talks to a
//! backend directly.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use patchwork_domain::automation::{Action, ActionKind};
use patchwork_domain::command;
use patchwork_domain::error::{ActionError, ProgrammerError};

use crate::ports::PrivilegeBackend;

/// Turns one kind of [`Action`] into privileged operations.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// The only kind this executor accepts.
    fn kind(&self) -> ActionKind;

    /// Execute a single action.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] when the action could not be completed, or
    /// a programmer error when `action` is of another kind.
    async fn execute(&self, action: &Action) -> Result<(), ActionError>;
}

fn mismatched(expected: ActionKind, action: &Action) -> ActionError {
    ActionError::new(
        expected,
        ProgrammerError::MismatchedKind {
            expected,
            actual: action.kind(),
        },
    )
}

async fn run_checked<G: PrivilegeBackend>(
    gateway: &G,
    kind: ActionKind,
    command: &str,
) -> Result<String, ActionError> {
    gateway
        .run(command)
        .await
        .into_result()
        .map_err(|err| ActionError::new(kind, err))
}

/// `settings put <namespace> <key> <value>`.
pub struct WriteSettingExecutor<G> {
    gateway: Arc<G>,
}

impl<G> WriteSettingExecutor<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<G: PrivilegeBackend + 'static> ActionExecutor for WriteSettingExecutor<G> {
    fn kind(&self) -> ActionKind {
        ActionKind::WriteSetting
    }

    async fn execute(&self, action: &Action) -> Result<(), ActionError> {
        let Action::WriteSetting {
            namespace,
            key,
            value,
        } = action
        else {
            return Err(mismatched(self.kind(), action));
        };
        let command = command::settings_put(*namespace, key, value);
        run_checked(self.gateway.as_ref(), self.kind(), &command).await?;
        Ok(())
    }
}

/// Reads a setting and writes back its opposite value.
///
/// Anything other than the `on` value counts as off, so an unset setting
/// is switched on.
pub struct ToggleSettingExecutor<G> {
    gateway: Arc<G>,
}

impl<G> ToggleSettingExecutor<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<G: PrivilegeBackend + 'static> ActionExecutor for ToggleSettingExecutor<G> {
    fn kind(&self) -> ActionKind {
        ActionKind::ToggleSetting
    }

    async fn execute(&self, action: &Action) -> Result<(), ActionError> {
        let Action::ToggleSetting {
            namespace,
            key,
            on,
            off,
        } = action
        else {
            return Err(mismatched(self.kind(), action));
        };
        let current = run_checked(
            self.gateway.as_ref(),
            self.kind(),
            &command::settings_get(*namespace, key),
        )
        .await?;
        let next = if current.trim() == on { off } else { on };
        run_checked(
            self.gateway.as_ref(),
            self.kind(),
            &command::settings_put(*namespace, key, next),
        )
        .await?;
        Ok(())
    }
}

/// `am start -n <component>`.
pub struct LaunchComponentExecutor<G> {
    gateway: Arc<G>,
}

impl<G> LaunchComponentExecutor<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<G: PrivilegeBackend + 'static> ActionExecutor for LaunchComponentExecutor<G> {
    fn kind(&self) -> ActionKind {
        ActionKind::LaunchComponent
    }

    async fn execute(&self, action: &Action) -> Result<(), ActionError> {
        let Action::LaunchComponent { component } = action else {
            return Err(mismatched(self.kind(), action));
        };
        let command = command::start_component(component);
        run_checked(self.gateway.as_ref(), self.kind(), &command).await?;
        Ok(())
    }
}

/// `setprop <key> <value>`.
pub struct SystemPropertyExecutor<G> {
    gateway: Arc<G>,
}

impl<G> SystemPropertyExecutor<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<G: PrivilegeBackend + 'static> ActionExecutor for SystemPropertyExecutor<G> {
    fn kind(&self) -> ActionKind {
        ActionKind::WriteSystemProperty
    }

    async fn execute(&self, action: &Action) -> Result<(), ActionError> {
        let Action::WriteSystemProperty { key, value } = action else {
            return Err(mismatched(self.kind(), action));
        };
        let command = command::set_property(key, value);
        run_checked(self.gateway.as_ref(), self.kind(), &command).await?;
        Ok(())
    }
}

/// Passes the command text verbatim to the elevated shell.
pub struct ShellExecutor<G> {
    gateway: Arc<G>,
}

impl<G> ShellExecutor<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<G: PrivilegeBackend + 'static> ActionExecutor for ShellExecutor<G> {
    fn kind(&self) -> ActionKind {
        ActionKind::Shell
    }

    async fn execute(&self, action: &Action) -> Result<(), ActionError> {
        let Action::Shell { command } = action else {
            return Err(mismatched(self.kind(), action));
        };
        run_checked(self.gateway.as_ref(), self.kind(), command).await?;
        Ok(())
    }
}

/// Sleeps without touching any backend.
#[derive(Debug, Default)]
pub struct DelayExecutor;

#[async_trait]
impl ActionExecutor for DelayExecutor {
    fn kind(&self) -> ActionKind {
        ActionKind::Delay
    }

    async fn execute(&self, action: &Action) -> Result<(), ActionError> {
        let Action::Delay { millis } = action else {
            return Err(mismatched(self.kind(), action));
        };
        tokio::time::sleep(Duration::from_millis(*millis)).await;
        Ok(())
    }
}

/// Registry of executors keyed by action kind. At most one per kind.
#[derive(Default)]
pub struct ExecutorSet {
    executors: HashMap<ActionKind, Arc<dyn ActionExecutor>>,
}

impl ExecutorSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One executor for every [`ActionKind`], all sharing `gateway`.
    #[must_use]
    pub fn with_defaults<G: PrivilegeBackend + 'static>(gateway: Arc<G>) -> Self {
        let executors: [Arc<dyn ActionExecutor>; 6] = [
            Arc::new(WriteSettingExecutor::new(gateway.clone())),
            Arc::new(ToggleSettingExecutor::new(gateway.clone())),
            Arc::new(LaunchComponentExecutor::new(gateway.clone())),
            Arc::new(SystemPropertyExecutor::new(gateway.clone())),
            Arc::new(ShellExecutor::new(gateway)),
            Arc::new(DelayExecutor),
        ];
        Self {
            executors: executors
                .into_iter()
                .map(|executor| (executor.kind(), executor))
                .collect(),
        }
    }

    /// Add an executor for a kind that has none yet.
    ///
    /// # Errors
    ///
    /// Returns [`ProgrammerError::DuplicateExecutor`] when the kind is taken.
    pub fn register(&mut self, executor: Arc<dyn ActionExecutor>) -> Result<(), ProgrammerError> {
        let kind = executor.kind();
        if self.executors.contains_key(&kind) {
            return Err(ProgrammerError::DuplicateExecutor { kind });
        }
        self.executors.insert(kind, executor);
        Ok(())
    }

    #[must_use]
    pub fn supports(&self, kind: ActionKind) -> bool {
        self.executors.contains_key(&kind)
    }

    /// Dispatch `action` to the executor registered for its kind.
    ///
    /// # Errors
    ///
    /// Returns the executor's [`ActionError`], or a programmer error when no
    /// executor is registered for the kind.
    pub async fn execute(&self, action: &Action) -> Result<(), ActionError> {
        let kind = action.kind();
        let Some(executor) = self.executors.get(&kind) else {
            tracing::error!(%kind, "no executor registered for action kind");
            return Err(ActionError::new(
                kind,
                ProgrammerError::UnsupportedKind { kind },
            ));
        };
        tracing::debug!(%action, "executing action");
        executor.execute(action).await
    }
}
