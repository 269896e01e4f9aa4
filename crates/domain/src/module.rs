//! Automation module lifecycle and run reports.

use serde::Serialize;

use crate::error::ActionError;
use crate::id::{AutomationId, ModuleId};
use crate::time::Timestamp;

/// Lifecycle of an automation module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    #[default]
    Stopped,
    Running,
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => f.write_str("stopped"),
            Self::Running => f.write_str("running"),
        }
    }
}

/// Result of running one automation's action sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutomationReport {
    pub automation_id: AutomationId,
    pub automation_name: String,
    /// Number of actions that completed successfully.
    pub completed: usize,
    /// Number of actions in the sequence.
    pub total: usize,
    /// The failure that aborted the sequence, if any.
    pub failure: Option<ActionError>,
    pub finished_at: Timestamp,
}

impl AutomationReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Snapshot of a module for status surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleStatus {
    pub id: ModuleId,
    pub lifecycle: Lifecycle,
    pub automations: usize,
    pub last_fired: Option<Timestamp>,
    pub last_reports: Vec<AutomationReport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::ActionKind;
    use crate::error::ExecutionError;

    #[test]
    fn should_default_to_stopped() {
        assert_eq!(Lifecycle::default(), Lifecycle::Stopped);
    }

    #[test]
    fn should_report_failure_when_sequence_aborted() {
        let report = AutomationReport {
            automation_id: AutomationId::new(),
            automation_name: "test".to_string(),
            completed: 1,
            total: 3,
            failure: Some(ActionError::new(
                ActionKind::Shell,
                ExecutionError::PermissionDenied,
            )),
            finished_at: crate::time::now(),
        };
        assert!(!report.is_success());
    }
}
