//! Action — a declarative privileged operation.

use serde::{Deserialize, Serialize};

use crate::settings::SettingsNamespace;

fn default_on() -> String {
    "1".to_string()
}

fn default_off() -> String {
    "0".to_string()
}

/// An operation to perform when an automation fires. Actions are data only;
/// executors in the app layer give them behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// `settings put <namespace> <key> <value>`.
    WriteSetting {
        namespace: SettingsNamespace,
        key: String,
        value: String,
    },
    /// Flip a setting between its `on` and `off` values.
    ToggleSetting {
        namespace: SettingsNamespace,
        key: String,
        #[serde(default = "default_on")]
        on: String,
        #[serde(default = "default_off")]
        off: String,
    },
    /// Start an activity component (`package/.Activity`).
    LaunchComponent { component: String },
    /// `setprop <key> <value>`.
    WriteSystemProperty { key: String, value: String },
    /// Raw shell command passed verbatim to the elevated shell.
    Shell { command: String },
    /// Wait before continuing to the next action.
    Delay { millis: u64 },
}

/// Discriminant of [`Action`], used to route to an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    WriteSetting,
    ToggleSetting,
    LaunchComponent,
    WriteSystemProperty,
    Shell,
    Delay,
}

impl ActionKind {
    pub const ALL: [Self; 6] = [
        Self::WriteSetting,
        Self::ToggleSetting,
        Self::LaunchComponent,
        Self::WriteSystemProperty,
        Self::Shell,
        Self::Delay,
    ];
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WriteSetting => f.write_str("write_setting"),
            Self::ToggleSetting => f.write_str("toggle_setting"),
            Self::LaunchComponent => f.write_str("launch_component"),
            Self::WriteSystemProperty => f.write_str("write_system_property"),
            Self::Shell => f.write_str("shell"),
            Self::Delay => f.write_str("delay"),
        }
    }
}

impl Action {
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::WriteSetting { .. } => ActionKind::WriteSetting,
            Self::ToggleSetting { .. } => ActionKind::ToggleSetting,
            Self::LaunchComponent { .. } => ActionKind::LaunchComponent,
            Self::WriteSystemProperty { .. } => ActionKind::WriteSystemProperty,
            Self::Shell { .. } => ActionKind::Shell,
            Self::Delay { .. } => ActionKind::Delay,
        }
    }

    /// Check the action's own fields. Returns a short reason on failure.
    pub(crate) fn check(&self) -> Result<(), &'static str> {
        match self {
            Self::WriteSetting { key, .. } | Self::ToggleSetting { key, .. } => {
                if key.is_empty() || key.chars().any(char::is_whitespace) {
                    return Err("setting key must be a non-empty token");
                }
            }
            Self::LaunchComponent { component } => {
                if !component.contains('/') {
                    return Err("component must be `package/activity`");
                }
            }
            Self::WriteSystemProperty { key, .. } => {
                if key.is_empty() || key.chars().any(char::is_whitespace) {
                    return Err("property key must be a non-empty token");
                }
            }
            Self::Shell { command } => {
                if command.trim().is_empty() {
                    return Err("shell command must not be empty");
                }
            }
            Self::Delay { .. } => {}
        }
        Ok(())
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WriteSetting {
                namespace,
                key,
                value,
            } => write!(f, "write_setting({namespace}/{key}={value})"),
            Self::ToggleSetting { namespace, key, .. } => {
                write!(f, "toggle_setting({namespace}/{key})")
            }
            Self::LaunchComponent { component } => write!(f, "launch_component({component})"),
            Self::WriteSystemProperty { key, value } => {
                write!(f, "write_system_property({key}={value})")
            }
            Self::Shell { .. } => f.write_str("shell(..)"),
            Self::Delay { millis } => write!(f, "delay({millis}ms)"),
        }
    }
}
