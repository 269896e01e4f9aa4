//! Trigger — the device event that activates an automation.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A payload-free device event delivered by the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    ScreenOff,
    ScreenOn,
    ChargerConnected,
    ChargerDisconnected,
}

impl Trigger {
    pub const ALL: [Self; 4] = [
        Self::ScreenOff,
        Self::ScreenOn,
        Self::ChargerConnected,
        Self::ChargerDisconnected,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScreenOff => "screen_off",
            Self::ScreenOn => "screen_on",
            Self::ChargerConnected => "charger_connected",
            Self::ChargerDisconnected => "charger_disconnected",
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Trigger {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownTrigger(s.to_string()))
    }
}
