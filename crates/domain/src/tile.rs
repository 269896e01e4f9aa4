//! Tile state — tri-state rendered by quick-toggle surfaces.

use serde::{Deserialize, Serialize};

/// State of a quick-toggle tile. Derived on demand from a read of the
/// underlying setting; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileState {
    On,
    Off,
    /// The gateway cannot answer; render a disabled control.
    Unavailable,
}

impl TileState {
    #[must_use]
    pub fn is_available(self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    /// The state a toggle moves to. `Unavailable` has no opposite.
    #[must_use]
    pub fn toggled(self) -> Option<Self> {
        match self {
            Self::On => Some(Self::Off),
            Self::Off => Some(Self::On),
            Self::Unavailable => None,
        }
    }

    /// Short subtitle shown under the tile label.
    #[must_use]
    pub fn subtitle(self) -> &'static str {
        match self {
            Self::On => "On",
            Self::Off => "Off",
            Self::Unavailable => "Unavailable",
        }
    }
}

impl std::fmt::Display for TileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// A tile as presented to a quick-toggle surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileSnapshot {
    pub id: String,
    pub label: String,
    pub state: TileState,
    pub subtitle: &'static str,
}

impl TileSnapshot {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, state: TileState) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            state,
            subtitle: state.subtitle(),
        }
    }
}
