//! # patchwork-domain
//!
//! Pure domain model for the patchwork privileged-automation system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Backends** (root shell, privileged service) and the
//!   tri-valued [`CommandOutcome`](backend::CommandOutcome) of a privileged call
//! - Define **Actions** (declarative privileged operations) and
//!   **Automations** (trigger → ordered actions)
//! - Define **Modules** lifecycle state and run reports
//! - Define **Tile state** (on / off / unavailable)
//! - Build shell command text for the common privileged operations
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod backend;
pub mod command;
pub mod module;
pub mod settings;
pub mod tile;
