//! # patchwork-app
//!
//! Application layer — the privilege gateway, action executors, automation
//! modules and tile reflectors, written against **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement:
//!   - `PrivilegeBackend` — probe, run and spawn through one elevation mechanism
//!   - `SettingsStore` — persisted preferences and per-module automation lists
//!   - `DeviceSettingsReader` — read a device setting without elevation
//!   - `TriggerPublisher` — deliver device triggers into the core
//! - `CommandGateway` — the single place that picks root or privileged service
//! - `ExecutorSet` — one executor per action kind
//! - `TriggeredModule` / `ModuleRegistry` — automation lifecycles
//! - `SettingTile` / `TileBoard` — tri-state quick toggles
//!
//! ## Dependency rule
//! Depends on `patchwork-domain` only (plus `tokio` for channels, tasks and
//! process handles). Never imports adapter crates.

pub mod executors;
pub mod gateway;
pub mod module;
pub mod ports;
pub mod registry;
pub mod tiles;
pub mod trigger_bus;

#[cfg(test)]
pub(crate) mod testing;
