//! # patchwork-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the [`SettingsStore`](patchwork_app::ports::SettingsStore) port
//! - Open the `SQLite` connection pool
//! - Run database migrations (using sqlx embedded migrations)
//! - Store preferences and automation lists as JSON text
//!
//! ## Dependency rule
//! Depends on `patchwork-app` (for port traits) and `patchwork-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod settings_store;

pub use error::StorageError;
pub use settings_store::SqliteSettingsStore;
