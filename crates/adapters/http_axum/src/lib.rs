//! # patchwork-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Accept device **triggers** from the host (`POST /api/triggers/{trigger}`)
//! - Expose **tile state** and activation (`/api/tiles`)
//! - Report and switch the **active backend** (`/api/backend`)
//! - Manage **modules**: status, automation lists, global enable
//! - Map application errors into HTTP status codes
//!
//! ## Dependency rule
//! Depends on `patchwork-app` (for ports, gateway, registry and tiles) and
//! `patchwork-domain` (for request/response types). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
