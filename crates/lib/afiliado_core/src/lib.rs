//! # afiliado_core
//!
//! Core domain logic for the AfiliadoBot dashboard client: models, the
//! persisted session store and side-channel notifications.

pub mod format;
pub mod messages;
pub mod models;
pub mod notify;
pub mod session;
pub mod validation;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
