//! Domain models shared by the API client and the CLI.
//!
//! Field names follow the backend's JSON (snake_case), so the same types are
//! used for wire payloads and for the persisted session copy.

pub mod auth;
pub mod product;
