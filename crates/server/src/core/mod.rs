//! Core Service Layer
//!
//! Shared infrastructure for the bloglist server: authentication, data
//! models, configuration, storage, and error translation.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod error;
pub mod models;
pub mod router;
pub mod store;

// Re-exports for convenience
pub use config::{AppState, RunMode, ServerConfig};
pub use ctx::Ctx;
pub use error::{Error, Result};
pub use router::router;
pub use store::Store;
