//! webshell Core Library
//!
//! Shared functionality for webshell components:
//! - Runtime permission catalogue and manifest mapping
//! - Pending privileged actions with typed payloads
//! - Saved instance state (string key/value bundle)
//! - Configuration resolution and hierarchy
//! - Common error types

pub mod actions;
pub mod config;
pub mod error;
pub mod permissions;
pub mod saved_state;
pub mod tracing_init;

pub use actions::{ActionKind, PendingAction};
pub use config::Config;
pub use error::{Error, Result};
pub use permissions::Permission;
pub use saved_state::SavedState;
