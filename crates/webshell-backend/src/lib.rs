//! webshell Backend
//!
//! Native side that hosts the web frontend:
//! - Embedded axum server for static assets and `/api` routes
//! - [`NativeBackend`] entry points shared by the binary and the host app
//! - JNI exports on Android

#[cfg(target_os = "android")]
mod jni_exports;
pub mod native;
pub mod routes;
pub mod server;

pub use native::NativeBackend;
pub use server::{EmbeddedServer, ServerError};
