//! webshell Bridge Library
//!
//! Native side of the WebView shell:
//! - Permission gate that parks privileged actions behind a prompt
//! - Audio and background video recording
//! - JS call catalogue and deferred result delivery
//! - Single UI task fed by an event queue
//! - Host platform traits and a simulated host

pub mod bridge;
pub mod error;
pub mod permission;
pub mod platform;
pub mod recording;
pub mod ui;

pub use bridge::{ActivityResult, BridgeCall, WebBridge};
pub use error::BridgeError;
pub use permission::{BridgeState, PermissionResponse, PermissionTicket};
pub use platform::Platform;
