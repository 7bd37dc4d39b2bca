//! Permission gate between JS calls and privileged device actions.
//!
//! At most one action waits for a prompt at a time. Each prompt carries a
//! [`PermissionTicket`]; answers with a ticket that does not match the parked
//! action never run it.

mod coordinator;
mod pending;
mod types;

pub use coordinator::PermissionCoordinator;
pub use pending::{PendingEntry, PendingSlot};
pub use types::{BridgeState, Gate, PermissionResponse, PermissionTicket, Resolution};
