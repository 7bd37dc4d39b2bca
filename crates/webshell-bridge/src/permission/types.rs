//! Permission coordinator types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use webshell_core::{ActionKind, PendingAction, Permission};

/// Correlation token tying a permission answer to the request that asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTicket(u64);

impl PermissionTicket {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PermissionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PermissionTicket {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// The host's answer to a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResponse {
    /// Ticket the prompt was issued with.
    pub ticket: PermissionTicket,
    /// Permission the host actually answered for.
    pub permission: Permission,
    pub granted: bool,
}

/// Outcome of gating an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// All permissions held; run the action now.
    Proceed(PendingAction),
    /// A prompt was issued and the action parked.
    Deferred {
        ticket: PermissionTicket,
        permission: Permission,
    },
}

/// Outcome of feeding a permission answer to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Every permission granted; run the parked action.
    Execute(PendingAction),
    /// The parked action was dropped without running.
    Denied {
        action: PendingAction,
        permission: Permission,
    },
    /// Granted, but the action needs another permission; a new prompt is out.
    AwaitingNext {
        ticket: PermissionTicket,
        permission: Permission,
    },
    /// The answer belongs to no parked action.
    Unsolicited,
}

/// Observable state of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "action", rename_all = "camelCase")]
pub enum BridgeState {
    Idle,
    AwaitingPermission(ActionKind),
}
