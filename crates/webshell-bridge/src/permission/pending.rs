//! Single-slot store for the action awaiting a permission answer.

use std::time::Instant;

use tracing::{debug, info};
use webshell_core::{PendingAction, Permission};

use super::types::PermissionTicket;

/// An action parked behind a permission prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub ticket: PermissionTicket,
    pub action: PendingAction,
    /// Permission the outstanding prompt is for.
    pub permission: Permission,
    pub created_at: Instant,
}

impl PendingEntry {
    pub fn new(ticket: PermissionTicket, action: PendingAction, permission: Permission) -> Self {
        Self {
            ticket,
            action,
            permission,
            created_at: Instant::now(),
        }
    }
}

/// Holds at most one [`PendingEntry`]. Arming overwrites.
#[derive(Debug, Default)]
pub struct PendingSlot {
    entry: Option<PendingEntry>,
}

impl PendingSlot {
    pub const fn new() -> Self {
        Self { entry: None }
    }

    /// Park `entry`, returning the entry it replaced.
    pub fn arm(&mut self, entry: PendingEntry) -> Option<PendingEntry> {
        debug!(
            ticket = %entry.ticket,
            action = %entry.action.kind(),
            permission = %entry.permission,
            "Armed pending action"
        );
        let previous = self.entry.replace(entry);
        if let Some(ref dropped) = previous {
            info!(
                ticket = %dropped.ticket,
                action = %dropped.action.kind(),
                "Pending action overwritten"
            );
        }
        previous
    }

    pub const fn get(&self) -> Option<&PendingEntry> {
        self.entry.as_ref()
    }

    /// Remove and return the entry if it was armed with `ticket`.
    pub fn take_matching(&mut self, ticket: PermissionTicket) -> Option<PendingEntry> {
        if self.entry.as_ref().is_some_and(|e| e.ticket == ticket) {
            self.entry.take()
        } else {
            None
        }
    }

    pub fn clear(&mut self) -> Option<PendingEntry> {
        self.entry.take()
    }

    pub const fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}
