//! Permission coordinator.
//!
//! Decides whether an action runs now or waits for a prompt, and turns the
//! host's answer back into a decision about the parked action.

use tracing::{debug, info, warn};
use webshell_core::{PendingAction, Permission};

use crate::platform::Platform;

use super::pending::{PendingEntry, PendingSlot};
use super::types::{BridgeState, Gate, PermissionResponse, PermissionTicket, Resolution};

/// Owns the pending slot and the ticket counter.
#[derive(Debug, Default)]
pub struct PermissionCoordinator {
    slot: PendingSlot,
    next_ticket: u64,
}

impl PermissionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` now if every permission it needs is held, otherwise park it
    /// and prompt for the first missing permission.
    pub fn gate<P: Platform + ?Sized>(&mut self, action: PendingAction, platform: &mut P) -> Gate {
        let Some(permission) = first_missing(action.required_permissions(), None, platform) else {
            return Gate::Proceed(action);
        };

        let ticket = self.park(action, permission);
        request_with(platform, permission, ticket);
        Gate::Deferred { ticket, permission }
    }

    /// Prompt for `permission` without parking anything.
    pub fn request<P: Platform + ?Sized>(
        &mut self,
        permission: Permission,
        platform: &mut P,
    ) -> PermissionTicket {
        let ticket = self.issue();
        request_with(platform, permission, ticket);
        ticket
    }

    /// Feed the host's answer to a prompt.
    pub fn resolve<P: Platform + ?Sized>(
        &mut self,
        response: PermissionResponse,
        platform: &mut P,
    ) -> Resolution {
        let Some(entry) = self.slot.take_matching(response.ticket) else {
            debug!(
                ticket = %response.ticket,
                permission = %response.permission,
                granted = response.granted,
                "Permission answer matches no pending action"
            );
            return Resolution::Unsolicited;
        };

        if entry.permission != response.permission {
            warn!(
                ticket = %response.ticket,
                expected = %entry.permission,
                actual = %response.permission,
                action = %entry.action.kind(),
                "Permission answer mismatch, dropping pending action"
            );
            return Resolution::Denied {
                action: entry.action,
                permission: entry.permission,
            };
        }

        if !response.granted {
            info!(
                ticket = %response.ticket,
                action = %entry.action.kind(),
                permission = %entry.permission,
                "Permission denied"
            );
            return Resolution::Denied {
                action: entry.action,
                permission: entry.permission,
            };
        }

        let required = entry.action.required_permissions();
        if let Some(next) = first_missing(required, Some(entry.permission), platform) {
            let ticket = self.park(entry.action, next);
            request_with(platform, next, ticket);
            return Resolution::AwaitingNext {
                ticket,
                permission: next,
            };
        }

        info!(
            ticket = %response.ticket,
            action = %entry.action.kind(),
            "Permission granted, running pending action"
        );
        Resolution::Execute(entry.action)
    }

    pub fn state(&self) -> BridgeState {
        self.slot.get().map_or(BridgeState::Idle, |e| {
            BridgeState::AwaitingPermission(e.action.kind())
        })
    }

    pub fn pending(&self) -> Option<&PendingEntry> {
        self.slot.get()
    }

    /// Re-park an entry recovered from saved state.
    ///
    /// Later tickets are issued above the restored one so the re-delivered
    /// answer still matches and a fresh prompt never collides with it.
    pub fn restore(&mut self, entry: PendingEntry) {
        self.next_ticket = self.next_ticket.max(entry.ticket.get().saturating_add(1));
        self.slot.arm(entry);
    }

    /// Drop the parked action, if any.
    pub fn clear(&mut self) -> Option<PendingEntry> {
        self.slot.clear()
    }

    fn issue(&mut self) -> PermissionTicket {
        let ticket = PermissionTicket::new(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);
        ticket
    }

    fn park(&mut self, action: PendingAction, permission: Permission) -> PermissionTicket {
        let ticket = self.issue();
        self.slot.arm(PendingEntry::new(ticket, action, permission));
        ticket
    }
}

/// First permission in `required` the platform does not hold.
///
/// `just_granted` is skipped even if the platform has not caught up yet, so a
/// lagging grant cannot re-prompt for the same permission forever.
fn first_missing<P: Platform + ?Sized>(
    required: &[Permission],
    just_granted: Option<Permission>,
    platform: &P,
) -> Option<Permission> {
    required
        .iter()
        .copied()
        .filter(|p| Some(*p) != just_granted)
        .find(|p| !platform.check_permission(*p))
}

fn request_with<P: Platform + ?Sized>(
    platform: &mut P,
    permission: Permission,
    ticket: PermissionTicket,
) {
    info!(
        ticket = %ticket,
        permission = %permission,
        manifest = permission.manifest_name(platform.sdk_level()),
        "Requesting permission"
    );
    platform.request_permission(permission, ticket);
}
