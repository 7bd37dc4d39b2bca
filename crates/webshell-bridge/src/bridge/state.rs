//! Save and restore across activity recreation.

use std::path::Path;

use tracing::{debug, info, warn};
use webshell_core::saved_state::{
    KEY_CURRENT_PHOTO_PATH, KEY_PENDING_ACTION, KEY_PENDING_PERMISSION, KEY_PENDING_SMS_MESSAGE,
    KEY_PENDING_SMS_NUMBER, KEY_PENDING_TICKET, KEY_WEBVIEW_URL,
};
use webshell_core::{ActionKind, Error, PendingAction, Permission, SavedState};

use crate::permission::{PendingEntry, PermissionTicket};
use crate::platform::Platform;

use super::WebBridge;

impl<P: Platform> WebBridge<P> {
    /// Snapshot of everything that must survive recreation.
    pub fn save_state(&self) -> SavedState {
        let mut state = SavedState::new();
        if let Some(entry) = self.permissions.pending() {
            write_pending(&mut state, entry);
        }
        state.put_opt(
            KEY_CURRENT_PHOTO_PATH,
            self.current_photo.as_deref().and_then(Path::to_str),
        );
        state.put_opt(KEY_WEBVIEW_URL, self.webview_url.as_deref());
        debug!(keys = state.len(), "Saved bridge state");
        state
    }

    /// Re-apply a snapshot taken by [`WebBridge::save_state`].
    ///
    /// Entries that can no longer be honoured are dropped: a pending action
    /// that fails to parse, or a photo path whose file is gone.
    pub fn restore_state(&mut self, state: &SavedState) {
        match read_pending(state) {
            Ok(Some(entry)) => {
                info!(
                    ticket = %entry.ticket,
                    action = %entry.action.kind(),
                    "Restored pending action"
                );
                self.permissions.restore(entry);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Dropping unrestorable pending action"),
        }

        if let Some(path) = state.get(KEY_CURRENT_PHOTO_PATH) {
            let path = Path::new(path);
            if path.exists() {
                self.current_photo = Some(path.to_path_buf());
            } else {
                warn!(path = %path.display(), "Saved photo file no longer exists");
            }
        }

        if let Some(url) = state.get(KEY_WEBVIEW_URL) {
            self.webview_url = Some(url.to_string());
        }
    }
}

fn write_pending(state: &mut SavedState, entry: &PendingEntry) {
    state.put(KEY_PENDING_ACTION, entry.action.kind().as_str());
    state.put(KEY_PENDING_TICKET, entry.ticket.to_string());
    state.put(KEY_PENDING_PERMISSION, entry.permission.as_str());
    if let PendingAction::SendSms { number, message } = &entry.action {
        state.put(KEY_PENDING_SMS_NUMBER, number.as_str());
        state.put(KEY_PENDING_SMS_MESSAGE, message.as_str());
    }
}

fn read_pending(state: &SavedState) -> webshell_core::Result<Option<PendingEntry>> {
    let Some(kind) = state.get(KEY_PENDING_ACTION) else {
        return Ok(None);
    };
    let kind: ActionKind = kind.parse()?;
    let action = PendingAction::from_parts(
        kind,
        state.get(KEY_PENDING_SMS_NUMBER),
        state.get(KEY_PENDING_SMS_MESSAGE),
    )?;

    let ticket: PermissionTicket = state
        .get(KEY_PENDING_TICKET)
        .ok_or_else(|| Error::InvalidAction(format!("{kind} saved without a ticket")))?
        .parse()
        .map_err(|e| Error::InvalidAction(format!("bad ticket for {kind}: {e}")))?;

    let permission: Permission = match state.get(KEY_PENDING_PERMISSION) {
        Some(name) => name.parse()?,
        None => kind
            .required_permissions()
            .first()
            .copied()
            .ok_or_else(|| Error::InvalidAction(format!("{kind} needs no permission")))?,
    };

    Ok(Some(PendingEntry::new(ticket, action, permission)))
}
