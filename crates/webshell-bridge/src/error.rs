//! Bridge error types.

use webshell_core::{ActionKind, Permission};

use crate::platform::{DeviceError, PlatformError};
use crate::recording::RecordingError;

/// Failure of a single bridge operation.
///
/// None of these are fatal: the bridge logs them and shows a toast.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The user declined the permission an action needed.
    #[error("Permission {permission} denied for {action}")]
    PermissionDenied {
        permission: Permission,
        action: ActionKind,
    },

    /// No app or hardware can serve the request.
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// File write or copy failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error(transparent)]
    Platform(PlatformError),
}

impl From<PlatformError> for BridgeError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::NoHandler(what) => Self::DeviceUnavailable(what),
            other => Self::Platform(other),
        }
    }
}

impl From<DeviceError> for BridgeError {
    fn from(err: DeviceError) -> Self {
        Self::DeviceUnavailable(err.to_string())
    }
}
