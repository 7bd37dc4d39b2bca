//! Runtime permission catalogue.
//!
//! The web frontend names permissions with short lowercase strings
//! (`"camera"`, `"sms"`, ...). Each one maps onto a single Android manifest
//! permission, except `storage`, whose mapping depends on the SDK level.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// First SDK level where media reads use `READ_MEDIA_IMAGES`.
pub const SDK_TIRAMISU: u32 = 33;

/// A runtime permission a privileged operation can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Camera,
    Microphone,
    Location,
    Sms,
    Storage,
}

impl Permission {
    /// Every permission in the catalogue.
    pub const ALL: [Self; 5] = [
        Self::Camera,
        Self::Microphone,
        Self::Location,
        Self::Sms,
        Self::Storage,
    ];

    /// Name used by the JS call surface and in saved state.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Microphone => "microphone",
            Self::Location => "location",
            Self::Sms => "sms",
            Self::Storage => "storage",
        }
    }

    /// Android manifest permission requested for this entry on `sdk`.
    pub const fn manifest_name(self, sdk: u32) -> &'static str {
        match self {
            Self::Camera => "android.permission.CAMERA",
            Self::Microphone => "android.permission.RECORD_AUDIO",
            Self::Location => "android.permission.ACCESS_FINE_LOCATION",
            Self::Sms => "android.permission.SEND_SMS",
            Self::Storage if sdk >= SDK_TIRAMISU => "android.permission.READ_MEDIA_IMAGES",
            Self::Storage => "android.permission.WRITE_EXTERNAL_STORAGE",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::InvalidPermission(s.to_string()))
    }
}
