//! Privileged actions that can be deferred behind a permission prompt.
//!
//! A [`PendingAction`] is the strongly typed replacement for the string-keyed
//! "pending action" of the web shell: each kind carries exactly the payload it
//! needs to be replayed once the user answers the permission prompt.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::permissions::Permission;

/// Payload-free discriminant of a [`PendingAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "takePhoto")]
    TakePhoto,
    #[serde(rename = "recordVideo")]
    RecordVideo,
    #[serde(rename = "startRecording")]
    StartAudioRecording,
    #[serde(rename = "recordVideoBackground")]
    RecordVideoBackground,
    #[serde(rename = "sendSMS")]
    SendSms,
    #[serde(rename = "getLocation")]
    GetLocation,
}

impl ActionKind {
    pub const ALL: [Self; 6] = [
        Self::TakePhoto,
        Self::RecordVideo,
        Self::StartAudioRecording,
        Self::RecordVideoBackground,
        Self::SendSms,
        Self::GetLocation,
    ];

    /// Stable name, shared with the JS surface and persisted state.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TakePhoto => "takePhoto",
            Self::RecordVideo => "recordVideo",
            Self::StartAudioRecording => "startRecording",
            Self::RecordVideoBackground => "recordVideoBackground",
            Self::SendSms => "sendSMS",
            Self::GetLocation => "getLocation",
        }
    }

    /// Permissions the action needs, in the order they are requested.
    pub const fn required_permissions(self) -> &'static [Permission] {
        match self {
            Self::TakePhoto | Self::RecordVideo => &[Permission::Camera],
            Self::StartAudioRecording => &[Permission::Microphone],
            Self::RecordVideoBackground => &[Permission::Camera, Permission::Microphone],
            Self::SendSms => &[Permission::Sms],
            Self::GetLocation => &[Permission::Location],
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::InvalidAction(s.to_string()))
    }
}

/// A privileged operation awaiting a permission grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PendingAction {
    TakePhoto,
    RecordVideo,
    StartAudioRecording,
    RecordVideoBackground,
    SendSms { number: String, message: String },
    GetLocation,
}

impl PendingAction {
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::TakePhoto => ActionKind::TakePhoto,
            Self::RecordVideo => ActionKind::RecordVideo,
            Self::StartAudioRecording => ActionKind::StartAudioRecording,
            Self::RecordVideoBackground => ActionKind::RecordVideoBackground,
            Self::SendSms { .. } => ActionKind::SendSms,
            Self::GetLocation => ActionKind::GetLocation,
        }
    }

    pub const fn required_permissions(&self) -> &'static [Permission] {
        self.kind().required_permissions()
    }

    /// Rebuild an action from its kind and the flat SMS fields of saved state.
    ///
    /// An SMS action without both a number and a message cannot be replayed
    /// and is rejected.
    pub fn from_parts(
        kind: ActionKind,
        sms_number: Option<&str>,
        sms_message: Option<&str>,
    ) -> crate::Result<Self> {
        Ok(match kind {
            ActionKind::TakePhoto => Self::TakePhoto,
            ActionKind::RecordVideo => Self::RecordVideo,
            ActionKind::StartAudioRecording => Self::StartAudioRecording,
            ActionKind::RecordVideoBackground => Self::RecordVideoBackground,
            ActionKind::GetLocation => Self::GetLocation,
            ActionKind::SendSms => match (sms_number, sms_message) {
                (Some(number), Some(message)) => Self::SendSms {
                    number: number.to_string(),
                    message: message.to_string(),
                },
                _ => {
                    return Err(Error::InvalidAction(
                        "sendSMS without number and message".to_string(),
                    ));
                }
            },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn video_background_needs_camera_then_microphone() {
        assert_eq!(
            ActionKind::RecordVideoBackground.required_permissions(),
            &[Permission::Camera, Permission::Microphone]
        );
        assert_eq!(
            PendingAction::TakePhoto.required_permissions(),
            &[Permission::Camera]
        );
    }

    #[test]
    fn wire_names_parse_back() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
        assert!("openCamera".parse::<ActionKind>().is_err());
    }

    #[test]
    fn sms_from_parts_requires_both_fields() {
        let action =
            PendingAction::from_parts(ActionKind::SendSms, Some("+15551234567"), Some("hi"))
                .unwrap();
        assert_eq!(
            action,
            PendingAction::SendSms {
                number: "+15551234567".to_string(),
                message: "hi".to_string(),
            }
        );
        assert!(PendingAction::from_parts(ActionKind::SendSms, Some("+1"), None).is_err());
        assert_eq!(
            PendingAction::from_parts(ActionKind::GetLocation, None, None).unwrap(),
            PendingAction::GetLocation
        );
    }

    #[test]
    fn sms_payload_serializes_with_kind_tag() {
        let action = PendingAction::SendSms {
            number: "123".to_string(),
            message: "yo".to_string(),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["kind"], "sendSms");
        assert_eq!(json["number"], "123");
    }
}
