//! The catalogue of calls the web frontend can make.
//!
//! On the wire a call is `{"method": "<name>", "args": {...}}`; `args` is
//! omitted for calls without parameters.

use serde::{Deserialize, Serialize};

/// One JS-to-native call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "method",
    content = "args",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum BridgeCall {
    // Console
    Log { message: String },
    Info { message: String },
    Warn { message: String },
    Error { message: String },

    // Permissions
    RequestPermission { permission: String },
    CheckPermission { permission: String },

    // Audio
    StartRecording,
    StopRecording,
    RecordAudio,
    IsRecording,

    // Background video
    RecordVideoBackground,
    StopVideoRecording,
    IsVideoRecording,

    // Camera and pickers
    TakePhoto,
    RecordVideo,
    OpenCamera,
    OpenGallery,
    PickImage,
    OpenFile,
    PickFile,
    SaveFile { filename: String, content: String },

    // Device information
    GetDeviceInfo,
    GetBatteryLevel,
    GetNetworkInfo,

    Vibrate { duration: u64 },
    #[serde(rename = "sendSMS")]
    SendSms { number: String, message: String },
    GetLocation,
    #[serde(rename = "startGPS")]
    StartGps,
    PlaySound { sound_type: String },

    // Notifications
    ShowToast { message: String },
    ShowNotification { title: String, message: String },

    // Outbound intents
    MakeCall { phone_number: String },
    SendEmail { email: String, subject: String, body: String },
    ShareContent { content: String, mime_type: String },
    OpenBrowser { url: String },
    CloseApp,
}

impl BridgeCall {
    /// Wire name of the call.
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Log { .. } => "log",
            Self::Info { .. } => "info",
            Self::Warn { .. } => "warn",
            Self::Error { .. } => "error",
            Self::RequestPermission { .. } => "requestPermission",
            Self::CheckPermission { .. } => "checkPermission",
            Self::StartRecording => "startRecording",
            Self::StopRecording => "stopRecording",
            Self::RecordAudio => "recordAudio",
            Self::IsRecording => "isRecording",
            Self::RecordVideoBackground => "recordVideoBackground",
            Self::StopVideoRecording => "stopVideoRecording",
            Self::IsVideoRecording => "isVideoRecording",
            Self::TakePhoto => "takePhoto",
            Self::RecordVideo => "recordVideo",
            Self::OpenCamera => "openCamera",
            Self::OpenGallery => "openGallery",
            Self::PickImage => "pickImage",
            Self::OpenFile => "openFile",
            Self::PickFile => "pickFile",
            Self::SaveFile { .. } => "saveFile",
            Self::GetDeviceInfo => "getDeviceInfo",
            Self::GetBatteryLevel => "getBatteryLevel",
            Self::GetNetworkInfo => "getNetworkInfo",
            Self::Vibrate { .. } => "vibrate",
            Self::SendSms { .. } => "sendSMS",
            Self::GetLocation => "getLocation",
            Self::StartGps => "startGPS",
            Self::PlaySound { .. } => "playSound",
            Self::ShowToast { .. } => "showToast",
            Self::ShowNotification { .. } => "showNotification",
            Self::MakeCall { .. } => "makeCall",
            Self::SendEmail { .. } => "sendEmail",
            Self::ShareContent { .. } => "shareContent",
            Self::OpenBrowser { .. } => "openBrowser",
            Self::CloseApp => "closeApp",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_call_with_args() {
        let call: BridgeCall = serde_json::from_str(
            r#"{"method":"sendSMS","args":{"number":"+15551234567","message":"hi"}}"#,
        )
        .unwrap();
        assert_eq!(
            call,
            BridgeCall::SendSms {
                number: "+15551234567".to_string(),
                message: "hi".to_string(),
            }
        );
        assert_eq!(call.method(), "sendSMS");
    }

    #[test]
    fn parses_call_without_args() {
        let call: BridgeCall = serde_json::from_str(r#"{"method":"isRecording"}"#).unwrap();
        assert_eq!(call, BridgeCall::IsRecording);
    }

    #[test]
    fn multi_word_fields_are_camel_case() {
        let call: BridgeCall = serde_json::from_str(
            r#"{"method":"shareContent","args":{"content":"x","mimeType":"text/plain"}}"#,
        )
        .unwrap();
        assert_eq!(
            call,
            BridgeCall::ShareContent {
                content: "x".to_string(),
                mime_type: "text/plain".to_string(),
            }
        );
    }

    #[test]
    fn method_matches_serialized_tag() {
        let calls = [
            BridgeCall::StartGps,
            BridgeCall::GetDeviceInfo,
            BridgeCall::Vibrate { duration: 5 },
            BridgeCall::PlaySound {
                sound_type: "beep".to_string(),
            },
        ];
        for call in calls {
            let json = serde_json::to_value(&call).unwrap();
            assert_eq!(json["method"], call.method());
        }
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(serde_json::from_str::<BridgeCall>(r#"{"method":"selfDestruct"}"#).is_err());
    }
}
