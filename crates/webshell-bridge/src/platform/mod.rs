//! Host platform abstraction.
//!
//! Everything the bridge needs from the operating system goes through the
//! [`Platform`] trait: permission checks and prompts, toasts, script
//! evaluation in the WebView, activity launches and the sensors behind the
//! informational calls. The Android host implements it over JNI; tests use
//! [`simulated::SimulatedHost`].

mod media;
pub mod simulated;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use webshell_core::Permission;

use crate::permission::PermissionTicket;

pub use media::{
    AudioEncoder, CameraHandle, DeviceError, DeviceGuard, FsMediaStore, MediaCollection,
    MediaDevices, MediaStore, OutputFormat, RecorderHandle, RecorderProfile, Release,
    VideoSettings,
};

/// Failure reported by the host for a single platform call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// No installed application can handle the request.
    #[error("No application available for {0}")]
    NoHandler(String),

    /// The service exists but cannot answer right now.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Failed(String),
}

/// Toast display duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToastLength {
    Short,
    Long,
}

/// An activity the host is asked to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Intent {
    /// Still capture written to `output`.
    CaptureImage { output: PathBuf },
    /// Video capture through the system camera app.
    CaptureVideo,
    /// Content picker filtered by MIME type.
    PickContent { mime: String },
    Dial { number: String },
    SendEmail {
        to: String,
        subject: String,
        body: String,
    },
    Share { content: String, mime: String },
    View { url: String },
}

impl Intent {
    /// Short label used in logs and error messages.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CaptureImage { .. } => "image capture",
            Self::CaptureVideo => "video capture",
            Self::PickContent { .. } => "content picker",
            Self::Dial { .. } => "dialer",
            Self::SendEmail { .. } => "email",
            Self::Share { .. } => "share",
            Self::View { .. } => "browser",
        }
    }
}

/// Build identification returned by `getDeviceInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub model: String,
    pub manufacturer: String,
    pub version: String,
    pub sdk: u32,
    pub brand: String,
    pub device: String,
    pub product: String,
}

/// Active network summary returned by `getNetworkInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub connected: bool,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "isWiFi")]
    pub is_wifi: bool,
    #[serde(rename = "isMobile")]
    pub is_mobile: bool,
    #[serde(rename = "isMetered")]
    pub is_metered: bool,
}

impl NetworkInfo {
    /// No active network.
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            kind: "None".to_string(),
            is_wifi: false,
            is_mobile: false,
            is_metered: false,
        }
    }
}

/// Last known GPS fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Host services used by the bridge.
///
/// All methods are called from the single UI task; none of them may block
/// waiting for user interaction. Permission prompts answer later through
/// [`crate::WebBridge::on_permission_result`].
pub trait Platform: Send + 'static {
    /// Current grant state, queried fresh every time.
    fn check_permission(&self, permission: Permission) -> bool;

    /// Show the system prompt for `permission`. The answer must carry `ticket`.
    fn request_permission(&mut self, permission: Permission, ticket: PermissionTicket);

    /// SDK level of the running OS.
    fn sdk_level(&self) -> u32;

    fn show_toast(&mut self, message: &str, length: ToastLength);

    /// Evaluate `script` in the WebView.
    fn evaluate_script(&mut self, script: &str);

    fn launch(&mut self, intent: Intent) -> Result<(), PlatformError>;

    fn send_sms(&mut self, number: &str, message: &str) -> Result<(), PlatformError>;

    fn last_known_location(&self) -> Result<Option<Location>, PlatformError>;

    fn device_info(&self) -> DeviceInfo;

    /// Battery capacity in percent.
    fn battery_level(&self) -> Result<u8, PlatformError>;

    fn network_info(&self) -> Result<NetworkInfo, PlatformError>;

    fn vibrate(&mut self, duration_ms: u64) -> Result<(), PlatformError>;

    /// Close the hosting activity.
    fn finish(&mut self);

    /// Camera and recorder hardware.
    fn devices(&mut self) -> &mut dyn MediaDevices;
}
