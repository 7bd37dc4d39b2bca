//! The JS-facing bridge.
//!
//! [`WebBridge`] receives [`BridgeCall`]s from the WebView, runs privileged
//! actions through the [`PermissionCoordinator`], and answers synchronously.
//! An action that had to wait for a prompt delivers its real result later by
//! evaluating a `window.handle*Result(...)` callback in the page.

mod activity;
mod call;
pub mod script;
mod state;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};
use webshell_core::config::StorageConfig;
use webshell_core::{ActionKind, PendingAction, Permission};

use crate::error::BridgeError;
use crate::permission::{
    BridgeState, Gate, PendingEntry, PermissionCoordinator, PermissionResponse, Resolution,
};
use crate::platform::{FsMediaStore, Intent, MediaStore, Platform, ToastLength};
use crate::recording::paths::{self, MediaDirs};
use crate::recording::{MediaKind, Recorder, StartOutcome};

pub use activity::ActivityResult;
pub use call::BridgeCall;

const GRANTED_NOTICE: &str = "Permission granted";
const DENIED_NOTICE: &str = "Permission denied";
const LOCATION_UNAVAILABLE: &str = "Location not available";

/// Bridge between the web frontend and the host platform.
pub struct WebBridge<P: Platform> {
    platform: P,
    store: Box<dyn MediaStore>,
    permissions: PermissionCoordinator,
    audio: Recorder,
    video: Recorder,
    dirs: MediaDirs,
    /// Photo file handed to the camera app, until its result arrives.
    current_photo: Option<PathBuf>,
    webview_url: Option<String>,
}

impl<P: Platform> WebBridge<P> {
    pub fn new(platform: P, dirs: MediaDirs, store: Box<dyn MediaStore>) -> Self {
        Self {
            platform,
            store,
            permissions: PermissionCoordinator::new(),
            audio: Recorder::new(MediaKind::Audio, dirs.music.clone()),
            video: Recorder::new(MediaKind::Video, dirs.movies.clone()),
            dirs,
            current_photo: None,
            webview_url: None,
        }
    }

    /// Bridge with directories and a filesystem media store from `storage`.
    pub fn from_config(platform: P, storage: &StorageConfig) -> Self {
        let dirs = MediaDirs::from_config(storage);
        let store = FsMediaStore::new(storage.resolved_public_dir(), storage.app_folder.clone());
        Self::new(platform, dirs, Box::new(store))
    }

    /// Parse and run a raw `{"method": ..., "args": ...}` message.
    pub fn handle_json(&mut self, raw: &str) -> Value {
        match serde_json::from_str::<BridgeCall>(raw) {
            Ok(call) => self.handle(call),
            Err(e) => {
                warn!(error = %e, "Rejected malformed bridge call");
                json!({ "error": format!("Invalid bridge call: {e}") })
            }
        }
    }

    /// Run one call and return its synchronous result.
    pub fn handle(&mut self, call: BridgeCall) -> Value {
        debug!(method = call.method(), "Bridge call");
        match call {
            BridgeCall::Log { message } => {
                debug!(target: "webshell::js", "{message}");
                Value::Null
            }
            BridgeCall::Info { message } => {
                info!(target: "webshell::js", "{message}");
                Value::Null
            }
            BridgeCall::Warn { message } => {
                warn!(target: "webshell::js", "{message}");
                Value::Null
            }
            BridgeCall::Error { message } => {
                error!(target: "webshell::js", "{message}");
                Value::Null
            }

            BridgeCall::RequestPermission { permission } => {
                match permission.parse::<Permission>() {
                    Ok(permission) => {
                        self.permissions.request(permission, &mut self.platform);
                    }
                    Err(e) => warn!(error = %e, "Ignoring permission request"),
                }
                Value::Null
            }
            BridgeCall::CheckPermission { permission } => {
                let granted = permission
                    .parse::<Permission>()
                    .is_ok_and(|p| self.platform.check_permission(p));
                debug!(%permission, granted, "Permission checked");
                Value::Bool(granted)
            }

            BridgeCall::StartRecording | BridgeCall::RecordAudio => {
                self.toggle_gated(MediaKind::Audio)
            }
            BridgeCall::StopRecording => Value::String(self.stop_recorder(MediaKind::Audio)),
            BridgeCall::IsRecording => Value::Bool(self.audio.is_recording()),
            BridgeCall::RecordVideoBackground => self.toggle_gated(MediaKind::Video),
            BridgeCall::StopVideoRecording => Value::String(self.stop_recorder(MediaKind::Video)),
            BridgeCall::IsVideoRecording => Value::Bool(self.video.is_recording()),

            BridgeCall::TakePhoto => self.invoke(PendingAction::TakePhoto),
            BridgeCall::RecordVideo => self.invoke(PendingAction::RecordVideo),
            BridgeCall::OpenCamera => self.open_camera(),
            BridgeCall::OpenGallery | BridgeCall::PickImage => self.launch_logged(Intent::PickContent {
                mime: "image/*".to_string(),
            }),
            BridgeCall::OpenFile | BridgeCall::PickFile => self.launch_logged(Intent::PickContent {
                mime: "*/*".to_string(),
            }),
            BridgeCall::SaveFile { filename, content } => {
                Value::Bool(self.save_file(&filename, &content))
            }

            BridgeCall::GetDeviceInfo => {
                serde_json::to_value(self.platform.device_info()).unwrap_or_default()
            }
            BridgeCall::GetBatteryLevel => match self.platform.battery_level() {
                Ok(level) => json!(level),
                Err(e) => {
                    error!(error = %e, "Failed to read battery level");
                    json!(-1)
                }
            },
            BridgeCall::GetNetworkInfo => match self.platform.network_info() {
                Ok(info) => serde_json::to_value(info).unwrap_or_default(),
                Err(e) => {
                    error!(error = %e, "Failed to read network info");
                    json!({ "connected": false, "type": "Error", "error": e.to_string() })
                }
            },

            BridgeCall::Vibrate { duration } => {
                self.vibrate(duration);
                Value::Null
            }
            BridgeCall::SendSms { number, message } => {
                self.invoke(PendingAction::SendSms { number, message })
            }
            BridgeCall::GetLocation | BridgeCall::StartGps => self.invoke(PendingAction::GetLocation),
            BridgeCall::PlaySound { sound_type } => {
                debug!(%sound_type, "Playing sound as vibration");
                self.vibrate(100);
                Value::Null
            }

            BridgeCall::ShowToast { message } => {
                self.platform.show_toast(&message, ToastLength::Short);
                Value::Null
            }
            BridgeCall::ShowNotification { title, message } => {
                self.platform
                    .show_toast(&format!("{title}: {message}"), ToastLength::Long);
                Value::Null
            }

            BridgeCall::MakeCall { phone_number } => self.launch_logged(Intent::Dial {
                number: phone_number,
            }),
            BridgeCall::SendEmail {
                email,
                subject,
                body,
            } => self.launch_logged(Intent::SendEmail {
                to: email,
                subject,
                body,
            }),
            BridgeCall::ShareContent { content, mime_type } => {
                self.launch_logged(Intent::Share {
                    content,
                    mime: mime_type,
                })
            }
            BridgeCall::OpenBrowser { url } => self.launch_logged(Intent::View { url }),
            BridgeCall::CloseApp => {
                info!("Closing application");
                self.platform.finish();
                Value::Null
            }
        }
    }

    /// Feed the host's answer to a permission prompt.
    pub fn on_permission_result(&mut self, response: PermissionResponse) {
        let resolution = self.permissions.resolve(response, &mut self.platform);
        self.toast(match resolution {
            Resolution::Execute(_) | Resolution::AwaitingNext { .. } => GRANTED_NOTICE,
            Resolution::Denied { .. } => DENIED_NOTICE,
            Resolution::Unsolicited if response.granted => GRANTED_NOTICE,
            Resolution::Unsolicited => DENIED_NOTICE,
        });

        match resolution {
            Resolution::Execute(action) => {
                let kind = action.kind();
                let value = self.execute(action);
                self.deliver(kind, &value);
            }
            Resolution::Denied { action, permission } => {
                let err = BridgeError::PermissionDenied {
                    permission,
                    action: action.kind(),
                };
                info!(error = %err, "Pending action dropped");
                self.deliver(action.kind(), &denied_value(action.kind()));
            }
            Resolution::AwaitingNext { .. } | Resolution::Unsolicited => {}
        }
    }

    pub fn state(&self) -> BridgeState {
        self.permissions.state()
    }

    pub fn pending(&self) -> Option<&PendingEntry> {
        self.permissions.pending()
    }

    pub const fn is_recording(&self) -> bool {
        self.audio.is_recording()
    }

    pub const fn is_video_recording(&self) -> bool {
        self.video.is_recording()
    }

    pub fn current_photo(&self) -> Option<&Path> {
        self.current_photo.as_deref()
    }

    pub fn webview_url(&self) -> Option<&str> {
        self.webview_url.as_deref()
    }

    /// Remember the page the WebView is showing, for saved state.
    pub fn set_webview_url(&mut self, url: impl Into<String>) {
        self.webview_url = Some(url.into());
    }

    pub const fn dirs(&self) -> &MediaDirs {
        &self.dirs
    }

    pub const fn platform(&self) -> &P {
        &self.platform
    }

    pub const fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Release every held device without finalising recordings.
    pub fn shutdown(&mut self) {
        self.audio.release_all();
        self.video.release_all();
        if let Some(dropped) = self.permissions.clear() {
            debug!(action = %dropped.action.kind(), "Dropping pending action on shutdown");
        }
    }

    /// Run `action` now or park it behind a prompt.
    fn invoke(&mut self, action: PendingAction) -> Value {
        let kind = action.kind();
        match self.permissions.gate(action, &mut self.platform) {
            Gate::Proceed(action) => self.execute(action),
            Gate::Deferred { .. } => placeholder(kind),
        }
    }

    /// Run an action whose permissions are held, turning failures into a
    /// toast and a neutral result.
    fn execute(&mut self, action: PendingAction) -> Value {
        let kind = action.kind();
        match self.run(action) {
            Ok(value) => value,
            Err(e) => {
                error!(action = %kind, error = %e, "Action failed");
                self.toast(&e.to_string());
                failure_value(kind, &e)
            }
        }
    }

    fn run(&mut self, action: PendingAction) -> Result<Value, BridgeError> {
        match action {
            PendingAction::TakePhoto => self.capture_photo().map(|()| Value::Null),
            PendingAction::RecordVideo => {
                self.platform.launch(Intent::CaptureVideo)?;
                Ok(Value::Null)
            }
            PendingAction::StartAudioRecording => self.start_recorder(MediaKind::Audio),
            PendingAction::RecordVideoBackground => self.start_recorder(MediaKind::Video),
            PendingAction::SendSms { number, message } => {
                self.platform.send_sms(&number, &message)?;
                info!(%number, "SMS sent");
                Ok(Value::Bool(true))
            }
            PendingAction::GetLocation => self.locate(),
        }
    }

    fn toggle_gated(&mut self, kind: MediaKind) -> Value {
        let recording = match kind {
            MediaKind::Audio => self.audio.is_recording(),
            MediaKind::Video => self.video.is_recording(),
        };
        if recording {
            self.stop_recorder(kind);
            return Value::Null;
        }
        self.invoke(match kind {
            MediaKind::Audio => PendingAction::StartAudioRecording,
            MediaKind::Video => PendingAction::RecordVideoBackground,
        })
    }

    fn start_recorder(&mut self, kind: MediaKind) -> Result<Value, BridgeError> {
        let recorder = match kind {
            MediaKind::Audio => &mut self.audio,
            MediaKind::Video => &mut self.video,
        };
        if let StartOutcome::Started(_) = recorder.start(self.platform.devices())? {
            self.toast(match kind {
                MediaKind::Audio => "Recording started",
                MediaKind::Video => "Video recording started",
            });
        }
        Ok(Value::Null)
    }

    /// Stop a recorder, returning where the file ended up or `""`.
    fn stop_recorder(&mut self, kind: MediaKind) -> String {
        let recorder = match kind {
            MediaKind::Audio => &mut self.audio,
            MediaKind::Video => &mut self.video,
        };
        match recorder.stop(self.store.as_mut()) {
            Ok(Some(finished)) => {
                let name = finished
                    .private_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.toast(&format!("Recording saved: {name}"));
                finished.location().display().to_string()
            }
            Ok(None) => {
                debug!(kind = kind.as_str(), "Stop requested while idle");
                String::new()
            }
            Err(e) => {
                error!(kind = kind.as_str(), error = %e, "Failed to stop recording");
                self.toast(&e.to_string());
                String::new()
            }
        }
    }

    fn capture_photo(&mut self) -> Result<(), BridgeError> {
        let path = paths::create_photo_file(&self.dirs.pictures, &Local::now())?;
        debug!(path = %path.display(), "Photo will be saved");
        if let Err(e) = self.platform.launch(Intent::CaptureImage {
            output: path.clone(),
        }) {
            discard(&path);
            return Err(e.into());
        }
        self.current_photo = Some(path);
        Ok(())
    }

    fn open_camera(&mut self) -> Value {
        if self.platform.check_permission(Permission::Camera) {
            self.execute(PendingAction::TakePhoto)
        } else {
            warn!("Camera opened without permission");
            self.toast("Camera permission required");
            Value::Null
        }
    }

    fn locate(&mut self) -> Result<Value, BridgeError> {
        if let Some(location) = self.platform.last_known_location()? {
            self.platform.show_toast(
                &format!("Position: {}, {}", location.latitude, location.longitude),
                ToastLength::Long,
            );
            Ok(json!({ "latitude": location.latitude, "longitude": location.longitude }))
        } else {
            debug!("{LOCATION_UNAVAILABLE}");
            self.toast(LOCATION_UNAVAILABLE);
            Ok(json!({ "error": LOCATION_UNAVAILABLE }))
        }
    }

    fn save_file(&self, filename: &str, content: &str) -> bool {
        if !paths::is_safe_file_name(filename) {
            warn!(%filename, "Rejected file name outside the cache dir");
            return false;
        }
        let path = self.dirs.cache.join(filename);
        let written = fs::create_dir_all(&self.dirs.cache).and_then(|()| fs::write(&path, content));
        match written {
            Ok(()) => {
                info!(path = %path.display(), "File saved");
                true
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to save file");
                false
            }
        }
    }

    fn vibrate(&mut self, duration_ms: u64) {
        if let Err(e) = self.platform.vibrate(duration_ms) {
            warn!(duration_ms, error = %e, "Failed to vibrate");
        }
    }

    fn launch_logged(&mut self, intent: Intent) -> Value {
        let label = intent.label();
        match self.platform.launch(intent) {
            Ok(()) => debug!(intent = label, "Intent launched"),
            Err(e) => warn!(intent = label, error = %e, "Failed to launch intent"),
        }
        Value::Null
    }

    /// Hand a deferred result to the page, for calls the page waits on.
    fn deliver(&mut self, kind: ActionKind, value: &Value) {
        let script = match kind {
            ActionKind::GetLocation => script::location_result(value),
            ActionKind::SendSms => script::callback(script::SMS_RESULT, value),
            _ => return,
        };
        self.platform.evaluate_script(&script);
    }

    fn toast(&mut self, message: &str) {
        self.platform.show_toast(message, ToastLength::Short);
    }
}

impl<P: Platform> std::fmt::Debug for WebBridge<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebBridge")
            .field("state", &self.state())
            .field("recording", &self.audio.is_recording())
            .field("video_recording", &self.video.is_recording())
            .field("current_photo", &self.current_photo)
            .finish_non_exhaustive()
    }
}

/// Immediate result of a call whose action is waiting for a prompt.
fn placeholder(kind: ActionKind) -> Value {
    match kind {
        ActionKind::SendSms => Value::Bool(false),
        ActionKind::GetLocation => json!({ "error": "Permission not granted" }),
        _ => Value::Null,
    }
}

/// Deferred result delivered when the prompt was declined.
fn denied_value(kind: ActionKind) -> Value {
    match kind {
        ActionKind::SendSms => Value::Bool(false),
        ActionKind::GetLocation => json!({ "error": DENIED_NOTICE }),
        _ => Value::Null,
    }
}

fn failure_value(kind: ActionKind, err: &BridgeError) -> Value {
    match kind {
        ActionKind::SendSms => Value::Bool(false),
        ActionKind::GetLocation => json!({ "error": err.to_string() }),
        _ => Value::Null,
    }
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "Failed to remove photo placeholder");
    }
}
