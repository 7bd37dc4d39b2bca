//! In-process host used by tests and the desktop harness.
//!
//! Permission grants and device faults are scripted; every side effect is
//! appended to a shared event log. Clones share state, so a test can keep a
//! clone for inspection after moving the host into a bridge.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use webshell_core::Permission;

use crate::permission::PermissionTicket;

use super::{
    CameraHandle, DeviceError, DeviceInfo, Intent, Location, MediaDevices, NetworkInfo, Platform,
    PlatformError, RecorderHandle, RecorderProfile, Release, ToastLength,
};

/// Bytes the simulated recorder writes on stop.
pub const RECORDED_BYTES: &[u8] = b"simulated media";

/// A host call that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    OpenCamera,
    StartPreview,
    OpenRecorder,
    StartRecorder,
    StopRecorder,
    Launch,
    SendSms,
    Battery,
    Network,
    Location,
    Vibrate,
}

/// Capture hardware activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    CameraOpened,
    PreviewStarted,
    CameraUnlocked,
    RecorderOpened { output: PathBuf, with_camera: bool },
    RecorderStarted,
    RecorderStopped,
    RecorderReleased,
    PreviewStopped,
    CameraLocked,
    CameraReleased,
}

/// One observable side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    PermissionRequested(Permission, PermissionTicket),
    Toast(String, ToastLength),
    Script(String),
    Launched(Intent),
    SmsSent { number: String, message: String },
    Vibrated(u64),
    Finished,
    Device(DeviceEvent),
}

#[derive(Debug)]
struct HostState {
    granted: HashSet<Permission>,
    faults: HashSet<Fault>,
    events: Vec<HostEvent>,
    location: Option<Location>,
    battery: u8,
    network: NetworkInfo,
    device_info: DeviceInfo,
    sdk_level: u32,
}

type Shared = Arc<Mutex<HostState>>;

fn with_state<R>(state: &Shared, f: impl FnOnce(&mut HostState) -> R) -> R {
    let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

fn fault(state: &Shared, fault: Fault) -> bool {
    with_state(state, |s| s.faults.contains(&fault))
}

fn record(state: &Shared, event: HostEvent) {
    with_state(state, |s| s.events.push(event));
}

fn device_event(state: &Shared, event: DeviceEvent) {
    record(state, HostEvent::Device(event));
}

fn injected(what: &str) -> DeviceError {
    DeviceError::Failed(format!("injected {what} failure"))
}

/// Scriptable [`Platform`] implementation.
#[derive(Debug, Clone)]
pub struct SimulatedHost {
    state: Shared,
    devices: SimulatedDevices,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedHost {
    /// A host with no permissions granted and a 100% battery on Wi-Fi.
    pub fn new() -> Self {
        let state = Arc::new(Mutex::new(HostState {
            granted: HashSet::new(),
            faults: HashSet::new(),
            events: Vec::new(),
            location: None,
            battery: 100,
            network: NetworkInfo {
                connected: true,
                kind: "WiFi".to_string(),
                is_wifi: true,
                is_mobile: false,
                is_metered: false,
            },
            device_info: DeviceInfo {
                model: "Simulated".to_string(),
                manufacturer: "webshell".to_string(),
                version: "14".to_string(),
                sdk: 34,
                brand: "webshell".to_string(),
                device: "sim".to_string(),
                product: "sim".to_string(),
            },
            sdk_level: 34,
        }));
        Self {
            devices: SimulatedDevices {
                state: Arc::clone(&state),
            },
            state,
        }
    }

    /// Builder form of [`SimulatedHost::grant`].
    #[must_use]
    pub fn with_permissions(self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        for permission in permissions {
            self.grant(permission);
        }
        self
    }

    pub fn grant(&self, permission: Permission) {
        with_state(&self.state, |s| s.granted.insert(permission));
    }

    pub fn revoke(&self, permission: Permission) {
        with_state(&self.state, |s| s.granted.remove(&permission));
    }

    /// Make every later call guarded by `fault` fail until [`Self::heal`].
    pub fn inject(&self, fault: Fault) {
        with_state(&self.state, |s| s.faults.insert(fault));
    }

    pub fn heal(&self, fault: Fault) {
        with_state(&self.state, |s| s.faults.remove(&fault));
    }

    pub fn set_location(&self, location: Option<Location>) {
        with_state(&self.state, |s| s.location = location);
    }

    pub fn set_battery(&self, percent: u8) {
        with_state(&self.state, |s| s.battery = percent);
    }

    pub fn set_network(&self, network: NetworkInfo) {
        with_state(&self.state, |s| s.network = network);
    }

    pub fn set_sdk_level(&self, sdk: u32) {
        with_state(&self.state, |s| {
            s.sdk_level = sdk;
            s.device_info.sdk = sdk;
        });
    }

    /// Every recorded side effect, oldest first.
    pub fn events(&self) -> Vec<HostEvent> {
        with_state(&self.state, |s| s.events.clone())
    }

    pub fn clear_events(&self) {
        with_state(&self.state, |s| s.events.clear());
    }

    pub fn permission_requests(&self) -> Vec<(Permission, PermissionTicket)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::PermissionRequested(p, t) => Some((p, t)),
                _ => None,
            })
            .collect()
    }

    pub fn toasts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Toast(message, _) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Script(script) => Some(script),
                _ => None,
            })
            .collect()
    }

    pub fn launched(&self) -> Vec<Intent> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Launched(intent) => Some(intent),
                _ => None,
            })
            .collect()
    }

    pub fn sms_sent(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::SmsSent { number, message } => Some((number, message)),
                _ => None,
            })
            .collect()
    }

    pub fn device_events(&self) -> Vec<DeviceEvent> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Device(event) => Some(event),
                _ => None,
            })
            .collect()
    }
}

impl Platform for SimulatedHost {
    fn check_permission(&self, permission: Permission) -> bool {
        with_state(&self.state, |s| s.granted.contains(&permission))
    }

    fn request_permission(&mut self, permission: Permission, ticket: PermissionTicket) {
        record(&self.state, HostEvent::PermissionRequested(permission, ticket));
    }

    fn sdk_level(&self) -> u32 {
        with_state(&self.state, |s| s.sdk_level)
    }

    fn show_toast(&mut self, message: &str, length: ToastLength) {
        record(&self.state, HostEvent::Toast(message.to_string(), length));
    }

    fn evaluate_script(&mut self, script: &str) {
        record(&self.state, HostEvent::Script(script.to_string()));
    }

    fn launch(&mut self, intent: Intent) -> Result<(), PlatformError> {
        if fault(&self.state, Fault::Launch) {
            return Err(PlatformError::NoHandler(intent.label().to_string()));
        }
        record(&self.state, HostEvent::Launched(intent));
        Ok(())
    }

    fn send_sms(&mut self, number: &str, message: &str) -> Result<(), PlatformError> {
        if fault(&self.state, Fault::SendSms) {
            return Err(PlatformError::Failed("SMS service rejected message".to_string()));
        }
        record(
            &self.state,
            HostEvent::SmsSent {
                number: number.to_string(),
                message: message.to_string(),
            },
        );
        Ok(())
    }

    fn last_known_location(&self) -> Result<Option<Location>, PlatformError> {
        if fault(&self.state, Fault::Location) {
            return Err(PlatformError::Unavailable("location provider".to_string()));
        }
        Ok(with_state(&self.state, |s| s.location))
    }

    fn device_info(&self) -> DeviceInfo {
        with_state(&self.state, |s| s.device_info.clone())
    }

    fn battery_level(&self) -> Result<u8, PlatformError> {
        if fault(&self.state, Fault::Battery) {
            return Err(PlatformError::Unavailable("battery service".to_string()));
        }
        Ok(with_state(&self.state, |s| s.battery))
    }

    fn network_info(&self) -> Result<NetworkInfo, PlatformError> {
        if fault(&self.state, Fault::Network) {
            return Err(PlatformError::Unavailable("connectivity service".to_string()));
        }
        Ok(with_state(&self.state, |s| s.network.clone()))
    }

    fn vibrate(&mut self, duration_ms: u64) -> Result<(), PlatformError> {
        if fault(&self.state, Fault::Vibrate) {
            return Err(PlatformError::Unavailable("vibrator".to_string()));
        }
        record(&self.state, HostEvent::Vibrated(duration_ms));
        Ok(())
    }

    fn finish(&mut self) {
        record(&self.state, HostEvent::Finished);
    }

    fn devices(&mut self) -> &mut dyn MediaDevices {
        &mut self.devices
    }
}

#[derive(Debug, Clone)]
struct SimulatedDevices {
    state: Shared,
}

impl MediaDevices for SimulatedDevices {
    fn open_camera(&mut self) -> Result<Box<dyn CameraHandle>, DeviceError> {
        if fault(&self.state, Fault::OpenCamera) {
            return Err(DeviceError::Busy("camera 0".to_string()));
        }
        device_event(&self.state, DeviceEvent::CameraOpened);
        Ok(Box::new(SimulatedCamera {
            state: Arc::clone(&self.state),
        }))
    }

    fn open_recorder(
        &mut self,
        _profile: &RecorderProfile,
        output: &Path,
        camera: Option<&mut dyn CameraHandle>,
    ) -> Result<Box<dyn RecorderHandle>, DeviceError> {
        if fault(&self.state, Fault::OpenRecorder) {
            return Err(injected("recorder prepare"));
        }
        fs::write(output, b"").map_err(|e| DeviceError::Failed(e.to_string()))?;
        device_event(
            &self.state,
            DeviceEvent::RecorderOpened {
                output: output.to_path_buf(),
                with_camera: camera.is_some(),
            },
        );
        Ok(Box::new(SimulatedRecorder {
            state: Arc::clone(&self.state),
            output: output.to_path_buf(),
        }))
    }
}

struct SimulatedCamera {
    state: Shared,
}

impl Release for SimulatedCamera {
    fn release(&mut self) {
        device_event(&self.state, DeviceEvent::CameraReleased);
    }
}

impl CameraHandle for SimulatedCamera {
    fn start_preview(&mut self) -> Result<(), DeviceError> {
        if fault(&self.state, Fault::StartPreview) {
            return Err(injected("preview"));
        }
        device_event(&self.state, DeviceEvent::PreviewStarted);
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), DeviceError> {
        device_event(&self.state, DeviceEvent::PreviewStopped);
        Ok(())
    }

    fn unlock(&mut self) -> Result<(), DeviceError> {
        device_event(&self.state, DeviceEvent::CameraUnlocked);
        Ok(())
    }

    fn lock(&mut self) -> Result<(), DeviceError> {
        device_event(&self.state, DeviceEvent::CameraLocked);
        Ok(())
    }
}

struct SimulatedRecorder {
    state: Shared,
    output: PathBuf,
}

impl Release for SimulatedRecorder {
    fn release(&mut self) {
        device_event(&self.state, DeviceEvent::RecorderReleased);
    }
}

impl RecorderHandle for SimulatedRecorder {
    fn start(&mut self) -> Result<(), DeviceError> {
        if fault(&self.state, Fault::StartRecorder) {
            return Err(injected("recorder start"));
        }
        device_event(&self.state, DeviceEvent::RecorderStarted);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        if fault(&self.state, Fault::StopRecorder) {
            return Err(injected("recorder stop"));
        }
        fs::write(&self.output, RECORDED_BYTES).map_err(|e| DeviceError::Failed(e.to_string()))?;
        device_event(&self.state, DeviceEvent::RecorderStopped);
        Ok(())
    }
}
