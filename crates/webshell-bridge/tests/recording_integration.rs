#![allow(clippy::unwrap_used)] // Integration tests use unwrap for brevity

//! Integration tests for audio and background video recording through the
//! bridge: toggling, stop results, publishing and device release.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;
use webshell_bridge::platform::simulated::{DeviceEvent, Fault, RECORDED_BYTES, SimulatedHost};
use webshell_bridge::platform::{FsMediaStore, MediaCollection, MediaStore};
use webshell_bridge::recording::paths::MediaDirs;
use webshell_bridge::{BridgeCall, WebBridge};
use webshell_core::Permission;

fn granted_host() -> SimulatedHost {
    SimulatedHost::new().with_permissions([Permission::Camera, Permission::Microphone])
}

fn bridge_over(
    host: SimulatedHost,
    store: Box<dyn MediaStore>,
) -> (TempDir, SimulatedHost, WebBridge<SimulatedHost>) {
    let dir = tempfile::tempdir().unwrap();
    let dirs = MediaDirs::under(&dir.path().join("data"));
    let bridge = WebBridge::new(host.clone(), dirs, store);
    (dir, host, bridge)
}

fn bridge() -> (TempDir, SimulatedHost, WebBridge<SimulatedHost>) {
    let dir = tempfile::tempdir().unwrap();
    let dirs = MediaDirs::under(&dir.path().join("data"));
    let store = FsMediaStore::new(dir.path().join("public"), "WebShell");
    let host = granted_host();
    let bridge = WebBridge::new(host.clone(), dirs, Box::new(store));
    (dir, host, bridge)
}

/// Store whose shared storage is never writable.
struct ReadOnlyStore;

impl MediaStore for ReadOnlyStore {
    fn publish(&mut self, _source: &Path, _collection: MediaCollection) -> io::Result<PathBuf> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }
}

fn stop_path(value: &Value) -> PathBuf {
    PathBuf::from(value.as_str().unwrap())
}

// =========================================================================
// Audio
// =========================================================================

#[test]
fn record_audio_toggles() {
    let (dir, host, mut bridge) = bridge();

    bridge.handle(BridgeCall::RecordAudio);
    assert!(bridge.is_recording());
    assert_eq!(bridge.handle(BridgeCall::IsRecording), json!(true));
    assert!(host.toasts().contains(&"Recording started".to_string()));

    bridge.handle(BridgeCall::RecordAudio);
    assert!(!bridge.is_recording());

    let published = dir.path().join("public/Music/WebShell");
    let files: Vec<_> = fs::read_dir(&published).unwrap().collect();
    assert_eq!(files.len(), 1);
    assert!(
        host.toasts()
            .iter()
            .any(|t| t.starts_with("Recording saved: REC_"))
    );
}

#[test]
fn stop_recording_returns_public_path() {
    let (dir, _host, mut bridge) = bridge();
    bridge.handle(BridgeCall::StartRecording);

    let path = stop_path(&bridge.handle(BridgeCall::StopRecording));

    assert!(path.starts_with(dir.path().join("public/Music/WebShell")));
    assert_eq!(path.extension().unwrap(), "3gp");
    assert_eq!(fs::read(&path).unwrap(), RECORDED_BYTES);
    // The private copy is kept.
    let private = bridge.dirs().music.join(path.file_name().unwrap());
    assert!(private.exists());
}

#[test]
fn stop_while_idle_returns_empty_string() {
    let (_dir, _host, mut bridge) = bridge();
    assert_eq!(bridge.handle(BridgeCall::StopRecording), json!(""));
    assert_eq!(bridge.handle(BridgeCall::StopVideoRecording), json!(""));
}

#[test]
fn unpublished_recording_falls_back_to_private_path() {
    let (_dir, _host, mut bridge) = bridge_over(granted_host(), Box::new(ReadOnlyStore));
    bridge.handle(BridgeCall::StartRecording);

    let path = stop_path(&bridge.handle(BridgeCall::StopRecording));

    assert!(path.starts_with(&bridge.dirs().music));
    assert!(path.exists());
}

#[test]
fn failed_start_releases_recorder_and_removes_file() {
    let (_dir, host, mut bridge) = bridge();
    host.inject(Fault::StartRecorder);

    bridge.handle(BridgeCall::StartRecording);

    assert!(!bridge.is_recording());
    assert!(host.device_events().contains(&DeviceEvent::RecorderReleased));
    let leftovers = fs::read_dir(&bridge.dirs().music).unwrap().count();
    assert_eq!(leftovers, 0);
    assert!(
        host.toasts()
            .iter()
            .any(|t| t.starts_with("Failed to start audio recording"))
    );
}

#[test]
fn failed_stop_reports_empty_and_goes_idle() {
    let (_dir, host, mut bridge) = bridge();
    bridge.handle(BridgeCall::StartRecording);
    host.inject(Fault::StopRecorder);

    assert_eq!(bridge.handle(BridgeCall::StopRecording), json!(""));
    assert!(!bridge.is_recording());
    assert!(host.device_events().contains(&DeviceEvent::RecorderReleased));
}

// =========================================================================
// Background video
// =========================================================================

#[test]
fn video_recording_drives_camera_in_order() {
    let (dir, host, mut bridge) = bridge();

    bridge.handle(BridgeCall::RecordVideoBackground);
    assert_eq!(bridge.handle(BridgeCall::IsVideoRecording), json!(true));
    let path = stop_path(&bridge.handle(BridgeCall::StopVideoRecording));

    assert!(path.starts_with(dir.path().join("public/Movies/WebShell")));
    assert!(path.file_name().unwrap().to_string_lossy().starts_with("VID_"));

    let events = host.device_events();
    let opened = events
        .iter()
        .position(|e| matches!(e, DeviceEvent::RecorderOpened { with_camera: true, .. }))
        .unwrap();
    let order = |needle: &DeviceEvent| events.iter().position(|e| e == needle).unwrap();
    assert!(order(&DeviceEvent::CameraOpened) < order(&DeviceEvent::PreviewStarted));
    assert!(order(&DeviceEvent::CameraUnlocked) < opened);
    assert!(order(&DeviceEvent::RecorderStopped) < order(&DeviceEvent::RecorderReleased));
    assert!(order(&DeviceEvent::RecorderReleased) < order(&DeviceEvent::CameraReleased));
}

#[test]
fn camera_busy_leaves_video_idle() {
    let (_dir, host, mut bridge) = bridge();
    host.inject(Fault::OpenCamera);

    bridge.handle(BridgeCall::RecordVideoBackground);

    assert!(!bridge.is_video_recording());
    assert!(!host.device_events().contains(&DeviceEvent::CameraReleased));
}

#[test]
fn preview_failure_releases_camera() {
    let (_dir, host, mut bridge) = bridge();
    host.inject(Fault::StartPreview);

    bridge.handle(BridgeCall::RecordVideoBackground);

    assert!(!bridge.is_video_recording());
    assert_eq!(
        host.device_events(),
        vec![DeviceEvent::CameraOpened, DeviceEvent::CameraReleased]
    );
}

#[test]
fn audio_and_video_run_independently() {
    let (_dir, _host, mut bridge) = bridge();

    bridge.handle(BridgeCall::RecordAudio);
    bridge.handle(BridgeCall::RecordVideoBackground);
    assert!(bridge.is_recording());
    assert!(bridge.is_video_recording());

    bridge.handle(BridgeCall::StopVideoRecording);
    assert!(bridge.is_recording());
    assert!(!bridge.is_video_recording());
}

#[test]
fn shutdown_releases_without_publishing() {
    let (dir, host, mut bridge) = bridge();
    bridge.handle(BridgeCall::RecordVideoBackground);

    bridge.shutdown();

    assert!(!bridge.is_video_recording());
    let events = host.device_events();
    assert!(events.contains(&DeviceEvent::RecorderReleased));
    assert!(events.contains(&DeviceEvent::CameraReleased));
    assert!(!events.contains(&DeviceEvent::RecorderStopped));
    assert!(!dir.path().join("public/Movies").exists());
}
