#![allow(clippy::unwrap_used)] // Integration tests use unwrap for brevity

//! Integration tests for the informational, file and intent calls, raw JSON
//! dispatch and activity results.

use std::fs;

use serde_json::{Value, json};
use tempfile::TempDir;
use webshell_bridge::platform::simulated::{Fault, HostEvent, SimulatedHost};
use webshell_bridge::platform::{FsMediaStore, Intent, ToastLength};
use webshell_bridge::recording::paths::MediaDirs;
use webshell_bridge::{ActivityResult, BridgeCall, WebBridge};
use webshell_core::Permission;

fn bridge() -> (TempDir, SimulatedHost, WebBridge<SimulatedHost>) {
    let dir = tempfile::tempdir().unwrap();
    let dirs = MediaDirs::under(&dir.path().join("data"));
    let store = FsMediaStore::new(dir.path().join("public"), "WebShell");
    let host = SimulatedHost::new();
    let bridge = WebBridge::new(host.clone(), dirs, Box::new(store));
    (dir, host, bridge)
}

// =========================================================================
// Device information
// =========================================================================

#[test]
fn battery_level_and_failure() {
    let (_dir, host, mut bridge) = bridge();
    host.set_battery(42);
    assert_eq!(bridge.handle(BridgeCall::GetBatteryLevel), json!(42));

    host.inject(Fault::Battery);
    assert_eq!(bridge.handle(BridgeCall::GetBatteryLevel), json!(-1));
}

#[test]
fn network_info_shape() {
    let (_dir, host, mut bridge) = bridge();

    let info = bridge.handle(BridgeCall::GetNetworkInfo);
    assert_eq!(info["connected"], json!(true));
    assert_eq!(info["type"], json!("WiFi"));
    assert_eq!(info["isWiFi"], json!(true));
    assert_eq!(info["isMetered"], json!(false));

    host.inject(Fault::Network);
    let info = bridge.handle(BridgeCall::GetNetworkInfo);
    assert_eq!(info["connected"], json!(false));
    assert_eq!(info["type"], json!("Error"));
    assert!(info["error"].as_str().unwrap().contains("connectivity"));
}

#[test]
fn device_info_fields() {
    let (_dir, host, mut bridge) = bridge();
    host.set_sdk_level(30);

    let info = bridge.handle(BridgeCall::GetDeviceInfo);
    for field in [
        "model",
        "manufacturer",
        "version",
        "sdk",
        "brand",
        "device",
        "product",
    ] {
        assert!(info.get(field).is_some(), "missing {field}");
    }
    assert_eq!(info["sdk"], json!(30));
}

// =========================================================================
// Files
// =========================================================================

#[test]
fn save_file_writes_into_cache() {
    let (_dir, _host, mut bridge) = bridge();

    let saved = bridge.handle(BridgeCall::SaveFile {
        filename: "notes.txt".to_string(),
        content: "hello".to_string(),
    });

    assert_eq!(saved, json!(true));
    let path = bridge.dirs().cache.join("notes.txt");
    assert_eq!(fs::read_to_string(path).unwrap(), "hello");
}

#[test]
fn save_file_rejects_traversal() {
    let (dir, _host, mut bridge) = bridge();

    for name in ["../escape.txt", "a/b.txt", "..", ""] {
        let saved = bridge.handle(BridgeCall::SaveFile {
            filename: name.to_string(),
            content: "x".to_string(),
        });
        assert_eq!(saved, json!(false), "{name:?} accepted");
    }
    assert!(!dir.path().join("data/escape.txt").exists());
}

// =========================================================================
// Feedback and intents
// =========================================================================

#[test]
fn play_sound_vibrates_briefly() {
    let (_dir, host, mut bridge) = bridge();

    bridge.handle(BridgeCall::PlaySound {
        sound_type: "beep".to_string(),
    });
    bridge.handle(BridgeCall::Vibrate { duration: 500 });

    let vibrations: Vec<u64> = host
        .events()
        .into_iter()
        .filter_map(|e| match e {
            HostEvent::Vibrated(ms) => Some(ms),
            _ => None,
        })
        .collect();
    assert_eq!(vibrations, vec![100, 500]);
}

#[test]
fn vibrator_failure_is_swallowed() {
    let (_dir, host, mut bridge) = bridge();
    host.inject(Fault::Vibrate);
    assert_eq!(bridge.handle(BridgeCall::Vibrate { duration: 10 }), Value::Null);
}

#[test]
fn notification_is_a_long_toast() {
    let (_dir, host, mut bridge) = bridge();

    bridge.handle(BridgeCall::ShowNotification {
        title: "Build".to_string(),
        message: "done".to_string(),
    });
    bridge.handle(BridgeCall::ShowToast {
        message: "plain".to_string(),
    });

    let events = host.events();
    assert!(events.contains(&HostEvent::Toast("Build: done".to_string(), ToastLength::Long)));
    assert!(events.contains(&HostEvent::Toast("plain".to_string(), ToastLength::Short)));
}

#[test]
fn intents_carry_arguments() {
    let (_dir, host, mut bridge) = bridge();

    bridge.handle(BridgeCall::MakeCall {
        phone_number: "+15550001".to_string(),
    });
    bridge.handle(BridgeCall::SendEmail {
        email: "a@example.com".to_string(),
        subject: "s".to_string(),
        body: "b".to_string(),
    });
    bridge.handle(BridgeCall::ShareContent {
        content: "look".to_string(),
        mime_type: "text/plain".to_string(),
    });
    bridge.handle(BridgeCall::OpenBrowser {
        url: "https://example.com".to_string(),
    });
    bridge.handle(BridgeCall::PickImage);
    bridge.handle(BridgeCall::OpenFile);

    assert_eq!(
        host.launched(),
        vec![
            Intent::Dial {
                number: "+15550001".to_string()
            },
            Intent::SendEmail {
                to: "a@example.com".to_string(),
                subject: "s".to_string(),
                body: "b".to_string(),
            },
            Intent::Share {
                content: "look".to_string(),
                mime: "text/plain".to_string(),
            },
            Intent::View {
                url: "https://example.com".to_string()
            },
            Intent::PickContent {
                mime: "image/*".to_string()
            },
            Intent::PickContent {
                mime: "*/*".to_string()
            },
        ]
    );
}

#[test]
fn missing_handler_is_not_an_error_for_the_page() {
    let (_dir, host, mut bridge) = bridge();
    host.inject(Fault::Launch);

    let result = bridge.handle(BridgeCall::OpenBrowser {
        url: "https://example.com".to_string(),
    });

    assert_eq!(result, Value::Null);
    assert!(host.launched().is_empty());
}

#[test]
fn close_app_finishes_host() {
    let (_dir, host, mut bridge) = bridge();
    bridge.handle(BridgeCall::CloseApp);
    assert!(host.events().contains(&HostEvent::Finished));
}

// =========================================================================
// Raw JSON dispatch
// =========================================================================

#[test]
fn handle_json_dispatches() {
    let (_dir, host, mut bridge) = bridge();
    host.set_battery(77);

    assert_eq!(
        bridge.handle_json(r#"{"method":"getBatteryLevel"}"#),
        json!(77)
    );
    assert_eq!(
        bridge.handle_json(r#"{"method":"checkPermission","args":{"permission":"sms"}}"#),
        json!(false)
    );
}

#[test]
fn handle_json_rejects_malformed_calls() {
    let (_dir, host, mut bridge) = bridge();

    for raw in ["not json", r#"{"method":"selfDestruct"}"#, r#"{"method":"vibrate"}"#] {
        let reply = bridge.handle_json(raw);
        let error = reply["error"].as_str().unwrap();
        assert!(error.starts_with("Invalid bridge call"), "{raw}: {error}");
    }
    assert!(host.events().is_empty());
}

// =========================================================================
// Activity results
// =========================================================================

#[test]
fn captured_photo_is_published() {
    let (dir, host, mut bridge) = bridge();
    host.grant(Permission::Camera);
    bridge.handle(BridgeCall::TakePhoto);
    let photo = bridge.current_photo().unwrap().to_path_buf();
    fs::write(&photo, b"jpeg").unwrap();

    bridge.on_activity_result(ActivityResult::PhotoCapture { ok: true });

    let name = photo.file_name().unwrap();
    assert!(dir.path().join("public/Pictures/WebShell").join(name).exists());
    assert!(bridge.current_photo().is_none());
    let expected = format!("Photo captured: {} (4 bytes)", name.to_string_lossy());
    assert!(host.toasts().contains(&expected));
}

#[test]
fn cancelled_photo_removes_placeholder() {
    let (_dir, host, mut bridge) = bridge();
    host.grant(Permission::Camera);
    bridge.handle(BridgeCall::TakePhoto);
    let photo = bridge.current_photo().unwrap().to_path_buf();

    bridge.on_activity_result(ActivityResult::PhotoCapture { ok: false });

    assert!(!photo.exists());
    assert!(host.toasts().contains(&"Photo capture cancelled".to_string()));
}

#[test]
fn photo_result_without_capture_in_flight() {
    let (_dir, host, mut bridge) = bridge();

    bridge.on_activity_result(ActivityResult::PhotoCapture { ok: true });

    assert_eq!(host.toasts(), vec!["Photo file path not available"]);
}

#[test]
fn picked_items_toast_last_segment() {
    let (_dir, host, mut bridge) = bridge();

    bridge.on_activity_result(ActivityResult::ImagePicked {
        uri: Some("content://media/images/17".to_string()),
    });
    bridge.on_activity_result(ActivityResult::FilePicked { uri: None });

    assert_eq!(host.toasts(), vec!["Image selected: 17"]);
}
