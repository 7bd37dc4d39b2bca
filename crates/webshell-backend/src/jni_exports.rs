//! JNI exports for `com.main.MainActivity`.
//!
//! Each export forwards to one process-wide [`NativeBackend`], created on
//! first use from the resolved configuration.
#![allow(unsafe_code)]

use std::sync::OnceLock;

use jni::JNIEnv;
use jni::objects::{JClass, JString};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean, jint, jstring};
use tracing::{error, info, warn};
use webshell_core::Config;
use webshell_core::config::load_config;
use webshell_core::tracing_init::try_init_tracing;

use crate::native::NativeBackend;

static BACKEND: OnceLock<NativeBackend> = OnceLock::new();

fn backend() -> &'static NativeBackend {
    BACKEND.get_or_init(|| {
        try_init_tracing("webshell_backend=debug,webshell_bridge=debug,tower_http=info");
        let config = load_config(None).unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default configuration");
            Config::default()
        });
        info!(url = %config.server.base_url(), "Native backend created");
        NativeBackend::new(config)
    })
}

const fn to_jboolean(value: bool) -> jboolean {
    if value { JNI_TRUE } else { JNI_FALSE }
}

fn to_jstring(env: &mut JNIEnv<'_>, value: &str) -> jstring {
    match env.new_string(value) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            error!(error = %e, "Failed to create Java string");
            std::ptr::null_mut()
        }
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_main_MainActivity_initRust(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
) -> jboolean {
    to_jboolean(backend().init())
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_main_MainActivity_getServerUrl(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
) -> jstring {
    let url = backend().server_url();
    info!(%url, "Providing server URL");
    to_jstring(&mut env, &url)
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_main_MainActivity_testServerConnectivity(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
) -> jboolean {
    to_jboolean(backend().test_connectivity())
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_main_MainActivity_handleWebViewMessage(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    message: JString<'_>,
) -> jstring {
    let message: String = match env.get_string(&message) {
        Ok(s) => s.into(),
        Err(e) => {
            error!(error = %e, "Failed to read WebView message");
            String::new()
        }
    };
    let reply = backend().handle_message(&message);
    to_jstring(&mut env, &reply)
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_main_MainActivity_startServer(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    port: jint,
) -> jboolean {
    let Ok(port) = u16::try_from(port) else {
        error!(port, "Port out of range");
        return JNI_FALSE;
    };
    to_jboolean(backend().start_server(port))
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_main_MainActivity_stopServer(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
) -> jboolean {
    to_jboolean(backend().stop_server())
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_main_MainActivity_isServerRunning(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
) -> jboolean {
    to_jboolean(backend().is_running())
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_main_MainActivity_getServerStatus(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
) -> jstring {
    let status = backend().status();
    to_jstring(&mut env, &status)
}
