//! The UI task.
//!
//! A [`WebBridge`] is moved into one tokio task and fed through a bounded
//! queue. JS calls, permission answers and activity results all land on that
//! task, so an action deferred behind a prompt runs on the same task that
//! would have run it directly.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use webshell_core::SavedState;
use webshell_core::config::BridgeConfig;

use crate::bridge::{ActivityResult, BridgeCall, WebBridge};
use crate::permission::{BridgeState, PermissionResponse};
use crate::platform::Platform;

/// The UI task has stopped.
#[derive(Debug, thiserror::Error)]
pub enum UiError {
    #[error("UI task has shut down")]
    Closed,
}

/// Work queued for the UI task.
#[derive(Debug)]
pub enum UiEvent {
    Call {
        call: BridgeCall,
        reply: oneshot::Sender<Value>,
    },
    PermissionResult(PermissionResponse),
    ActivityResult(ActivityResult),
    SaveState {
        reply: oneshot::Sender<SavedState>,
    },
    RestoreState(SavedState),
    WebViewUrl(String),
    State {
        reply: oneshot::Sender<BridgeState>,
    },
    Shutdown,
}

/// Cloneable sender side of the UI task.
#[derive(Debug, Clone)]
pub struct UiHandle {
    tx: mpsc::Sender<UiEvent>,
}

impl UiHandle {
    /// Run a JS call and wait for its synchronous result.
    pub async fn call(&self, call: BridgeCall) -> Result<Value, UiError> {
        let (reply, rx) = oneshot::channel();
        self.send(UiEvent::Call { call, reply }).await?;
        rx.await.map_err(|_| UiError::Closed)
    }

    /// Queue the host's answer to a permission prompt.
    pub async fn permission_result(&self, response: PermissionResponse) -> Result<(), UiError> {
        self.send(UiEvent::PermissionResult(response)).await
    }

    pub async fn activity_result(&self, result: ActivityResult) -> Result<(), UiError> {
        self.send(UiEvent::ActivityResult(result)).await
    }

    pub async fn save_state(&self) -> Result<SavedState, UiError> {
        let (reply, rx) = oneshot::channel();
        self.send(UiEvent::SaveState { reply }).await?;
        rx.await.map_err(|_| UiError::Closed)
    }

    pub async fn restore_state(&self, state: SavedState) -> Result<(), UiError> {
        self.send(UiEvent::RestoreState(state)).await
    }

    pub async fn set_webview_url(&self, url: impl Into<String>) -> Result<(), UiError> {
        self.send(UiEvent::WebViewUrl(url.into())).await
    }

    pub async fn state(&self) -> Result<BridgeState, UiError> {
        let (reply, rx) = oneshot::channel();
        self.send(UiEvent::State { reply }).await?;
        rx.await.map_err(|_| UiError::Closed)
    }

    /// Ask the task to release its devices and stop.
    pub async fn shutdown(&self) -> Result<(), UiError> {
        self.send(UiEvent::Shutdown).await
    }

    async fn send(&self, event: UiEvent) -> Result<(), UiError> {
        self.tx.send(event).await.map_err(|_| UiError::Closed)
    }
}

/// Move `bridge` onto its own task.
///
/// The task ends on [`UiHandle::shutdown`] or once every handle is dropped,
/// and hands the bridge back through the join handle.
pub fn spawn<P: Platform>(
    bridge: WebBridge<P>,
    capacity: usize,
) -> (UiHandle, JoinHandle<WebBridge<P>>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let task = tokio::spawn(run(bridge, rx));
    (UiHandle { tx }, task)
}

/// [`spawn`] with the queue capacity from `config`.
pub fn spawn_configured<P: Platform>(
    bridge: WebBridge<P>,
    config: &BridgeConfig,
) -> (UiHandle, JoinHandle<WebBridge<P>>) {
    spawn(bridge, config.ui_queue_capacity)
}

async fn run<P: Platform>(
    mut bridge: WebBridge<P>,
    mut rx: mpsc::Receiver<UiEvent>,
) -> WebBridge<P> {
    info!("UI task started");
    while let Some(event) = rx.recv().await {
        match event {
            UiEvent::Call { call, reply } => {
                let value = bridge.handle(call);
                if reply.send(value).is_err() {
                    debug!("Caller went away before the reply");
                }
            }
            UiEvent::PermissionResult(response) => bridge.on_permission_result(response),
            UiEvent::ActivityResult(result) => bridge.on_activity_result(result),
            UiEvent::SaveState { reply } => {
                if reply.send(bridge.save_state()).is_err() {
                    debug!("Caller went away before the saved state");
                }
            }
            UiEvent::RestoreState(state) => bridge.restore_state(&state),
            UiEvent::WebViewUrl(url) => bridge.set_webview_url(url),
            UiEvent::State { reply } => {
                if reply.send(bridge.state()).is_err() {
                    debug!("Caller went away before the state");
                }
            }
            UiEvent::Shutdown => break,
        }
    }
    bridge.shutdown();
    info!("UI task stopped");
    bridge
}
