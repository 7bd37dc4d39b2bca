//! Entry points the host application calls into.
//!
//! [`NativeBackend`] is shared process-wide, so every method takes `&self`
//! and the running server sits behind a mutex. Starts are serialized by a
//! second lock so queries never wait on a server that is still binding.

use std::fs;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::{Value, json};
use tracing::{error, info, warn};
use webshell_bridge::recording::paths::MediaDirs;
use webshell_core::Config;

use crate::server::EmbeddedServer;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub struct NativeBackend {
    config: Config,
    server: Mutex<Option<EmbeddedServer>>,
    start_lock: Mutex<()>,
}

impl NativeBackend {
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            server: Mutex::new(None),
            start_lock: Mutex::new(()),
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Prepare storage directories and start the server on the configured
    /// port.
    pub fn init(&self) -> bool {
        info!("Initializing native backend");
        let dirs = MediaDirs::from_config(&self.config.storage);
        if let Err(e) = dirs.ensure() {
            warn!(error = %e, "Could not create media directories");
        }
        if let Err(e) = fs::create_dir_all(&self.config.server.static_dir) {
            warn!(
                dir = %self.config.server.static_dir.display(),
                error = %e,
                "Could not create static directory"
            );
        }
        self.start_server(self.config.server.port)
    }

    /// Start the server on `port`. Starting while running is a no-op.
    pub fn start_server(&self, port: u16) -> bool {
        let _starting = self.start_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(running) = self.lock().as_ref() {
            warn!(addr = %running.addr(), "Server already running");
            return true;
        }

        let mut config = self.config.server.clone();
        config.port = port;
        match EmbeddedServer::start(&config) {
            Ok(started) => {
                *self.lock() = Some(started);
                true
            }
            Err(e) => {
                error!(port, error = %e, "Failed to start embedded server");
                false
            }
        }
    }

    /// Stop the server. Returns `false` if it was not running.
    pub fn stop_server(&self) -> bool {
        // Take it out first so the join happens without the lock held.
        let running = self.lock().take();
        match running {
            Some(server) => {
                server.stop();
                true
            }
            None => {
                warn!("Server was not running");
                false
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_some()
    }

    /// URL the WebView should load.
    pub fn server_url(&self) -> String {
        self.lock()
            .as_ref()
            .map_or_else(|| self.config.server.base_url(), EmbeddedServer::url)
    }

    /// Whether something accepts TCP connections at the server address.
    pub fn test_connectivity(&self) -> bool {
        let Some(addr) = self.server_addr() else {
            error!("Server address does not resolve");
            return false;
        };
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(_) => {
                info!(%addr, "Server connectivity check passed");
                true
            }
            Err(e) => {
                error!(%addr, error = %e, "Server connectivity check failed");
                false
            }
        }
    }

    /// Answer a JSON message posted by the page.
    pub fn handle_message(&self, message: &str) -> String {
        match serde_json::from_str::<Value>(message) {
            Ok(echo) => {
                info!("Processing WebView message");
                json!({
                    "status": "success",
                    "message": "Message processed successfully",
                    "echo": echo,
                    "server_url": self.server_url(),
                })
                .to_string()
            }
            Err(e) => {
                error!(error = %e, "WebView message is not JSON");
                json!({ "status": "error", "message": "Invalid JSON format" }).to_string()
            }
        }
    }

    /// Server status as a JSON string.
    pub fn status(&self) -> String {
        let status = match self.lock().as_ref() {
            Some(server) => json!({
                "status": "running",
                "url": server.url(),
                "environment": std::env::consts::OS,
            }),
            None => json!({
                "status": "stopped",
                "message": "Server is not running",
            }),
        };
        status.to_string()
    }

    fn server_addr(&self) -> Option<SocketAddr> {
        if let Some(server) = self.lock().as_ref() {
            return Some(server.addr());
        }
        let server = &self.config.server;
        (server.host.as_str(), server.port)
            .to_socket_addrs()
            .ok()?
            .next()
    }

    fn lock(&self) -> MutexGuard<'_, Option<EmbeddedServer>> {
        self.server.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
