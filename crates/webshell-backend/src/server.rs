//! Embedded HTTP server.
//!
//! The server owns a tokio runtime on a dedicated thread so it can be started
//! from synchronous native entry points. `start` only returns once the
//! listener is bound, or fails after the configured startup timeout.

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use webshell_core::config::ServerConfig;

use crate::routes::build_router;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to create server runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server did not start within {0:?}")]
    StartupTimeout(Duration),

    #[error("Server thread exited before reporting its address")]
    Exited,

    #[error("Server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Serve the router for `static_dir` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    static_dir: &Path,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let app = build_router(static_dir);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}

/// A running server and the handles needed to stop it.
#[derive(Debug)]
pub struct EmbeddedServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl EmbeddedServer {
    /// Start serving `config.static_dir` on `config.host:config.port`.
    ///
    /// Port 0 binds an ephemeral port; [`EmbeddedServer::addr`] reports the
    /// one actually bound.
    pub fn start(config: &ServerConfig) -> Result<Self, ServerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("webshell-server")
            .enable_all()
            .build()
            .map_err(ServerError::Runtime)?;

        let bind_addr = format!("{}:{}", config.host, config.port);
        let static_dir = config.static_dir.clone();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<SocketAddr, ServerError>>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = thread::Builder::new()
            .name("webshell-server".to_string())
            .spawn(move || {
                runtime.block_on(run(bind_addr, static_dir, ready_tx, shutdown_rx));
            })
            .map_err(ServerError::Runtime)?;

        let timeout = Duration::from_millis(config.startup_timeout_ms);
        let addr = match ready_rx.recv_timeout(timeout) {
            Ok(Ok(addr)) => addr,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(?timeout, "Server startup timed out");
                let _ = shutdown_tx.send(());
                return Err(ServerError::StartupTimeout(timeout));
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                let _ = thread.join();
                return Err(ServerError::Exited);
            }
        };

        info!(%addr, "Embedded server started");
        Ok(Self {
            addr,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://<addr>` of the bound listener.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop accepting connections, drain in-flight requests and join the
    /// server thread.
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Server thread panicked");
            }
            info!(addr = %self.addr, "Embedded server stopped");
        }
    }
}

impl Drop for EmbeddedServer {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

async fn run(
    bind_addr: String,
    static_dir: PathBuf,
    ready: mpsc::Sender<Result<SocketAddr, ServerError>>,
    shutdown: oneshot::Receiver<()>,
) {
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(source) => {
            error!(addr = %bind_addr, error = %source, "Failed to bind server");
            let _ = ready.send(Err(ServerError::Bind {
                addr: bind_addr,
                source,
            }));
            return;
        }
    };
    let addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(source) => {
            let _ = ready.send(Err(ServerError::Bind {
                addr: bind_addr,
                source,
            }));
            return;
        }
    };
    if ready.send(Ok(addr)).is_err() {
        // The caller gave up waiting.
        return;
    }

    let stopped = async {
        let _ = shutdown.await;
    };
    if let Err(e) = serve(listener, &static_dir, stopped).await {
        error!(error = %e, "Server stopped with an error");
    }
}
