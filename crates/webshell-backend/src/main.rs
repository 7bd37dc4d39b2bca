use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use webshell_backend::server;
use webshell_core::config::load_config;
use webshell_core::tracing_init::init_tracing;

#[derive(Parser)]
#[command(name = "webshell-backend", version, about = "Serve the webshell frontend")]
struct Args {
    /// Listen address (defaults to the configured host and port)
    #[arg(long, env = "WEBSHELL_ADDR")]
    addr: Option<SocketAddr>,

    /// Directory the frontend is served from
    #[arg(long, env = "WEBSHELL_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Log level for webshell crates
    #[arg(long, env = "WEBSHELL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long, env = "WEBSHELL_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut config = load_config(Some(&cwd))?;

    if let Some(dir) = args.static_dir {
        config.server.static_dir = dir;
    }
    if let Some(level) = args.log_level {
        config.server.log_level = level;
    }
    let level = &config.server.log_level;
    init_tracing(
        &format!("webshell_backend={level},webshell_bridge={level},tower_http={level}"),
        args.log_json,
    );

    let addr = match args.addr {
        Some(addr) => addr.to_string(),
        None => format!("{}:{}", config.server.host, config.server.port),
    };
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        addr = %listener.local_addr()?,
        static_dir = %config.server.static_dir.display(),
        "starting webshell-backend"
    );

    server::serve(listener, &config.server.static_dir, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutting down");
    })
    .await?;
    Ok(())
}
