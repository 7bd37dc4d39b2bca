//! Configuration resolution for webshell.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`<config dir>/webshell/settings.json`)
//! 3. Project config (`.webshell/settings.json`)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binaries)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Complete webshell configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// Embedded HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory the web frontend is served from.
    pub static_dir: PathBuf,
    /// How long `start` waits for the listener before giving up.
    pub startup_timeout_ms: u64,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8088,
            static_dir: PathBuf::from("static"),
            startup_timeout_ms: 5000,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// `http://host:port` for the configured address.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Where recordings, photos and saved files land.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// App-private base directory. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
    /// Shared media root that finished recordings are copied into.
    pub public_dir: Option<PathBuf>,
    /// Folder created under each public media collection.
    pub app_folder: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            public_dir: None,
            app_folder: "WebShell".to_string(),
        }
    }
}

impl StorageConfig {
    /// Resolved app-private base directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map_or_else(|| PathBuf::from("webshell-data"), |d| d.join("webshell"))
        })
    }

    /// Resolved shared media root.
    pub fn resolved_public_dir(&self) -> PathBuf {
        self.public_dir
            .clone()
            .unwrap_or_else(|| self.resolved_data_dir().join("public"))
    }
}

/// Bridge behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Capacity of the UI event queue.
    pub ui_queue_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            ui_queue_capacity: 64,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(project_dir: Option<&Path>) -> Result<Config> {
    let global = global_config_path();
    let project = project_dir.map(|dir| dir.join(".webshell").join("settings.json"));
    let layers: Vec<&Path> = global.as_deref().into_iter().chain(project.as_deref()).collect();

    let mut config = load_config_layers(&layers)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("webshell").join("settings.json"))
}

/// Layer the config files in `paths` over the defaults.
///
/// Later files win field by field; a file that leaves out a key keeps the
/// value from the layers below it. Missing files are skipped.
pub fn load_config_layers(paths: &[&Path]) -> Result<Config> {
    let mut merged = serde_json::to_value(Config::default())?;

    for path in paths {
        if !path.exists() {
            debug!(path = %path.display(), "No config file");
            continue;
        }
        let overlay = load_config_file(path)?;
        merge_json(&mut merged, overlay);
        debug!(path = %path.display(), "Loaded config file");
    }

    serde_json::from_value(merged)
        .map_err(|e| Error::Config(format!("Invalid merged configuration: {e}")))
}

fn load_config_file(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })?;
    // Type errors are reported against the file that introduced them.
    if let Err(e) = Config::deserialize(&value) {
        warn!(path = %path.display(), error = %e, "Rejecting config file");
        return Err(Error::Config(format!(
            "Invalid config file {}: {}",
            path.display(),
            e
        )));
    }
    Ok(value)
}

/// Recursively merge `overlay` into `base`; objects merge key by key,
/// anything else replaces.
fn merge_json(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Apply `WEBSHELL_*` overrides read through `lookup`.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("WEBSHELL_SERVER_HOST") {
        config.server.host = val;
    }
    if let Some(val) = lookup("WEBSHELL_SERVER_PORT") {
        if let Ok(n) = val.parse() {
            config.server.port = n;
        }
    }
    if let Some(val) = lookup("WEBSHELL_STATIC_DIR") {
        config.server.static_dir = PathBuf::from(val);
    }
    if let Some(val) = lookup("WEBSHELL_LOG_LEVEL") {
        config.server.log_level = val;
    }
    if let Some(val) = lookup("WEBSHELL_DATA_DIR") {
        config.storage.data_dir = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("WEBSHELL_PUBLIC_DIR") {
        config.storage.public_dir = Some(PathBuf::from(val));
    }
}
