//! YAML server configuration.
//!
//! Loaded once at startup by the binary; the engine itself is configured
//! through the [`crate::app::App`] builder.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "junction.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub static_files: Option<StaticFilesConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u32,
}

/// Static-mount section, optional. Mirrors the registration options of
/// `App::static_dir`.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    #[serde(default = "default_mount")]
    pub mount: String,
    pub dir: String,
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub max_age: Option<u64>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u32 {
    8080
}

fn default_mount() -> String {
    "/".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            static_files: None,
        }
    }
}

impl Config {
    /// Loads configuration from the path named by `JUNCTION_CONFIG`
    /// (default `junction.yaml`). A missing file yields the defaults;
    /// a present but malformed file is an error.
    pub fn load() -> anyhow::Result<Self> {
        let path =
            std::env::var("JUNCTION_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}
