//! Configuration types for psearch.
//!
//! [`Config::load`] reads `~/.config/psearch/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::load_from`] does the
//! same for an explicit path. Both apply `PSEARCH__SECTION__KEY` environment
//! overrides last. [`Config::defaults`] returns the built-in defaults without
//! touching the filesystem or environment (useful in tests).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[server]
url          = "http://127.0.0.1:4000"
timeout_secs = 30
client_name  = "psearch"

[search]
query = "*:*"
rows  = 1000
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration, loaded from `~/.config/psearch/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// `[server]` section: where and how the transport talks to the search API.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Base URL; request paths such as `/search/node?…` are appended to it.
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sent as the `User-Agent` header.
    #[serde(default = "default_client_name")]
    pub client_name: String,
    /// Static headers added to every request (`[server.headers]`).
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_url() -> String { "http://127.0.0.1:4000".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_client_name() -> String { "psearch".to_string() }

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
            client_name: default_client_name(),
            headers: BTreeMap::new(),
        }
    }
}

/// `[search]` section: defaults for new descriptors created by the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_query")]
    pub query: String,
    #[serde(default = "default_rows")]
    pub rows: usize,
}

fn default_query() -> String { crate::DEFAULT_QUERY.to_string() }
fn default_rows() -> usize { crate::DEFAULT_ROWS }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
            rows: default_rows(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/psearch/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load an explicit config file on top of the built-in defaults. A missing
    /// file is an error here.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        Self::layered(path, environment())
    }

    fn layered(path: &Path, env: config::Environment) -> anyhow::Result<Self> {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(true))
            .add_source(env)
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.server.timeout_secs == 0 {
            anyhow::bail!("server.timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `PSEARCH__SECTION__KEY` overrides, e.g. `PSEARCH__SERVER__URL`.
fn environment() -> config::Environment {
    config::Environment::with_prefix("PSEARCH")
        .separator("__")
        .try_parsing(true)
}

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("psearch")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
