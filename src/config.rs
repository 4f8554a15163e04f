use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::chain::Backend;

pub const DEFAULT_NODE_URL: &str = "http://localhost:5173/node-proxy";
pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "http://localhost:8080";
pub const DEFAULT_PLAYER_NAME: &str = "You";

pub const ENV_APP_ID: &str = "TYPE_ARENA_APP_ID";
pub const ENV_NODE_URL: &str = "LINERA_NODE_URL";
pub const ENV_GRAPHQL_URL: &str = "LINERA_GRAPHQL_URL";
pub const ENV_CHAIN_ID: &str = "LINERA_CHAIN_ID";
pub const ENV_OWNER: &str = "LINERA_OWNER";
pub const ENV_BACKEND: &str = "TYPE_ARENA_BACKEND";
pub const ENV_PLAYER: &str = "TYPE_ARENA_PLAYER";

/// Connection and identity settings. Values are passed through to the
/// chain client as opaque strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub app_id: String,
    pub node_url: String,
    pub graphql_endpoint: String,
    pub chain_id: Option<String>,
    pub owner: Option<String>,
    pub backend: Backend,
    pub player_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            node_url: DEFAULT_NODE_URL.to_string(),
            graphql_endpoint: DEFAULT_GRAPHQL_ENDPOINT.to_string(),
            chain_id: None,
            owner: None,
            backend: Backend::default(),
            player_name: DEFAULT_PLAYER_NAME.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown backend {0:?} (expected \"simulated\" or \"remote\")")]
    Backend(String),
}

impl Config {
    /// Overlay environment variables, read through `lookup` so tests don't
    /// have to touch the process environment.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_APP_ID) {
            self.app_id = v;
        }
        if let Some(v) = lookup(ENV_NODE_URL) {
            self.node_url = v;
        }
        if let Some(v) = lookup(ENV_GRAPHQL_URL) {
            self.graphql_endpoint = v;
        }
        if let Some(v) = lookup(ENV_CHAIN_ID) {
            self.chain_id = Some(v);
        }
        if let Some(v) = lookup(ENV_OWNER) {
            self.owner = Some(v);
        }
        if let Some(v) = lookup(ENV_PLAYER) {
            self.player_name = v;
        }
        if let Some(v) = lookup(ENV_BACKEND) {
            self.backend = parse_backend(&v)?;
        }
        Ok(self)
    }

    pub fn from_process_env(self) -> Result<Self, ConfigError> {
        self.apply_env(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }
}

fn parse_backend(value: &str) -> Result<Backend, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "simulated" | "dev" | "mock" => Ok(Backend::Simulated),
        "remote" | "node" => Ok(Backend::Remote),
        _ => Err(ConfigError::Backend(value.to_string())),
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
}

/// Optional JSON file of defaults. Read only; the game never writes it.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typearena.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable config")
                }
            }
        }
        Config::default()
    }
}
