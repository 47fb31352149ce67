//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.diffthread.toml` in repo root
//! 4. `~/.config/diffthread/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_BRIDGE_SCHEME, DEFAULT_FONT_SIZE_PX, DEFAULT_REQUEST_TIMEOUT,
    ENV_API_URL, ENV_FONT_SIZE, ENV_GITHUB_TOKEN, ENV_TIMEOUT_SECS, ENV_TOKEN,
};
use crate::env::Env;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GithubConfig,
    pub render: RenderConfig,
    pub network: NetworkConfig,
}

/// Remote comment store settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    pub token: Option<String>,
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }
}

/// Rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub font_size_px: u32,
    pub bridge_scheme: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_size_px: DEFAULT_FONT_SIZE_PX,
            bridge_scheme: DEFAULT_BRIDGE_SCHEME.to_string(),
        }
    }
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl NetworkConfig {
    /// Per-request timeout. Zero is clamped to one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, repo-local config, then applies
    /// environment variable overrides.
    pub fn load(repo_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: repo-local config
        if let Some(root) = repo_root {
            let local_path = root.join(crate::constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(crate::constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        let default_github = GithubConfig::default();
        if other.github.api_url != default_github.api_url {
            self.github.api_url = other.github.api_url;
        }
        if other.github.token.is_some() {
            self.github.token = other.github.token;
        }

        let default_render = RenderConfig::default();
        if other.render.font_size_px != default_render.font_size_px {
            self.render.font_size_px = other.render.font_size_px;
        }
        if other.render.bridge_scheme != default_render.bridge_scheme {
            self.render.bridge_scheme = other.render.bridge_scheme;
        }

        if other.network.timeout_secs != NetworkConfig::default().timeout_secs {
            self.network.timeout_secs = other.network.timeout_secs;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(token) = env.first_of(&[ENV_TOKEN, ENV_GITHUB_TOKEN]) {
            self.github.token = Some(token);
        }
        if let Some(url) = env.var(ENV_API_URL) {
            self.github.api_url = url;
        }
        if let Some(val) = env.var(ENV_FONT_SIZE) {
            match val.parse::<u32>() {
                Ok(size) if size > 0 => self.render.font_size_px = size,
                _ => tracing::warn!("ignoring invalid {ENV_FONT_SIZE} value: {val}"),
            }
        }
        if let Some(val) = env.var(ENV_TIMEOUT_SECS) {
            match val.parse::<u64>() {
                Ok(secs) => self.network.timeout_secs = secs,
                Err(_) => tracing::warn!("ignoring invalid {ENV_TIMEOUT_SECS} value: {val}"),
            }
        }
    }
}
