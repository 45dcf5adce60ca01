//! Layered service configuration.
//!
//! `config.toml` is required; `config.override.toml` next to it is merged on
//! top when present. The `PORT` environment variable wins over both for the
//! listen port, and `OPENAI_API_KEY` fills in a key the files leave empty.

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

use crate::repository::StorageKind;

pub const BASE_CONFIG_FILE: &str = "config.toml";
pub const OVERRIDE_CONFIG_FILE: &str = "config.override.toml";
const DEFAULT_CONFIG_DIR: &str = "config";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_MODEL: &str = "gpt-4";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{0} is not configured")]
    Missing(&'static str),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Debug,
    Release,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, PartialEq, Eq)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub structured_outputs: bool,
}

impl fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("structured_outputs", &self.structured_outputs)
            .finish()
    }
}

/// Fully resolved configuration. Built once at startup and handed to
/// constructors; nothing reads configuration after this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub mode: RunMode,
    pub storage: StorageKind,
    pub server: ServerConfig,
    pub openai: OpenAIConfig,
}

/// Values taken from the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub port: Option<String>,
    pub api_key: Option<String>,
}

impl EnvOverrides {
    #[must_use]
    pub fn from_env() -> Self {
        let non_empty = |name: &str| env::var(name).ok().filter(|value| !value.is_empty());
        Self {
            port: non_empty("PORT"),
            api_key: non_empty("OPENAI_API_KEY"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    mode: Option<RunMode>,
    storage: Option<StorageKind>,
    server: RawServerConfig,
    openai: RawOpenAIConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawServerConfig {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOpenAIConfig {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    structured_outputs: Option<bool>,
}

impl AppConfig {
    /// Load `.env`, then resolve the config directory (`COFFEE_CONFIG_DIR`,
    /// default `./config`) against the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let dir = env::var("COFFEE_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
        Self::load_from(Path::new(&dir), &EnvOverrides::from_env())
    }

    pub fn load_from(dir: &Path, overrides: &EnvOverrides) -> Result<Self, ConfigError> {
        let base_path = dir.join(BASE_CONFIG_FILE);
        let mut table = read_table(&base_path)?;

        let override_path = dir.join(OVERRIDE_CONFIG_FILE);
        if override_path.is_file() {
            merge_tables(&mut table, read_table(&override_path)?);
        }

        let raw: RawConfig = toml::Value::Table(table)
            .try_into()
            .map_err(|source| ConfigError::Parse {
                path: base_path,
                source,
            })?;

        Self::resolve(raw, overrides)
    }

    fn resolve(raw: RawConfig, overrides: &EnvOverrides) -> Result<Self, ConfigError> {
        let port = match &overrides.port {
            Some(port) => port.trim().parse::<u16>().map_err(|error| ConfigError::Invalid {
                field: "PORT",
                reason: format!("{port:?}: {error}"),
            })?,
            None => raw.server.port.ok_or(ConfigError::Missing("server.port"))?,
        };
        if port == 0 {
            return Err(ConfigError::Invalid {
                field: "server.port",
                reason: "port must be non-zero".to_string(),
            });
        }

        let api_key = raw
            .openai
            .api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| overrides.api_key.clone())
            .ok_or(ConfigError::Missing("openai.api_key"))?;

        let timeout = match raw.openai.timeout_secs {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    field: "openai.timeout_secs",
                    reason: "timeout must be at least one second".to_string(),
                })
            }
            secs => secs.map(Duration::from_secs),
        };

        Ok(Self {
            mode: raw.mode.unwrap_or_default(),
            storage: raw.storage.unwrap_or_default(),
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
            },
            openai: OpenAIConfig {
                api_key,
                model: raw.openai.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: raw.openai.base_url,
                timeout,
                structured_outputs: raw.openai.structured_outputs.unwrap_or(false),
            },
        })
    }
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge `overlay` into `base`. Nested tables merge key by key; any other
/// value in `overlay` replaces the one in `base`.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(overlay_table) = value {
            if let Some(toml::Value::Table(base_table)) = base.get_mut(&key) {
                merge_tables(base_table, overlay_table);
                continue;
            }
            base.insert(key, toml::Value::Table(overlay_table));
        } else {
            base.insert(key, value);
        }
    }
}
