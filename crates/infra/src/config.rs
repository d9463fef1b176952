//! Workflow configuration.
//!
//! Resolution order: built-in defaults, then the TOML file (if any), then
//! environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const ENV_API_KEY: &str = "ALLYFLOW_GENERATION_API_KEY";
pub const ENV_ENDPOINT: &str = "ALLYFLOW_GENERATION_ENDPOINT";
pub const ENV_TIMEOUT_SECS: &str = "ALLYFLOW_GENERATION_TIMEOUT_SECS";

const REDACTED: &str = "***";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {name}: `{value}`")]
    InvalidEnv { name: &'static str, value: String },

    #[error("invalid config value for {field}: {value} (must be greater than zero)")]
    InvalidValue { field: &'static str, value: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub generation: GenerationConfig,
}

/// Text-generation transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// The key, if one is configured and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

impl WorkflowConfig {
    /// Load from an optional TOML file, then apply process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        base.with_overrides(std::env::vars())
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Timeouts of zero would fail every generation call immediately.
    fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [
            ("generation.timeout_secs", self.generation.timeout_secs),
            ("generation.connect_timeout_secs", self.generation.connect_timeout_secs),
        ];
        for (field, value) in timeouts {
            if value == 0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        Ok(())
    }

    /// Apply `ALLYFLOW_*` overrides from the given variables. Unrelated names
    /// are ignored.
    pub fn with_overrides<I, K, V>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in vars {
            match name.as_ref() {
                ENV_API_KEY => self.generation.api_key = Some(value.into()),
                ENV_ENDPOINT => self.generation.endpoint = value.into(),
                ENV_TIMEOUT_SECS => {
                    let value = value.into();
                    self.generation.timeout_secs = value
                        .trim()
                        .parse::<u64>()
                        .ok()
                        .filter(|secs| *secs > 0)
                        .ok_or(ConfigError::InvalidEnv {
                            name: ENV_TIMEOUT_SECS,
                            value,
                        })?;
                }
                _ => {}
            }
        }
        Ok(self)
    }

    /// Copy safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.generation.api_key.is_some() {
            copy.generation.api_key = Some(REDACTED.to_string());
        }
        copy
    }
}
