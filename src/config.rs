//! Runtime configuration
//!
//! Settings come from an optional TOML file and are then overridden by the
//! environment. The only value that normally needs setting is the gateway
//! credential (`GEMINI_API_KEY`, or `API_KEY`).

use crate::error::WellnessError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "API_KEY";
pub const ENV_MODEL: &str = "XINYU_MODEL";
pub const ENV_API_BASE: &str = "XINYU_API_BASE";

/// Generative AI gateway settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub api_base: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Per-request timeout. Unset means requests wait indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            request_timeout_secs: None,
        }
    }
}

impl GatewayConfig {
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Audio output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    /// Ambient loop volume (0-1)
    pub ambient_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ambient_volume: 0.8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub audio: AudioConfig,
}

impl Config {
    /// Default config file location (`<config dir>/rail-xinyu/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rail-xinyu").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self, WellnessError> {
        let config: Config =
            toml::from_str(content).map_err(|e| WellnessError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// if present, otherwise built-in defaults. Environment overrides apply in
    /// both cases.
    pub fn load(path: Option<&Path>) -> Result<Self, WellnessError> {
        let mut config = match path {
            Some(p) => {
                let content = fs::read_to_string(p).map_err(|e| {
                    WellnessError::Config(format!("cannot read {}: {}", p.display(), e))
                })?;
                Self::from_toml(&content)?
            }
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => {
                    tracing::debug!(path = %p.display(), "loading config");
                    Self::from_toml(&fs::read_to_string(&p)?)?
                }
                None => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY).or_else(|| non_empty(ENV_API_KEY_FALLBACK)) {
            self.gateway.api_key = Some(key);
        }
        if let Some(model) = non_empty(ENV_MODEL) {
            self.gateway.model = model;
        }
        if let Some(base) = non_empty(ENV_API_BASE) {
            self.gateway.api_base = base.trim_end_matches('/').to_string();
        }
    }

    fn validate(&self) -> Result<(), WellnessError> {
        if !(0.0..=1.0).contains(&self.audio.ambient_volume) {
            return Err(WellnessError::Config(format!(
                "audio.ambient_volume must be within 0-1, got {}",
                self.audio.ambient_volume
            )));
        }
        if self.gateway.model.trim().is_empty() {
            return Err(WellnessError::Config("gateway.model is empty".to_string()));
        }
        if self.gateway.request_timeout_secs == Some(0) {
            return Err(WellnessError::Config(
                "gateway.request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
