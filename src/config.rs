//! Configuration
//!
//! Backend settings are read once at process start and handed to the
//! provider and pipeline explicitly. Nothing below `main` looks at the
//! environment.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const MODEL_VAR: &str = "AI_MODEL";
pub const BASE_URL_VAR: &str = "OPENROUTER_BASE_URL";
pub const TEMPERATURE_VAR: &str = "CBN_TEMPERATURE";
pub const MAX_TOKENS_VAR: &str = "CBN_MAX_TOKENS";
pub const INTERPRETATION_MAX_TOKENS_VAR: &str = "CBN_INTERPRETATION_MAX_TOKENS";
pub const REQUEST_TIMEOUT_VAR: &str = "CBN_REQUEST_TIMEOUT_SECS";
pub const INTERPRET_AFTER_UPDATE_VAR: &str = "CBN_INTERPRET_AFTER_UPDATE";

const DEFAULT_MODEL: &str = "qwen/qwen-2.5-72b-instruct";
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_MAX_TOKENS: u32 = 2500;
const DEFAULT_INTERPRETATION_MAX_TOKENS: u32 = 150;

/// Routing prefix used by some client libraries; OpenRouter itself wants the bare id.
const ROUTING_PREFIX: &str = "openrouter/";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("OPENROUTER_API_KEY is not set")]
    MissingApiKey,
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Which CBN state the per-turn interpretation is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpretationTiming {
    /// The state as it was before the instruction was applied.
    #[default]
    BeforeUpdate,
    /// The state returned by the turn.
    AfterUpdate,
}

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub interpretation_max_tokens: u32,
    pub request_timeout: Option<Duration>,
    pub interpretation_timing: InterpretationTiming,
}

impl Config {
    /// Build a configuration with defaults for everything but the credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            interpretation_max_tokens: DEFAULT_INTERPRETATION_MAX_TOKENS,
            request_timeout: None,
            interpretation_timing: InterpretationTiming::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get(API_KEY_VAR).ok_or(ConfigError::MissingApiKey)?;
        let mut config = Self::new(api_key);

        if let Some(model) = get(MODEL_VAR) {
            config.model = model
                .strip_prefix(ROUTING_PREFIX)
                .map(str::to_string)
                .unwrap_or(model);
        }
        if let Some(url) = get(BASE_URL_VAR) {
            config.base_url = url;
        }
        if let Some(raw) = get(TEMPERATURE_VAR) {
            config.temperature = parse_value(TEMPERATURE_VAR, raw)?;
        }
        if let Some(raw) = get(MAX_TOKENS_VAR) {
            config.max_tokens = parse_value(MAX_TOKENS_VAR, raw)?;
        }
        if let Some(raw) = get(INTERPRETATION_MAX_TOKENS_VAR) {
            config.interpretation_max_tokens = parse_value(INTERPRETATION_MAX_TOKENS_VAR, raw)?;
        }
        if let Some(raw) = get(REQUEST_TIMEOUT_VAR) {
            let secs: u64 = parse_value(REQUEST_TIMEOUT_VAR, raw)?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(raw) = get(INTERPRET_AFTER_UPDATE_VAR) {
            config.interpretation_timing = match raw.to_lowercase().as_str() {
                "true" | "1" | "yes" => InterpretationTiming::AfterUpdate,
                "false" | "0" | "no" => InterpretationTiming::BeforeUpdate,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: INTERPRET_AFTER_UPDATE_VAR,
                        value: raw,
                    })
                }
            };
        }

        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

fn parse_value<T: std::str::FromStr>(var: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue { var, value: raw })
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("interpretation_max_tokens", &self.interpretation_max_tokens)
            .field("request_timeout", &self.request_timeout)
            .field("interpretation_timing", &self.interpretation_timing)
            .finish()
    }
}
