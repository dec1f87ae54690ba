//! Environment-driven server configuration.
//!
//! Read once at startup. Blank variables count as unset. The fallback
//! provider inherits every setting it does not override from the primary.

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use neurostudy_llm::openai::ProviderSettings;
use thiserror::Error;

pub const DEFAULT_BIND: &str = "0.0.0.0:3001";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub primary: ProviderSettings,
    pub fallback: ProviderSettings,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub request_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind: SocketAddr = parse_value(
            get("NEUROSTUDY_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            "NEUROSTUDY_BIND",
        )?;

        let temperature = match get("LLM_TEMPERATURE") {
            Some(raw) => Some(parse_value::<f32>(raw, "LLM_TEMPERATURE")?),
            None => None,
        };

        let primary = ProviderSettings {
            base_url: get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: get("LLM_API_KEY").unwrap_or_default(),
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature,
        };

        let fallback = ProviderSettings {
            base_url: get("FALLBACK_BASE_URL").unwrap_or_else(|| primary.base_url.clone()),
            api_key: get("FALLBACK_API_KEY").unwrap_or_else(|| primary.api_key.clone()),
            model: get("FALLBACK_MODEL").unwrap_or_else(|| primary.model.clone()),
            temperature,
        };

        Ok(Self {
            bind,
            primary,
            fallback,
            connect_timeout: secs(
                get("LLM_CONNECT_TIMEOUT_SECS"),
                "LLM_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
            idle_timeout: secs(
                get("LLM_IDLE_TIMEOUT_SECS"),
                "LLM_IDLE_TIMEOUT_SECS",
                DEFAULT_IDLE_TIMEOUT_SECS,
            )?,
            request_timeout: secs(
                get("LLM_REQUEST_TIMEOUT_SECS"),
                "LLM_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
        })
    }

    /// Log the effective configuration with credentials redacted.
    pub fn log_summary(&self) {
        tracing::info!(
            bind = %self.bind,
            primary_url = %self.primary.base_url,
            primary_model = %self.primary.model,
            primary_key = %redact_api_key(&self.primary.api_key),
            fallback_url = %self.fallback.base_url,
            fallback_model = %self.fallback.model,
            fallback_key = %redact_api_key(&self.fallback.api_key),
            connect_timeout_secs = self.connect_timeout.as_secs(),
            idle_timeout_secs = self.idle_timeout.as_secs(),
            request_timeout_secs = self.request_timeout.as_secs(),
            "configuration loaded"
        );
    }
}

fn parse_value<T>(raw: String, key: &'static str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let parsed = raw.trim().parse::<T>();
    match parsed {
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value: raw,
        }),
    }
}

fn secs(raw: Option<String>, key: &'static str, default: u64) -> Result<Duration, ConfigError> {
    let value = match raw {
        Some(raw) => parse_value::<u64>(raw, key)?,
        None => default,
    };
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }
    Ok(Duration::from_secs(value))
}

/// Keep only the first and last four characters of a key for logs.
pub fn redact_api_key(key: &str) -> String {
    if key.is_empty() {
        return "<unset>".to_string();
    }
    if key.len() <= 8 || !key.is_ascii() {
        return "****".to_string();
    }
    let prefix = &key[..4];
    let suffix = &key[key.len() - 4..];
    format!("{prefix}...{suffix}")
}
