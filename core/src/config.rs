//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const API_URL_VAR: &str = "SCOLARITE_API_URL";
pub const API_KEY_VAR: &str = "SCOLARITE_API_KEY";
pub const TIMEOUT_VAR: &str = "SCOLARITE_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    /// Fallback bearer token, used when no session token is set.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout applied by the transport. None waits forever.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} is not a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout_secs: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any key/value source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let base_url = get(API_URL_VAR).ok_or(ConfigError::Missing(API_URL_VAR))?;
        let timeout_secs = get(TIMEOUT_VAR)
            .map(|value| {
                value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                    name: TIMEOUT_VAR,
                    value,
                })
            })
            .transpose()?;

        Ok(Self {
            base_url,
            api_key: get(API_KEY_VAR),
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
