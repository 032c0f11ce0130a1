//! Provider configuration
//!
//! Every setting can be given explicitly or picked up from a `SKYWARD_*`
//! environment variable. Explicit values always win.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENV_API_KEY: &str = "SKYWARD_API_KEY";
pub const ENV_DATA_CENTER: &str = "SKYWARD_DATA_CENTER";
pub const ENV_ORGANIZATION: &str = "SKYWARD_ORGANIZATION";
pub const ENV_SKIP_TRASH_OBJECT_PURGE: &str = "SKYWARD_SKIP_TRASH_OBJECT_PURGE";
pub const ENV_LOG_LEVEL: &str = "SKYWARD_LOG_LEVEL";
pub const ENV_API_URL: &str = "SKYWARD_API_URL";

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_API_URL: &str = "https://api.skyward.cloud/";

/// Settings as written in provider configuration; unset fields fall back to
/// the environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOverrides {
    pub api_key: Option<String>,
    pub data_center: Option<String>,
    pub organization: Option<String>,
    pub skip_trash_object_purge: Option<bool>,
    pub log_level: Option<String>,
    pub api_url: Option<String>,
}

/// Resolved provider configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub data_center: Option<String>,
    pub organization: Option<String>,
    /// Leave deleted objects in the trash instead of purging them
    pub skip_trash_object_purge: bool,
    pub log_level: String,
    pub api_url: String,
}

impl ProviderConfig {
    /// Create ProviderConfig from environment variables
    pub fn from_env() -> Result<Self> {
        Self::resolve(ProviderOverrides::default())
    }

    /// Merge explicit settings with the environment
    pub fn resolve(overrides: ProviderOverrides) -> Result<Self> {
        let api_key = string_or_env(overrides.api_key, ENV_API_KEY).ok_or_else(|| {
            CloudError::InvalidConfig(format!(
                "API key must be set explicitly or via {}",
                ENV_API_KEY
            ))
        })?;

        let skip_trash_object_purge = match overrides.skip_trash_object_purge {
            Some(skip) => skip,
            None => match std::env::var(ENV_SKIP_TRASH_OBJECT_PURGE) {
                Ok(value) => parse_bool(&value).ok_or_else(|| {
                    CloudError::InvalidConfig(format!(
                        "{} must be a boolean, got '{}'",
                        ENV_SKIP_TRASH_OBJECT_PURGE, value
                    ))
                })?,
                Err(_) => false,
            },
        };

        Ok(Self {
            api_key,
            data_center: string_or_env(overrides.data_center, ENV_DATA_CENTER),
            organization: string_or_env(overrides.organization, ENV_ORGANIZATION),
            skip_trash_object_purge,
            log_level: string_or_env(overrides.log_level, ENV_LOG_LEVEL)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            api_url: string_or_env(overrides.api_url, ENV_API_URL)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }
}

/// Per-operation timeouts of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(60),
            delete: Duration::from_secs(120),
        }
    }
}

fn string_or_env(explicit: Option<String>, var: &str) -> Option<String> {
    explicit
        .or_else(|| std::env::var(var).ok())
        .filter(|value| !value.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" => Some(true),
        "0" | "false" | "f" | "no" | "" => Some(false),
        _ => None,
    }
}
