// src/config.rs

//! Application configuration.
//!
//! Loaded from a TOML file with per-field defaults; the webhook URL may
//! also come from the `STATUSWATCH_WEBHOOK_URL` environment variable so
//! the secret stays out of the file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable overriding `notify.webhook_url`.
pub const WEBHOOK_ENV_VAR: &str = "STATUSWATCH_WEBHOOK_URL";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Status page polling settings
    #[serde(default)]
    pub status: StatusConfig,

    /// Notification channel settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            let mut config = Self::default();
            config.apply_env();
            config
        })
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(WEBHOOK_ENV_VAR) {
            if !url.trim().is_empty() {
                self.notify.webhook_url = Some(url);
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.status.url)
            .map_err(|e| AppError::config(format!("status.url is invalid: {e}")))?;
        if self.status.timeout_secs == 0 {
            return Err(AppError::config("status.timeout_secs must be > 0"));
        }
        if self.status.user_agent.trim().is_empty() {
            return Err(AppError::config("status.user_agent is empty"));
        }
        if self.status.check_interval_mins == 0 {
            return Err(AppError::config("status.check_interval_mins must be > 0"));
        }
        if self.status.components.is_empty() {
            return Err(AppError::config("status.components must not be empty"));
        }
        if let Some(webhook) = &self.notify.webhook_url {
            url::Url::parse(webhook)
                .map_err(|e| AppError::config(format!("notify.webhook_url is invalid: {e}")))?;
        }
        if !matches!(
            self.logging.level.as_str(),
            "off" | "error" | "warn" | "info" | "debug" | "trace"
        ) {
            return Err(AppError::config(format!(
                "logging.level '{}' is not a log level",
                self.logging.level
            )));
        }
        Ok(())
    }
}

/// Status page polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Status page URL
    #[serde(default = "defaults::url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Retry attempts after a failed fetch
    #[serde(default = "defaults::retries")]
    pub retries: u32,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Component names to track; anything else on the page is ignored
    #[serde(default = "defaults::components")]
    pub components: Vec<String>,

    /// Minutes between scheduled checks
    #[serde(default = "defaults::check_interval")]
    pub check_interval_mins: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            url: defaults::url(),
            timeout_secs: defaults::timeout(),
            retries: defaults::retries(),
            user_agent: defaults::user_agent(),
            components: defaults::components(),
            check_interval_mins: defaults::check_interval(),
        }
    }
}

/// Notification channel settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotifyConfig {
    /// Discord webhook URL; notifications are skipped when unset
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log verbosity: off, error, warn, info, debug, trace
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn url() -> String {
        "https://status.anthropic.com".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn retries() -> u32 {
        3
    }
    pub fn user_agent() -> String {
        "statuswatch/0.1".into()
    }
    pub fn components() -> Vec<String> {
        vec![
            "console.anthropic.com".into(),
            "api.anthropic.com".into(),
            "api.anthropic.com - Beta Features".into(),
            "anthropic.com".into(),
        ]
    }
    pub fn check_interval() -> u64 {
        5
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
