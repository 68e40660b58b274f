//! Configuration management for Talentgate
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every tunable has a serde default matching the production values, so an
//! empty file (or a missing section) yields a working configuration. The
//! assistant API key is deliberately absent here: it comes from the
//! environment only.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::Config(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| AppError::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field invariants that serde defaults cannot express
    pub fn validate(&self) -> AppResult<()> {
        if self.limits.max_requests == 0 {
            return Err(AppError::Config(
                "limits.max_requests must be at least 1".to_string(),
            ));
        }
        if self.limits.max_message_chars == 0 {
            return Err(AppError::Config(
                "limits.max_message_chars must be at least 1".to_string(),
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(AppError::Config(
                "cache.max_entries must be at least 1".to_string(),
            ));
        }
        let threshold = self.cache.similarity_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(AppError::Config(format!(
                "cache.similarity_threshold must be in (0.0, 1.0], got {}",
                threshold
            )));
        }
        Ok(())
    }
}

/// Server bind configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Request admission limits (content filter + IP gate)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Maximum message length in Unicode characters
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    /// Rate-limit window duration in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    /// Maximum requests allowed per client per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Ban duration in seconds once the limit is exceeded
    #[serde(default = "default_ban_seconds")]
    pub ban_seconds: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_message_chars: default_max_message_chars(),
            window_seconds: default_window_seconds(),
            max_requests: default_max_requests(),
            ban_seconds: default_ban_seconds(),
        }
    }
}

fn default_max_message_chars() -> usize {
    200
}

fn default_window_seconds() -> u64 {
    60
}

fn default_max_requests() -> u32 {
    10
}

fn default_ban_seconds() -> u64 {
    300
}

/// Response cache tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Per-entry time-to-live in seconds
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    /// Maximum number of live entries before oldest-first eviction
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Token-overlap ratio at or above which a fuzzy match is served
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            max_entries: default_max_entries(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

fn default_ttl_seconds() -> u64 {
    3600
}

fn default_max_entries() -> usize {
    100
}

fn default_similarity_threshold() -> f64 {
    0.6
}

/// Analytics recording configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    /// Store key prefix; events are written as `{prefix}:question:{millis}`
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Upper bound on events returned by the listing scan
    #[serde(default = "default_scan_limit")]
    pub scan_limit: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            scan_limit: default_scan_limit(),
        }
    }
}

fn default_key_prefix() -> String {
    "talentgate".to_string()
}

fn default_scan_limit() -> usize {
    500
}

/// Assistant collaborator configuration
///
/// The API key is read from the `OPENAI_API_KEY` environment variable at
/// startup, never from this file. `assistant_id` may also be overridden via
/// the `ASSISTANT_ID` environment variable.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_base_url")]
    pub base_url: String,
    /// Pre-provisioned assistant identifier; when absent the collaborator
    /// creates one on first use
    #[serde(default)]
    pub assistant_id: Option<String>,
    /// Delay between run-status polls in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Maximum number of run-status polls before giving up
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: default_assistant_base_url(),
            assistant_id: None,
            poll_interval_ms: default_poll_interval_ms(),
            poll_max_attempts: default_poll_max_attempts(),
        }
    }
}

impl AssistantConfig {
    /// Effective assistant id: environment override wins over the config file
    pub fn assistant_id_override(&self) -> Option<String> {
        std::env::var("ASSISTANT_ID")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.assistant_id.clone())
    }
}

fn default_assistant_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_poll_max_attempts() -> u32 {
    30
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Allowed origin; `None` permits any origin
    #[serde(default)]
    pub allowed_origin: Option<String>,
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
