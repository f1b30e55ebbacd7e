use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{FlowError, Result};
use crate::validation::{MAX_UPLOAD_BYTES, ValidationPolicy};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Client configuration. Durations are stored in milliseconds so the YAML
/// file and the environment use the same units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Backend origin, without a trailing slash.
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    /// Pause between a parsed resume and the move to the next step.
    pub advance_delay_ms: u64,
    /// How long the job-description upload pretends to take.
    pub simulated_upload_delay_ms: u64,
    pub max_upload_bytes: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_ms: 30_000,
            advance_delay_ms: 1_500,
            simulated_upload_delay_ms: 2_000,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl FlowConfig {
    /// Defaults overridden by `ONBOARD_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FlowError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: FlowConfig = serde_yaml::from_str(raw)
            .map_err(|e| FlowError::Config(format!("Invalid configuration: {}", e)))?;
        config.validate()
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `ONBOARD_*` overrides read through `lookup`, then validate.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup("ONBOARD_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(ms) = parse_u64(&lookup, "ONBOARD_REQUEST_TIMEOUT_MS")? {
            self.request_timeout_ms = ms;
        }
        if let Some(ms) = parse_u64(&lookup, "ONBOARD_ADVANCE_DELAY_MS")? {
            self.advance_delay_ms = ms;
        }
        if let Some(ms) = parse_u64(&lookup, "ONBOARD_SIMULATED_UPLOAD_DELAY_MS")? {
            self.simulated_upload_delay_ms = ms;
        }
        if let Some(bytes) = parse_u64(&lookup, "ONBOARD_MAX_UPLOAD_BYTES")? {
            self.max_upload_bytes = bytes;
        }
        self.validate()
    }

    pub fn validate(mut self) -> Result<Self> {
        let trimmed = self.api_base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(FlowError::Config(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                self.api_base_url
            )));
        }
        self.api_base_url = trimmed.to_string();

        if self.max_upload_bytes == 0 {
            return Err(FlowError::Config(
                "max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    pub fn simulated_upload_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_upload_delay_ms)
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy::default().with_max_bytes(self.max_upload_bytes)
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| FlowError::Config(format!("{} must be a non-negative integer", key))),
        None => Ok(None),
    }
}
