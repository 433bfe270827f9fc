use anyhow::{ensure, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::ports::AgenticStrength;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
    /// Upper bound on a single chat request before the run is cancelled
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Process-wide knobs read by the message pipeline on every run
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// Global switch for mid-run progress notifications
    #[serde(default = "default_true")]
    pub progress_messages_enabled: bool,

    /// Minimum gap between two progress notifications (seconds)
    #[serde(default = "default_progress_interval")]
    pub progress_message_min_interval_secs: f64,

    /// System default when the user has no stored preference
    #[serde(default)]
    pub agentic_strength: AgenticStrength,

    /// System default for the dev MCP feature flag
    #[serde(default)]
    pub dev_agentic_mcp: bool,

    /// HMAC key for pseudonymized log user ids
    #[serde(default)]
    pub log_pseudonym_secret: String,

    /// Language code that never receives a language indicator
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl PipelineSettings {
    /// Out-of-range intervals saturate; negative and NaN mean no throttle
    pub fn progress_throttle(&self) -> Duration {
        let secs = self.progress_message_min_interval_secs;
        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> Result<()> {
        let secs = self.progress_message_min_interval_secs;
        ensure!(
            secs.is_finite() && secs >= 0.0 && Duration::try_from_secs_f64(secs).is_ok(),
            "progress_message_min_interval_secs must be finite and non-negative, got {}",
            secs
        );
        Ok(())
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            progress_messages_enabled: true,
            progress_message_min_interval_secs: default_progress_interval(),
            agentic_strength: AgenticStrength::default(),
            dev_agentic_mcp: false,
            log_pseudonym_secret: String::new(),
            default_language: default_language(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_progress_interval() -> f64 {
    3.0
}

fn default_language() -> String {
    "en".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Config {
    /// Load from `path` (any format the `config` crate recognizes), then
    /// overlay `ASSISTANT__SECTION__KEY` environment variables.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("ASSISTANT").separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.pipeline.validate()?;
        Ok(config)
    }
}
