use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::user_state::ChatTurn;
use crate::pipeline::ProgressReporter;

/// How hard the backend may work on a single query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum AgenticStrength {
    #[default]
    Low,
    Medium,
    High,
}

impl FromStr for AgenticStrength {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(AgenticStrength::Low),
            "medium" => Ok(AgenticStrength::Medium),
            "high" => Ok(AgenticStrength::High),
            other => anyhow::bail!("unknown agentic strength: {}", other),
        }
    }
}

impl TryFrom<String> for AgenticStrength {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for AgenticStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgenticStrength::Low => "low",
            AgenticStrength::Medium => "medium",
            AgenticStrength::High => "high",
        };
        f.write_str(s)
    }
}

/// Effective value plus the raw stored override, if the user set one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference<T> {
    pub effective: T,
    pub user_override: Option<T>,
}

impl<T: Clone> Preference<T> {
    /// Stored preference wins, otherwise the system default
    pub fn resolve(user_override: Option<T>, system_default: T) -> Self {
        let effective = user_override.clone().unwrap_or(system_default);
        Self {
            effective,
            user_override,
        }
    }

    pub fn is_overridden(&self) -> bool {
        self.user_override.is_some()
    }
}

/// Everything the backend needs for one query
#[derive(Debug, Clone)]
pub struct BrainPayload {
    pub user_id: String,
    pub user_query: String,
    pub user_chat_history: Vec<ChatTurn>,
    /// Stored preference only; `None` lets the backend detect the language
    pub user_response_language: Option<String>,
    pub agentic_strength: Preference<AgenticStrength>,
    pub dev_agentic_mcp: Preference<bool>,
    pub perf_trace_id: String,
    pub progress_enabled: bool,
    pub progress_throttle: Duration,
    pub progress: ProgressReporter,
}

/// Backend output
///
/// Produced by an external component, so every field tolerates absence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrainResult {
    #[serde(default)]
    pub translated_responses: Vec<String>,
    #[serde(default)]
    pub send_voice_message: bool,
    #[serde(default)]
    pub voice_message_text: Option<String>,
    #[serde(default)]
    pub response_language: Option<String>,
}

impl BrainResult {
    pub fn text<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            translated_responses: responses.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Declared language, ignoring blank values
    pub fn declared_language(&self) -> Option<&str> {
        self.response_language
            .as_deref()
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
    }

    /// Explicit voice text usable as a voice payload, ignoring blank values.
    ///
    /// Presence of `voice_message_text` (even blank) is still what decides
    /// whether text fragments accompany a voice reply.
    pub fn explicit_voice_text(&self) -> Option<&str> {
        self.voice_message_text
            .as_deref()
            .filter(|text| !text.is_empty())
    }
}

/// The reasoning/retrieval backend
///
/// `invoke` blocks for the whole computation; the pipeline only ever calls
/// it from the blocking thread pool.
pub trait Brain: Send + Sync {
    fn invoke(&self, payload: BrainPayload) -> Result<BrainResult>;
}
