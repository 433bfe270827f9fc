use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::brain::AgenticStrength;

/// One persisted exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user_message: String,
    pub assistant_response: String,
    pub recorded_at: DateTime<Utc>,
}

/// Per-user preferences and history
///
/// Getters return `None` when the user never stored a value, so callers
/// can tell an explicit override from a system default.
#[async_trait::async_trait]
pub trait UserStatePort: Send + Sync {
    async fn response_language(&self, user_id: &str) -> Result<Option<String>>;

    async fn last_response_language(&self, user_id: &str) -> Result<Option<String>>;

    async fn set_last_response_language(&self, user_id: &str, language: &str) -> Result<()>;

    async fn agentic_strength(&self, user_id: &str) -> Result<Option<AgenticStrength>>;

    async fn dev_agentic_mcp(&self, user_id: &str) -> Result<Option<bool>>;

    async fn chat_history(&self, user_id: &str) -> Result<Vec<ChatTurn>>;

    async fn append_chat_history(&self, user_id: &str, query: &str, response: &str) -> Result<()>;
}
