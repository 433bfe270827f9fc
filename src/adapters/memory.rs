use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::ports::{AgenticStrength, ChatTurn, UserStatePort};

#[derive(Debug, Clone, Default)]
struct UserRecord {
    response_language: Option<String>,
    last_response_language: Option<String>,
    agentic_strength: Option<AgenticStrength>,
    dev_agentic_mcp: Option<bool>,
    history: Vec<ChatTurn>,
}

/// Process-local user state; contents are lost on restart
#[derive(Debug, Default)]
pub struct InMemoryUserState {
    users: RwLock<HashMap<String, UserRecord>>,
    /// Oldest turns are dropped beyond this many (0 = unbounded)
    max_history: usize,
}

impl InMemoryUserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            max_history,
        }
    }

    pub async fn set_response_language(&self, user_id: &str, language: Option<&str>) {
        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().response_language = language.map(str::to_string);
    }

    pub async fn set_agentic_strength(&self, user_id: &str, strength: Option<AgenticStrength>) {
        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().agentic_strength = strength;
    }

    pub async fn set_dev_agentic_mcp(&self, user_id: &str, enabled: Option<bool>) {
        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().dev_agentic_mcp = enabled;
    }

    async fn read<T>(&self, user_id: &str, f: impl FnOnce(&UserRecord) -> T) -> Option<T> {
        self.users.read().await.get(user_id).map(f)
    }
}

#[async_trait::async_trait]
impl UserStatePort for InMemoryUserState {
    async fn response_language(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.read(user_id, |u| u.response_language.clone()).await.flatten())
    }

    async fn last_response_language(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.read(user_id, |u| u.last_response_language.clone()).await.flatten())
    }

    async fn set_last_response_language(&self, user_id: &str, language: &str) -> Result<()> {
        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().last_response_language = Some(language.to_string());
        Ok(())
    }

    async fn agentic_strength(&self, user_id: &str) -> Result<Option<AgenticStrength>> {
        Ok(self.read(user_id, |u| u.agentic_strength).await.flatten())
    }

    async fn dev_agentic_mcp(&self, user_id: &str) -> Result<Option<bool>> {
        Ok(self.read(user_id, |u| u.dev_agentic_mcp).await.flatten())
    }

    async fn chat_history(&self, user_id: &str) -> Result<Vec<ChatTurn>> {
        Ok(self.read(user_id, |u| u.history.clone()).await.unwrap_or_default())
    }

    async fn append_chat_history(&self, user_id: &str, query: &str, response: &str) -> Result<()> {
        let mut users = self.users.write().await;
        let history = &mut users.entry(user_id.to_string()).or_default().history;
        history.push(ChatTurn {
            user_message: query.to_string(),
            assistant_response: response.to_string(),
            recorded_at: Utc::now(),
        });
        if self.max_history > 0 && history.len() > self.max_history {
            let excess = history.len() - self.max_history;
            history.drain(..excess);
        }
        Ok(())
    }
}
