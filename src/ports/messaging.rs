use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MessagingError;

/// Kind of content the user sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    /// Voice note; `media_id` must be transcribed before use
    Audio,
}

/// A single inbound user message
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub user_id: String,
    pub message_id: String,
    /// Message text (empty for audio until transcribed)
    pub text: String,
    pub kind: MessageKind,
    /// Transport reference to the audio payload
    pub media_id: String,
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    pub fn text(user_id: impl Into<String>, message_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            message_id: message_id.into(),
            text: text.into(),
            kind: MessageKind::Text,
            media_id: String::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn audio(
        user_id: impl Into<String>,
        message_id: impl Into<String>,
        media_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            message_id: message_id.into(),
            text: String::new(),
            kind: MessageKind::Audio,
            media_id: media_id.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_audio(&self) -> bool {
        self.kind == MessageKind::Audio
    }
}

/// Channel-specific transport
///
/// Implementations report missing capabilities with
/// `MessagingError::Unsupported` rather than failing silently.
#[async_trait::async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text_message(&self, user_id: &str, text: &str) -> Result<(), MessagingError>;

    async fn send_voice_message(&self, user_id: &str, text: &str) -> Result<(), MessagingError>;

    async fn send_typing_indicator(&self, message_id: &str) -> Result<(), MessagingError>;

    async fn transcribe_voice_message(&self, media_id: &str) -> Result<String, MessagingError>;
}
