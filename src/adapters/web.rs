use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::MessagingError;
use crate::pipeline::OutboundMessage;
use crate::ports::MessagingPort;

/// Messaging transport for web chat: collects responses in memory so the
/// HTTP handler can return them in its response body.
#[derive(Default)]
pub struct WebMessagingAdapter {
    responses: Mutex<Vec<OutboundMessage>>,
    typing_indicators: Mutex<Vec<String>>,
}

impl WebMessagingAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected responses, in send order
    pub async fn responses(&self) -> Vec<OutboundMessage> {
        self.responses.lock().await.clone()
    }

    pub async fn typing_indicators(&self) -> Vec<String> {
        self.typing_indicators.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.responses.lock().await.clear();
        self.typing_indicators.lock().await.clear();
    }
}

#[async_trait::async_trait]
impl MessagingPort for WebMessagingAdapter {
    async fn send_text_message(&self, user_id: &str, text: &str) -> Result<(), MessagingError> {
        info!("Web chat collecting text response for user={}", user_id);
        self.responses.lock().await.push(OutboundMessage::text(text));
        Ok(())
    }

    /// Browsers get the voice content as plain text
    async fn send_voice_message(&self, user_id: &str, text: &str) -> Result<(), MessagingError> {
        info!("Web chat collecting voice-as-text response for user={}", user_id);
        self.responses.lock().await.push(OutboundMessage::text(text));
        Ok(())
    }

    async fn send_typing_indicator(&self, message_id: &str) -> Result<(), MessagingError> {
        debug!("Web chat typing indicator for message_id={}", message_id);
        self.typing_indicators.lock().await.push(message_id.to_string());
        Ok(())
    }

    async fn transcribe_voice_message(&self, _media_id: &str) -> Result<String, MessagingError> {
        Err(MessagingError::Unsupported("voice message transcription"))
    }
}
