// Shared fakes for pipeline integration tests
#![allow(dead_code)]

use anyhow::Result;
use assistant_gateway::{
    Brain, BrainPayload, BrainResult, InMemoryUserState, MessagePipeline, MessagingError,
    MessagingPort, PipelineSettings, ServiceContainer,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One call observed by the recording transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text(String),
    Voice(String),
    Typing(String),
}

/// Transport that records every call, with switchable failure modes
#[derive(Default)]
pub struct RecordingMessaging {
    sent: Mutex<Vec<Sent>>,
    pub fail_text: AtomicBool,
    pub fail_typing: AtomicBool,
    pub voice_unsupported: AtomicBool,
    pub transcript: Mutex<Option<String>>,
}

impl RecordingMessaging {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn voices(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Voice(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl MessagingPort for RecordingMessaging {
    async fn send_text_message(&self, _user_id: &str, text: &str) -> Result<(), MessagingError> {
        if self.fail_text.load(Ordering::SeqCst) {
            return Err(MessagingError::Transport("connection reset".to_string()));
        }
        self.sent.lock().unwrap().push(Sent::Text(text.to_string()));
        Ok(())
    }

    async fn send_voice_message(&self, _user_id: &str, text: &str) -> Result<(), MessagingError> {
        if self.voice_unsupported.load(Ordering::SeqCst) {
            return Err(MessagingError::Unsupported("voice messages"));
        }
        self.sent.lock().unwrap().push(Sent::Voice(text.to_string()));
        Ok(())
    }

    async fn send_typing_indicator(&self, message_id: &str) -> Result<(), MessagingError> {
        if self.fail_typing.load(Ordering::SeqCst) {
            return Err(MessagingError::Transport("typing endpoint down".to_string()));
        }
        self.sent.lock().unwrap().push(Sent::Typing(message_id.to_string()));
        Ok(())
    }

    async fn transcribe_voice_message(&self, _media_id: &str) -> Result<String, MessagingError> {
        self.transcript
            .lock()
            .unwrap()
            .clone()
            .ok_or(MessagingError::Unsupported("voice message transcription"))
    }
}

/// Backend driven by a closure
pub struct FnBrain<F>(pub F);

impl<F> Brain for FnBrain<F>
where
    F: Fn(BrainPayload) -> Result<BrainResult> + Send + Sync,
{
    fn invoke(&self, payload: BrainPayload) -> Result<BrainResult> {
        (self.0)(payload)
    }
}

pub fn brain<F>(f: F) -> Arc<dyn Brain>
where
    F: Fn(BrainPayload) -> Result<BrainResult> + Send + Sync + 'static,
{
    Arc::new(FnBrain(f))
}

pub fn quiet_settings() -> PipelineSettings {
    PipelineSettings {
        progress_messages_enabled: false,
        log_pseudonym_secret: "test-secret".to_string(),
        ..Default::default()
    }
}

pub struct Harness {
    pub pipeline: MessagePipeline,
    pub messaging: Arc<RecordingMessaging>,
    pub state: Arc<InMemoryUserState>,
    pub services: ServiceContainer,
}

impl Harness {
    pub fn new(settings: PipelineSettings, brain: Arc<dyn Brain>) -> Self {
        let messaging = RecordingMessaging::new();
        let state = Arc::new(InMemoryUserState::new());
        let services = ServiceContainer::new(messaging.clone(), state.clone(), brain);
        Self {
            pipeline: MessagePipeline::new(settings),
            messaging,
            state,
            services,
        }
    }
}
