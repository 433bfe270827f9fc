//! Collaborator contracts consumed by the message pipeline
//!
//! - `MessagingPort` - channel transport (text, voice, typing, transcription)
//! - `UserStatePort` - per-user preferences and chat history
//! - `Brain` - the blocking reasoning backend

mod brain;
mod messaging;
mod user_state;

use std::sync::Arc;

pub use brain::{AgenticStrength, Brain, BrainPayload, BrainResult, Preference};
pub use messaging::{InboundMessage, MessageKind, MessagingPort};
pub use user_state::{ChatTurn, UserStatePort};

/// Collaborators handed to a single pipeline run
#[derive(Clone)]
pub struct ServiceContainer {
    pub messaging: Arc<dyn MessagingPort>,
    pub user_state: Arc<dyn UserStatePort>,
    pub brain: Arc<dyn Brain>,
}

impl ServiceContainer {
    pub fn new(
        messaging: Arc<dyn MessagingPort>,
        user_state: Arc<dyn UserStatePort>,
        brain: Arc<dyn Brain>,
    ) -> Self {
        Self {
            messaging,
            user_state,
            brain,
        }
    }

    /// Same state and backend, different transport
    pub fn with_messaging(&self, messaging: Arc<dyn MessagingPort>) -> Self {
        Self {
            messaging,
            user_state: Arc::clone(&self.user_state),
            brain: Arc::clone(&self.brain),
        }
    }
}
