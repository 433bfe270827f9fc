pub mod adapters;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod ports;
pub mod status;

pub use adapters::{EchoBrain, InMemoryUserState, WebMessagingAdapter};
pub use config::{Config, PipelineSettings};
pub use context::{log_safe_user_id, RequestContext};
pub use error::MessagingError;
pub use http::{create_router, AppState};
pub use pipeline::{MessagePipeline, OutboundKind, OutboundMessage, ProgressReporter, RunOutcome, UserLockRegistry};
pub use ports::{
    AgenticStrength, Brain, BrainPayload, BrainResult, ChatTurn, InboundMessage, MessageKind,
    MessagingPort, Preference, ServiceContainer, UserStatePort,
};
pub use status::{ProgressMessage, StatusKey};
