//! Per-user message processing pipeline
//!
//! Flow for one inbound message:
//! 1. Acquire the user's lock (runs for one user never overlap)
//! 2. Bind the request context (correlation id, client address, pseudonym)
//! 3. Typing indicator, transcription for voice notes
//! 4. Backend call on the blocking pool, relaying progress notices
//! 5. Compose and deliver the responses, record the chat turn
//!
//! Any failure in 3-5 is answered with a single fallback message.

mod bridge;
mod compose;
mod guard;
mod locks;
mod processing;
mod processor;
mod progress;

pub use bridge::invoke_blocking;
pub use compose::{
    attach_indicator, full_response_text, language_indicator, plan_responses, LanguageState,
    OutboundKind, OutboundMessage, ResponsePlan,
};
pub use guard::RunOutcome;
pub use locks::UserLockRegistry;
pub use processor::MessagePipeline;
pub use progress::{ProgressNotifier, ProgressReporter};
