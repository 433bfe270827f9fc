//! HTTP API for the web chat front end
//!
//! - POST /api/chat - Process one message and return the assistant's replies
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{ChatMessageResponse, ChatRequest, ChatResponse};
pub use routes::create_router;
pub use state::AppState;
