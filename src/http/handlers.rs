use super::state::AppState;
use crate::adapters::WebMessagingAdapter;
use crate::pipeline::{OutboundKind, OutboundMessage};
use crate::ports::InboundMessage;
use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message text (must not be empty)
    pub message: String,

    /// Stable user identifier; a fresh one is generated when omitted
    #[serde(default = "new_user_id")]
    pub user_id: String,

    /// Optional session identifier for grouping conversations
    #[serde(default)]
    pub session_id: Option<String>,
}

fn new_user_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: OutboundKind,
}

impl From<OutboundMessage> for ChatMessageResponse {
    fn from(message: OutboundMessage) -> Self {
        Self {
            content: message.content,
            kind: message.kind,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub user_id: String,
    pub message_id: String,
    pub responses: Vec<ChatMessageResponse>,
    pub processing_time_seconds: f64,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/chat
/// Run one message through the pipeline and return the collected replies
pub async fn chat(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    if req.message.trim().is_empty() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "message must not be empty");
    }

    let start_time = Instant::now();
    let message_id = uuid::Uuid::new_v4().to_string();
    let client_ip = connect_info.map(|ConnectInfo(addr)| addr.ip().to_string());

    info!(
        "Web chat request received: message_id={}, session={:?}",
        message_id, req.session_id
    );

    let web_adapter = Arc::new(WebMessagingAdapter::new());
    let services = state.services.with_messaging(web_adapter.clone());
    let message = InboundMessage::text(req.user_id.clone(), message_id.clone(), req.message);

    // The pipeline answers its own failures; only the timeout is ours
    let run = state.pipeline.process_message(
        message,
        &services,
        Some(message_id.clone()),
        client_ip,
    );
    if tokio::time::timeout(state.request_timeout, run).await.is_err() {
        error!(
            "Web chat processing timed out: message_id={}, after {:?}",
            message_id, state.request_timeout
        );
        return error_response(StatusCode::GATEWAY_TIMEOUT, "Timed out processing chat message");
    }

    let responses: Vec<ChatMessageResponse> = web_adapter
        .responses()
        .await
        .into_iter()
        .map(ChatMessageResponse::from)
        .collect();
    let processing_time = start_time.elapsed().as_secs_f64();

    info!(
        "Web chat response sent: message_id={}, responses={}, time={:.2}s",
        message_id,
        responses.len(),
        processing_time
    );

    (
        StatusCode::OK,
        Json(ChatResponse {
            user_id: req.user_id,
            message_id,
            responses,
            processing_time_seconds: (processing_time * 1000.0).round() / 1000.0,
            session_id: req.session_id,
        }),
    )
        .into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "healthy" })))
}
