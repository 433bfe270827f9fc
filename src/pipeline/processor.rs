use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::bridge;
use super::compose;
use super::guard::{self, RunOutcome};
use super::locks::UserLockRegistry;
use super::processing::ProcessingContext;
use super::progress::{ProgressNotifier, ProgressReporter};
use crate::config::PipelineSettings;
use crate::ports::{BrainPayload, BrainResult, InboundMessage, Preference, ServiceContainer};
use crate::status::{self, StatusKey};

/// Per-user serialized message processing
///
/// Cheap to clone; clones share one lock registry, so every entry point
/// in a process should hold a clone of the same pipeline.
#[derive(Clone)]
pub struct MessagePipeline {
    locks: UserLockRegistry,
    settings: Arc<PipelineSettings>,
}

impl MessagePipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        Self {
            locks: UserLockRegistry::new(),
            settings: Arc::new(settings),
        }
    }

    pub fn locks(&self) -> &UserLockRegistry {
        &self.locks
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Process one message and deliver the responses through
    /// `services.messaging`.
    ///
    /// Runs for the same user are serialized in lock-acquisition order.
    /// Failures are answered with a fallback message and never returned.
    /// Dropping the future releases the user's lock without a fallback.
    pub async fn process_message(
        &self,
        message: InboundMessage,
        services: &ServiceContainer,
        correlation_id: Option<String>,
        client_ip: Option<String>,
    ) -> RunOutcome {
        let _user_lock = self.locks.acquire(&message.user_id).await;

        let ctx = ProcessingContext::new(
            message,
            services,
            Arc::clone(&self.settings),
            correlation_id,
            client_ip,
        );
        let request = ctx.request_context();

        request
            .scope(guard::run_guarded(&ctx, process_with_brain(&ctx)))
            .await
    }
}

async fn process_with_brain(ctx: &ProcessingContext) -> Result<()> {
    info!(
        "Processing {:?} message {} for user={}",
        ctx.message.kind, ctx.message.message_id, ctx.log_user_id
    );

    send_typing_indicator(ctx).await;

    let notifier = ProgressNotifier::new(
        Arc::clone(&ctx.messaging),
        ctx.user_id(),
        ctx.settings.progress_messages_enabled,
    );

    let user_query = resolve_user_text(ctx, &notifier).await?;
    let result = invoke_brain(ctx, &user_query, &notifier).await?;
    let full_response_text = compose::deliver_responses(ctx, &result, &notifier).await?;

    ctx.user_state
        .append_chat_history(ctx.user_id(), &user_query, &full_response_text)
        .await
        .context("Failed to append chat history")?;

    Ok(())
}

async fn send_typing_indicator(ctx: &ProcessingContext) {
    match ctx.messaging.send_typing_indicator(&ctx.message.message_id).await {
        Ok(()) => {}
        Err(e) if e.is_unsupported() => {}
        Err(e) => warn!("Failed to send typing indicator: {}", e),
    }
}

async fn resolve_user_text(ctx: &ProcessingContext, notifier: &ProgressNotifier) -> Result<String> {
    if !ctx.message.is_audio() {
        return Ok(ctx.message.text.clone());
    }

    let language = ctx.user_state.response_language(ctx.user_id()).await?;
    notifier
        .notify(&status::progress_message(StatusKey::TranscribingVoice, language.as_deref()))
        .await;

    let text = ctx
        .messaging
        .transcribe_voice_message(&ctx.message.media_id)
        .await
        .context("Failed to transcribe voice message")?;
    debug!("Transcribed voice message ({} chars)", text.len());
    Ok(text)
}

async fn invoke_brain(
    ctx: &ProcessingContext,
    user_query: &str,
    notifier: &ProgressNotifier,
) -> Result<BrainResult> {
    let user_id = ctx.user_id();
    let settings = &ctx.settings;

    let agentic_strength = Preference::resolve(
        ctx.user_state.agentic_strength(user_id).await?,
        settings.agentic_strength,
    );
    let dev_agentic_mcp = Preference::resolve(
        ctx.user_state.dev_agentic_mcp(user_id).await?,
        settings.dev_agentic_mcp,
    );

    let (progress, progress_rx) = ProgressReporter::channel(settings.progress_throttle());

    let payload = BrainPayload {
        user_id: user_id.to_string(),
        user_query: user_query.to_string(),
        user_chat_history: ctx.user_state.chat_history(user_id).await?,
        user_response_language: ctx.user_state.response_language(user_id).await?,
        agentic_strength,
        dev_agentic_mcp,
        perf_trace_id: ctx.message.message_id.clone(),
        progress_enabled: settings.progress_messages_enabled,
        progress_throttle: settings.progress_throttle(),
        progress,
    };

    debug!(
        "Invoking backend (agentic_strength={}, override={})",
        payload.agentic_strength.effective,
        payload.agentic_strength.is_overridden()
    );

    bridge::invoke_with_progress(Arc::clone(&ctx.brain), payload, progress_rx, notifier).await
}
