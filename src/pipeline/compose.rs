use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::processing::ProcessingContext;
use super::progress::ProgressNotifier;
use crate::ports::{BrainResult, MessageKind};
use crate::status::{self, StatusKey};

/// Separator between response fragments in the persisted full text
const FRAGMENT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboundKind {
    Text,
    Voice,
}

/// One message ready for the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: OutboundKind,
}

impl OutboundMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: OutboundKind::Text,
        }
    }

    pub fn voice(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: OutboundKind::Voice,
        }
    }
}

/// What to send for one backend result, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePlan {
    /// Fragments joined for chat history
    pub full_response_text: String,
    /// At most one voice message, followed by the text fragments
    pub messages: Vec<OutboundMessage>,
    /// Language to remember as the user's last response language
    pub response_language: Option<String>,
}

/// User-side inputs the plan depends on
#[derive(Debug, Clone, Default)]
pub struct LanguageState<'a> {
    /// Stored response-language preference
    pub preferred: Option<&'a str>,
    /// Language of the previous response
    pub previous: Option<&'a str>,
    /// Language that never gets an indicator
    pub default_language: &'a str,
}

pub fn full_response_text(responses: &[String]) -> String {
    responses.join(FRAGMENT_SEPARATOR).trim_end().to_string()
}

/// Annotation disclosing a switch to a non-default response language.
///
/// Empty unless `response` is known, differs from `default_language` and
/// differs from `previous`.
pub fn language_indicator(
    previous: Option<&str>,
    response: Option<&str>,
    default_language: &str,
) -> String {
    let Some(response) = response.filter(|lang| !lang.is_empty()) else {
        return String::new();
    };
    if response == default_language || previous == Some(response) {
        return String::new();
    }
    format!("\n\n_Response language: {}_", response)
}

/// Append `indicator` to the last fragment only
pub fn attach_indicator(responses: &[String], indicator: &str) -> Vec<String> {
    let mut output = responses.to_vec();
    if indicator.is_empty() {
        return output;
    }
    if let Some(last) = output.last_mut() {
        last.push_str(indicator);
    }
    output
}

/// Backend-declared language, else the stored preference, else the default
fn resolve_response_language(result: &BrainResult, languages: &LanguageState<'_>) -> String {
    result
        .declared_language()
        .or(languages.preferred.filter(|lang| !lang.is_empty()))
        .unwrap_or(languages.default_language)
        .to_string()
}

/// Decide the outbound messages for `result`.
pub fn plan_responses(
    result: &BrainResult,
    inbound: MessageKind,
    languages: &LanguageState<'_>,
) -> ResponsePlan {
    let responses = &result.translated_responses;
    let full_text = full_response_text(responses);
    let voice_in = inbound == MessageKind::Audio;
    let send_voice = result.send_voice_message || voice_in;
    let voice_text = result.explicit_voice_text();

    let mut messages = Vec::new();
    if send_voice {
        let voice_payload = voice_text.unwrap_or(&full_text);
        if !voice_payload.is_empty() {
            messages.push(OutboundMessage::voice(voice_payload));
        }
    }

    // Pure voice-in/voice-out exchanges carry no separate text
    let should_send_text = !(send_voice && result.voice_message_text.is_none() && voice_in);

    let mut response_language = None;
    if should_send_text && !responses.is_empty() {
        let language = resolve_response_language(result, languages);
        let indicator = language_indicator(
            languages.previous,
            Some(language.as_str()),
            languages.default_language,
        );
        messages.extend(
            attach_indicator(responses, &indicator)
                .into_iter()
                .map(OutboundMessage::text),
        );
        response_language = Some(language);
    }

    ResponsePlan {
        full_response_text: full_text,
        messages,
        response_language,
    }
}

/// Send everything for `result` and return the full response text.
///
/// Voice failures are logged and absorbed; a failed text send aborts the
/// delivery with an error.
pub(crate) async fn deliver_responses(
    ctx: &ProcessingContext,
    result: &BrainResult,
    notifier: &ProgressNotifier,
) -> Result<String> {
    let user_id = ctx.user_id();
    let preferred = ctx.user_state.response_language(user_id).await?;
    let previous = ctx.user_state.last_response_language(user_id).await?;
    let languages = LanguageState {
        preferred: preferred.as_deref(),
        previous: previous.as_deref(),
        default_language: &ctx.settings.default_language,
    };
    let plan = plan_responses(result, ctx.message.kind, &languages);

    for message in &plan.messages {
        match message.kind {
            OutboundKind::Voice => {
                let language = result.declared_language().or(preferred.as_deref());
                notifier
                    .notify(&status::progress_message(StatusKey::PackagingVoiceResponse, language))
                    .await;
                match ctx.messaging.send_voice_message(user_id, &message.content).await {
                    Ok(()) => {}
                    Err(e) if e.is_unsupported() => {
                        debug!("Voice messages not supported by this transport");
                    }
                    Err(e) => warn!("Failed to send voice message: {}", e),
                }
            }
            OutboundKind::Text => {
                info!("Response from assistant: {}", message.content);
                if let Err(e) = ctx.messaging.send_text_message(user_id, &message.content).await {
                    error!("Failed to send text message: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    if let Some(language) = &plan.response_language {
        ctx.user_state
            .set_last_response_language(user_id, language)
            .await?;
    }

    Ok(plan.full_response_text)
}
