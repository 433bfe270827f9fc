// Integration tests for the per-user message pipeline
//
// These tests drive MessagePipeline end to end with a recording transport,
// an in-memory user state store and closure-backed backends.

mod common;

use anyhow::Result;
use assistant_gateway::{
    AgenticStrength, BrainResult, InboundMessage, ProgressMessage, RequestContext, RunOutcome,
    UserStatePort,
};
use common::{brain, quiet_settings, Harness, Sent};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

fn fallback_en() -> String {
    assistant_gateway::status::status_text(assistant_gateway::StatusKey::ProcessingError, Some("en"))
}

#[tokio::test]
async fn test_text_fragments_sent_in_order() -> Result<()> {
    let h = Harness::new(quiet_settings(), brain(|_| Ok(BrainResult::text(["a", "b"]))));

    let outcome = h
        .pipeline
        .process_message(InboundMessage::text("u1", "m1", "hi"), &h.services, None, None)
        .await;

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(h.messaging.texts(), vec!["a".to_string(), "b".to_string()]);
    assert!(h.messaging.voices().is_empty());

    let history = h.state.chat_history("u1").await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].user_message, "hi");
    assert_eq!(history[0].assistant_response, "a\n\nb");

    // Default language resolved and remembered, no indicator
    assert_eq!(h.state.last_response_language("u1").await?.as_deref(), Some("en"));
    Ok(())
}

#[tokio::test]
async fn test_typing_indicator_precedes_responses() -> Result<()> {
    let h = Harness::new(quiet_settings(), brain(|_| Ok(BrainResult::text(["ok"]))));

    h.pipeline
        .process_message(InboundMessage::text("u1", "m42", "hi"), &h.services, None, None)
        .await;

    assert_eq!(
        h.messaging.sent(),
        vec![Sent::Typing("m42".to_string()), Sent::Text("ok".to_string())]
    );
    Ok(())
}

#[tokio::test]
async fn test_voice_in_voice_out_sends_no_text() -> Result<()> {
    let h = Harness::new(
        quiet_settings(),
        brain(|payload| {
            assert_eq!(payload.user_query, "what is grace");
            Ok(BrainResult {
                translated_responses: vec!["grace is a gift".to_string()],
                send_voice_message: true,
                ..Default::default()
            })
        }),
    );
    *h.messaging.transcript.lock().unwrap() = Some("what is grace".to_string());

    let outcome = h
        .pipeline
        .process_message(InboundMessage::audio("u1", "m1", "media-1"), &h.services, None, None)
        .await;

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(h.messaging.voices(), vec!["grace is a gift".to_string()]);
    assert!(h.messaging.texts().is_empty());

    // History keeps the transcribed query
    let history = h.state.chat_history("u1").await?;
    assert_eq!(history[0].user_message, "what is grace");
    Ok(())
}

#[tokio::test]
async fn test_blank_voice_text_keeps_text_reply() -> Result<()> {
    let h = Harness::new(
        quiet_settings(),
        brain(|_| {
            Ok(BrainResult {
                translated_responses: vec!["answer".to_string()],
                voice_message_text: Some(String::new()),
                ..Default::default()
            })
        }),
    );
    *h.messaging.transcript.lock().unwrap() = Some("question".to_string());

    let outcome = h
        .pipeline
        .process_message(InboundMessage::audio("u1", "m1", "media-1"), &h.services, None, None)
        .await;

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(h.messaging.voices(), vec!["answer".to_string()]);
    assert_eq!(h.messaging.texts(), vec!["answer".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_audio_history_records_transcript() -> Result<()> {
    let h = Harness::new(quiet_settings(), brain(|_| Ok(BrainResult::text(["it is sunny"]))));
    *h.messaging.transcript.lock().unwrap() = Some("how is the weather".to_string());

    let message = InboundMessage::audio("u1", "m1", "media-1");
    assert!(message.text.is_empty());
    h.pipeline.process_message(message, &h.services, None, None).await;

    let history = h.state.chat_history("u1").await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].user_message, "how is the weather");
    assert_eq!(history[0].assistant_response, "it is sunny");
    Ok(())
}

#[tokio::test]
async fn test_unbounded_progress_interval_does_not_abort_run() -> Result<()> {
    let mut settings = quiet_settings();
    settings.progress_message_min_interval_secs = f64::INFINITY;
    let h = Harness::new(settings, brain(|_| Ok(BrainResult::text(["still here"]))));

    let handle = tokio::spawn(async move {
        let outcome = h
            .pipeline
            .process_message(InboundMessage::text("u1", "m1", "hi"), &h.services, None, None)
            .await;
        (outcome, h.messaging.texts())
    });

    let (outcome, texts) = handle.await?;
    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(texts, vec!["still here".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_transcription_notice_when_progress_enabled() -> Result<()> {
    let mut settings = quiet_settings();
    settings.progress_messages_enabled = true;
    let h = Harness::new(settings, brain(|_| Ok(BrainResult::text(["reply"]))));
    h.messaging.voice_unsupported.store(true, Ordering::SeqCst);
    *h.messaging.transcript.lock().unwrap() = Some("hello".to_string());

    h.pipeline
        .process_message(InboundMessage::audio("u1", "m1", "media-1"), &h.services, None, None)
        .await;

    let texts = h.messaging.texts();
    // Transcription notice, then the voice packaging notice; the voice send
    // itself is unsupported and absorbed
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("voice message"));
    assert!(texts[1].contains("voice reply"));
    Ok(())
}

#[tokio::test]
async fn test_unsupported_voice_still_sends_text() -> Result<()> {
    let h = Harness::new(
        quiet_settings(),
        brain(|_| {
            Ok(BrainResult {
                translated_responses: vec!["text answer".to_string()],
                send_voice_message: true,
                voice_message_text: Some("spoken answer".to_string()),
                ..Default::default()
            })
        }),
    );
    h.messaging.voice_unsupported.store(true, Ordering::SeqCst);

    let outcome = h
        .pipeline
        .process_message(InboundMessage::text("u1", "m1", "hi"), &h.services, None, None)
        .await;

    assert_eq!(outcome, RunOutcome::Completed);
    assert!(h.messaging.voices().is_empty());
    assert_eq!(h.messaging.texts(), vec!["text answer".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_language_indicator_on_language_switch() -> Result<()> {
    let h = Harness::new(
        quiet_settings(),
        brain(|_| {
            Ok(BrainResult {
                translated_responses: vec!["un".to_string(), "deux".to_string()],
                response_language: Some("fr".to_string()),
                ..Default::default()
            })
        }),
    );
    h.state.set_last_response_language("u1", "en").await?;

    h.pipeline
        .process_message(InboundMessage::text("u1", "m1", "bonjour"), &h.services, None, None)
        .await;

    let texts = h.messaging.texts();
    assert_eq!(texts[0], "un");
    assert_eq!(texts[1], "deux\n\n_Response language: fr_");
    assert_eq!(h.state.last_response_language("u1").await?.as_deref(), Some("fr"));

    // Same language again: no indicator
    h.pipeline
        .process_message(InboundMessage::text("u1", "m2", "encore"), &h.services, None, None)
        .await;
    let texts = h.messaging.texts();
    assert_eq!(texts[3], "deux");

    // History keeps the plain text, without indicator
    let history = h.state.chat_history("u1").await?;
    assert_eq!(history[0].assistant_response, "un\n\ndeux");
    Ok(())
}

#[tokio::test]
async fn test_backend_failure_sends_single_fallback() -> Result<()> {
    let h = Harness::new(quiet_settings(), brain(|_| anyhow::bail!("vector store unavailable")));

    let outcome = h
        .pipeline
        .process_message(InboundMessage::text("u1", "m1", "hi"), &h.services, None, None)
        .await;

    assert_eq!(outcome, RunOutcome::FailedWithFallback);
    assert_eq!(h.messaging.texts(), vec![fallback_en()]);
    // Failed exchanges are not recorded
    assert!(h.state.chat_history("u1").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_backend_panic_sends_fallback() -> Result<()> {
    let h = Harness::new(quiet_settings(), brain(|_| panic!("backend bug")));

    let outcome = h
        .pipeline
        .process_message(InboundMessage::text("u1", "m1", "hi"), &h.services, None, None)
        .await;

    assert_eq!(outcome, RunOutcome::FailedWithFallback);
    assert_eq!(h.messaging.texts(), vec![fallback_en()]);
    Ok(())
}

#[tokio::test]
async fn test_fallback_is_localized() -> Result<()> {
    let h = Harness::new(quiet_settings(), brain(|_| anyhow::bail!("boom")));
    h.state.set_response_language("u1", Some("es")).await;

    h.pipeline
        .process_message(InboundMessage::text("u1", "m1", "hola"), &h.services, None, None)
        .await;

    let texts = h.messaging.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("Lo siento"));
    Ok(())
}

#[tokio::test]
async fn test_text_delivery_failure_is_contained() -> Result<()> {
    let h = Harness::new(quiet_settings(), brain(|_| Ok(BrainResult::text(["a"]))));
    h.messaging.fail_text.store(true, Ordering::SeqCst);

    let outcome = h
        .pipeline
        .process_message(InboundMessage::text("u1", "m1", "hi"), &h.services, None, None)
        .await;

    // Fallback was attempted through the same broken transport and swallowed
    assert_eq!(outcome, RunOutcome::FailedWithFallback);
    assert!(h.messaging.texts().is_empty());
    assert!(h.state.chat_history("u1").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_typing_indicator_failure_is_not_fatal() -> Result<()> {
    let h = Harness::new(quiet_settings(), brain(|_| Ok(BrainResult::text(["fine"]))));
    h.messaging.fail_typing.store(true, Ordering::SeqCst);

    let outcome = h
        .pipeline
        .process_message(InboundMessage::text("u1", "m1", "hi"), &h.services, None, None)
        .await;

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(h.messaging.texts(), vec!["fine".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_transcription_failure_sends_fallback() -> Result<()> {
    let h = Harness::new(quiet_settings(), brain(|_| Ok(BrainResult::text(["never"]))));

    let outcome = h
        .pipeline
        .process_message(InboundMessage::audio("u1", "m1", "media-1"), &h.services, None, None)
        .await;

    assert_eq!(outcome, RunOutcome::FailedWithFallback);
    assert_eq!(h.messaging.texts(), vec![fallback_en()]);
    Ok(())
}

#[tokio::test]
async fn test_backend_progress_is_relayed() -> Result<()> {
    let mut settings = quiet_settings();
    settings.progress_messages_enabled = true;
    let h = Harness::new(
        settings,
        brain(|payload| {
            assert!(payload.progress_enabled);
            payload.progress.report(ProgressMessage::new("Searching resources..."));
            payload.progress.report(ProgressMessage::new(""));
            Ok(BrainResult::text(["done"]))
        }),
    );

    h.pipeline
        .process_message(InboundMessage::text("u1", "m1", "hi"), &h.services, None, None)
        .await;

    assert_eq!(
        h.messaging.texts(),
        vec!["Searching resources...".to_string(), "done".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn test_progress_disabled_is_silent() -> Result<()> {
    let h = Harness::new(
        quiet_settings(),
        brain(|payload| {
            payload.progress.report(ProgressMessage::new("Searching resources..."));
            Ok(BrainResult::text(["done"]))
        }),
    );

    h.pipeline
        .process_message(InboundMessage::text("u1", "m1", "hi"), &h.services, None, None)
        .await;

    assert_eq!(h.messaging.texts(), vec!["done".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_progress_failure_is_not_fatal() -> Result<()> {
    let mut settings = quiet_settings();
    settings.progress_messages_enabled = true;
    let h = Harness::new(
        settings,
        brain(|payload| {
            payload.progress.report(ProgressMessage::new("working"));
            Ok(BrainResult::default())
        }),
    );
    h.messaging.fail_text.store(true, Ordering::SeqCst);

    let outcome = h
        .pipeline
        .process_message(InboundMessage::text("u1", "m1", "hi"), &h.services, None, None)
        .await;

    // Only the progress send failed; with no fragments there is nothing else to send
    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(h.state.chat_history("u1").await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_preferences_forwarded_with_override_marker() -> Result<()> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_brain = Arc::clone(&seen);
    let h = Harness::new(
        quiet_settings(),
        brain(move |payload| {
            seen_in_brain.lock().unwrap().push((
                payload.agentic_strength.clone(),
                payload.dev_agentic_mcp.clone(),
                payload.user_chat_history.len(),
            ));
            Ok(BrainResult::text(["ok"]))
        }),
    );

    h.pipeline
        .process_message(InboundMessage::text("u1", "m1", "one"), &h.services, None, None)
        .await;
    h.state.set_agentic_strength("u1", Some(AgenticStrength::High)).await;
    h.pipeline
        .process_message(InboundMessage::text("u1", "m2", "two"), &h.services, None, None)
        .await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0.effective, AgenticStrength::Low);
    assert_eq!(seen[0].0.user_override, None);
    assert!(!seen[0].1.effective);
    assert_eq!(seen[0].2, 0);

    assert_eq!(seen[1].0.effective, AgenticStrength::High);
    assert_eq!(seen[1].0.user_override, Some(AgenticStrength::High));
    assert_eq!(seen[1].2, 1);
    Ok(())
}

#[tokio::test]
async fn test_context_visible_inside_backend() -> Result<()> {
    let seen = Arc::new(Mutex::new(None));
    let seen_in_brain = Arc::clone(&seen);
    let h = Harness::new(
        quiet_settings(),
        brain(move |_| {
            *seen_in_brain.lock().unwrap() = RequestContext::current();
            Ok(BrainResult::text(["ok"]))
        }),
    );

    h.pipeline
        .process_message(
            InboundMessage::text("alice", "m1", "hi"),
            &h.services,
            Some("corr-1".to_string()),
            Some("10.0.0.7".to_string()),
        )
        .await;

    let ctx = seen.lock().unwrap().clone().expect("context bound in backend");
    assert_eq!(ctx.correlation_id.as_deref(), Some("corr-1"));
    assert_eq!(ctx.client_ip.as_deref(), Some("10.0.0.7"));
    assert_eq!(
        ctx.log_user_id,
        Some(assistant_gateway::log_safe_user_id("alice", "test-secret"))
    );

    // Nothing leaks past the run
    assert!(RequestContext::current().is_none());
    Ok(())
}
