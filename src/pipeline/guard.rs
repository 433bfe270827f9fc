use anyhow::Result;
use std::future::Future;
use std::time::Instant;
use tracing::{error, info};

use super::processing::ProcessingContext;
use crate::status::{self, StatusKey};

/// Logs the elapsed time of a run when dropped.
///
/// Dropping happens exactly once per run: on completion, after fallback
/// handling, or when the run is cancelled mid-flight.
struct Finalizer {
    log_user_id: String,
    start_time: Instant,
}

impl Drop for Finalizer {
    fn drop(&mut self) {
        info!(
            "Message processing completed for user={} in {:.2}s",
            self.log_user_id,
            self.start_time.elapsed().as_secs_f64()
        );
    }
}

/// Outcome of a guarded run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    FailedWithFallback,
}

/// Run `body`, turning any error into one fallback message to the user.
///
/// Errors never escape. Cancellation is not an error here: if the
/// returned future is dropped, no fallback is sent, and only the
/// finalizer runs.
pub(crate) async fn run_guarded<F>(ctx: &ProcessingContext, body: F) -> RunOutcome
where
    F: Future<Output = Result<()>>,
{
    let finalizer = Finalizer {
        log_user_id: ctx.log_user_id.clone(),
        start_time: ctx.start_time,
    };

    let outcome = match body.await {
        Ok(()) => RunOutcome::Completed,
        Err(e) => {
            error!(
                "Unhandled error during message processing; sending fallback to user: {:?}",
                e
            );
            send_fallback(ctx).await;
            RunOutcome::FailedWithFallback
        }
    };

    drop(finalizer);
    outcome
}

/// Best effort; a failure here is logged and never escalates.
async fn send_fallback(ctx: &ProcessingContext) {
    let language = match ctx.user_state.response_language(ctx.user_id()).await {
        Ok(language) => language,
        Err(e) => {
            error!("Failed to read response language for fallback: {:?}", e);
            None
        }
    };
    let text = status::status_text(StatusKey::ProcessingError, language.as_deref());

    if let Err(e) = ctx.messaging.send_text_message(ctx.user_id(), &text).await {
        error!("Failed to send fallback message: {}", e);
    }
}
