use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, Span};

use super::progress::ProgressNotifier;
use crate::context::RequestContext;
use crate::ports::{Brain, BrainPayload, BrainResult};
use crate::status::ProgressMessage;

/// Run the blocking backend on the blocking pool.
///
/// The caller's request context and tracing span are captured here and
/// re-entered on the worker thread, so backend logs stay attributable.
pub async fn invoke_blocking(brain: Arc<dyn Brain>, payload: BrainPayload) -> Result<BrainResult> {
    let context = RequestContext::current().unwrap_or_default();
    let span = Span::current();

    let handle = tokio::task::spawn_blocking(move || {
        span.in_scope(|| context.sync_scope(|| brain.invoke(payload)))
    });

    match handle.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => {
            error!("Backend invocation panicked: {}", e);
            Err(anyhow!("backend invocation panicked"))
        }
        Err(e) => Err(anyhow!("backend invocation did not complete: {}", e)),
    }
}

/// Invoke the backend while relaying the progress it reports.
///
/// Progress received before the result is sent first; anything still
/// queued when the backend returns is flushed before this returns.
pub async fn invoke_with_progress(
    brain: Arc<dyn Brain>,
    payload: BrainPayload,
    mut progress_rx: mpsc::UnboundedReceiver<ProgressMessage>,
    notifier: &ProgressNotifier,
) -> Result<BrainResult> {
    let invocation = invoke_blocking(brain, payload);
    tokio::pin!(invocation);

    let result = loop {
        tokio::select! {
            biased;
            Some(message) = progress_rx.recv() => notifier.notify(&message).await,
            result = &mut invocation => break result,
        }
    };

    while let Ok(message) = progress_rx.try_recv() {
        notifier.notify(&message).await;
    }

    result
}
