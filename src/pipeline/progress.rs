use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::ports::MessagingPort;
use crate::status::ProgressMessage;

/// Sends advisory progress notices to the user.
///
/// Never fails: a disabled notifier, an empty message and transport
/// errors all end in a no-op. Rate limiting is left to the caller
/// (see [`ProgressReporter::report_throttled`]).
pub struct ProgressNotifier {
    messaging: Arc<dyn MessagingPort>,
    user_id: String,
    enabled: bool,
}

impl ProgressNotifier {
    pub fn new(messaging: Arc<dyn MessagingPort>, user_id: impl Into<String>, enabled: bool) -> Self {
        Self {
            messaging,
            user_id: user_id.into(),
            enabled,
        }
    }

    pub async fn notify(&self, message: &ProgressMessage) {
        if !self.enabled {
            return;
        }
        if message.is_empty() {
            debug!("Empty progress message text, skipping send");
            return;
        }
        if let Err(e) = self.messaging.send_text_message(&self.user_id, &message.text).await {
            warn!("Failed to send progress message: {}", e);
        }
    }
}

/// Handle the backend uses to emit progress from its blocking thread.
///
/// Messages travel over a channel to the async side, which owns the
/// [`ProgressNotifier`]. Reporting never blocks.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: mpsc::UnboundedSender<ProgressMessage>,
    throttle: Duration,
    last_sent: Arc<Mutex<Option<Instant>>>,
}

impl ProgressReporter {
    pub fn channel(throttle: Duration) -> (Self, mpsc::UnboundedReceiver<ProgressMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let reporter = Self {
            tx,
            throttle,
            last_sent: Arc::new(Mutex::new(None)),
        };
        (reporter, rx)
    }

    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    /// Queue `message` unconditionally. Returns `false` once the run that
    /// owns the receiving side has finished.
    pub fn report(&self, message: ProgressMessage) -> bool {
        let queued = self.tx.send(message).is_ok();
        if queued {
            *self.last_sent.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        }
        queued
    }

    /// Queue `message` unless one went out less than `throttle` ago.
    pub fn report_throttled(&self, message: ProgressMessage) -> bool {
        {
            let mut last = self.last_sent.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(at) = *last {
                if at.elapsed() < self.throttle {
                    debug!("Progress message throttled");
                    return false;
                }
            }
            if self.tx.send(message).is_err() {
                return false;
            }
            *last = Some(Instant::now());
        }
        true
    }
}
