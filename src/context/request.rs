use std::future::Future;
use tracing::Instrument;

tokio::task_local! {
    static REQUEST_CONTEXT: RequestContext;
}

/// Correlation data for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub correlation_id: Option<String>,
    pub client_ip: Option<String>,
    /// Pseudonymized user id (never the raw id)
    pub log_user_id: Option<String>,
}

impl RequestContext {
    pub fn new(
        correlation_id: Option<String>,
        client_ip: Option<String>,
        log_user_id: Option<String>,
    ) -> Self {
        Self {
            correlation_id,
            client_ip,
            log_user_id,
        }
    }

    /// Context bound to the calling task, if any
    pub fn current() -> Option<RequestContext> {
        REQUEST_CONTEXT.try_with(Clone::clone).ok()
    }

    /// Run `fut` with this context bound and its span entered.
    ///
    /// The previous binding (if any) is visible again once `fut` completes
    /// or is dropped.
    pub async fn scope<F>(self, fut: F) -> F::Output
    where
        F: Future,
    {
        let span = self.span();
        REQUEST_CONTEXT.scope(self, fut.instrument(span)).await
    }

    /// Synchronous counterpart of [`scope`](Self::scope) for code running
    /// on a blocking thread.
    pub fn sync_scope<R>(self, f: impl FnOnce() -> R) -> R {
        REQUEST_CONTEXT.sync_scope(self, f)
    }

    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            correlation_id = self.correlation_id.as_deref().unwrap_or("-"),
            client_ip = self.client_ip.as_deref().unwrap_or("-"),
            user = self.log_user_id.as_deref().unwrap_or("-"),
        )
    }
}
