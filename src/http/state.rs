use crate::pipeline::MessagePipeline;
use crate::ports::ServiceContainer;
use std::time::Duration;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Pipeline (and its per-user lock registry) shared by every request
    pub pipeline: MessagePipeline,

    /// User state and backend; messaging is swapped per request
    pub services: ServiceContainer,

    /// Caller-side bound on a single chat request
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(pipeline: MessagePipeline, services: ServiceContainer, request_timeout: Duration) -> Self {
        Self {
            pipeline,
            services,
            request_timeout,
        }
    }
}
