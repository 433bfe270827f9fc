use std::sync::Arc;
use std::time::Instant;

use crate::config::PipelineSettings;
use crate::context::{log_safe_user_id, RequestContext};
use crate::ports::{Brain, InboundMessage, MessagingPort, ServiceContainer, UserStatePort};

/// State for a single pipeline run; never shared between runs
pub(crate) struct ProcessingContext {
    pub message: InboundMessage,
    pub messaging: Arc<dyn MessagingPort>,
    pub user_state: Arc<dyn UserStatePort>,
    pub brain: Arc<dyn Brain>,
    pub settings: Arc<PipelineSettings>,
    pub log_user_id: String,
    pub start_time: Instant,
    pub correlation_id: Option<String>,
    pub client_ip: Option<String>,
}

impl ProcessingContext {
    pub fn new(
        message: InboundMessage,
        services: &ServiceContainer,
        settings: Arc<PipelineSettings>,
        correlation_id: Option<String>,
        client_ip: Option<String>,
    ) -> Self {
        let log_user_id = log_safe_user_id(&message.user_id, &settings.log_pseudonym_secret);
        Self {
            message,
            messaging: Arc::clone(&services.messaging),
            user_state: Arc::clone(&services.user_state),
            brain: Arc::clone(&services.brain),
            settings,
            log_user_id,
            start_time: Instant::now(),
            correlation_id,
            client_ip,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.message.user_id
    }

    pub fn request_context(&self) -> RequestContext {
        RequestContext::new(
            self.correlation_id.clone(),
            self.client_ip.clone(),
            Some(self.log_user_id.clone()),
        )
    }
}
