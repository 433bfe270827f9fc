use anyhow::Result;
use tracing::info;

use crate::ports::{Brain, BrainPayload, BrainResult};

/// Stand-in backend for local runs: answers with the query itself
#[derive(Debug, Default, Clone)]
pub struct EchoBrain;

impl Brain for EchoBrain {
    fn invoke(&self, payload: BrainPayload) -> Result<BrainResult> {
        info!(
            "Echo backend answering query ({} prior turns)",
            payload.user_chat_history.len()
        );
        Ok(BrainResult {
            translated_responses: vec![payload.user_query],
            response_language: payload.user_response_language,
            ..Default::default()
        })
    }
}
