use thiserror::Error;

/// Failures reported by a messaging transport
#[derive(Debug, Error)]
pub enum MessagingError {
    /// The transport does not offer this capability (e.g. voice on web chat)
    #[error("{0} not supported by this transport")]
    Unsupported(&'static str),

    /// The transport tried and failed
    #[error("transport error: {0}")]
    Transport(String),
}

impl MessagingError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, MessagingError::Unsupported(_))
    }
}
