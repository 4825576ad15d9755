use thiserror::Error;

/// Errors that can occur during auth record operations.
#[derive(Debug, Error)]
pub enum AuthRecordsError {
    #[error("auth record not found")]
    NotFound,

    #[error("backing store error: {0}")]
    Backend(String),
}

impl AuthRecordsError {
    #[must_use]
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
