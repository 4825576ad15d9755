//! Domain errors for the auth-records module.

use auth_records_sdk::AuthRecordsError;

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("auth record not found")]
    NotFound,

    #[error(transparent)]
    Backend(AuthRecordsError),
}

impl From<AuthRecordsError> for DomainError {
    fn from(e: AuthRecordsError) -> Self {
        match e {
            AuthRecordsError::NotFound => Self::NotFound,
            other => Self::Backend(other),
        }
    }
}

impl From<DomainError> for AuthRecordsError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => Self::NotFound,
            DomainError::Backend(inner) => inner,
        }
    }
}
