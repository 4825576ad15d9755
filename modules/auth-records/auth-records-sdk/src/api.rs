use async_trait::async_trait;

use crate::error::AuthRecordsError;
use crate::models::{AuthRecord, ConfigurationStatus, ReadinessStatus};

/// Consumer-facing API trait for auth record operations.
///
/// Obtained from the `auth-records` module as `Arc<dyn AuthRecordsClientV1>`.
/// Every record passed out through this trait carries a canonical
/// (`https://`) `api_url`, whatever scheme the caller used.
#[async_trait]
pub trait AuthRecordsClientV1: Send + Sync {
    /// Resolves the record registered for `api_url`.
    ///
    /// Returns `Ok(None)` if no record exists under any scheme variant,
    /// or `Err` for backing store failures.
    async fn get(&self, api_url: &str) -> Result<Option<AuthRecord>, AuthRecordsError>;

    /// Stores `record` under its canonical `api_url`.
    async fn set(&self, record: AuthRecord) -> Result<(), AuthRecordsError>;

    /// Removes the record for `api_url` in both canonical and given form.
    async fn delete(&self, api_url: &str) -> Result<(), AuthRecordsError>;

    /// Lists every record.
    async fn get_all(&self) -> Result<Vec<AuthRecord>, AuthRecordsError>;

    async fn is_ready(&self) -> Result<ReadinessStatus, AuthRecordsError>;

    async fn is_configured(&self) -> Result<ConfigurationStatus, AuthRecordsError>;
}
