use async_trait::async_trait;

use crate::error::AuthRecordsError;
use crate::models::{AuthRecord, ConfigurationStatus, ReadinessStatus};

/// Backing store adapter trait implemented by auth record storage plugins.
///
/// Plugins store records under the exact `api_url` they are given. Scheme
/// handling is the gateway's responsibility.
#[async_trait]
pub trait AuthRecordBackendV1: Send + Sync {
    /// Looks up a record by exact `api_url`.
    async fn get(&self, api_url: &str) -> Result<Option<AuthRecord>, AuthRecordsError>;

    /// Inserts or replaces the record stored under `record.api_url`.
    async fn set(&self, record: AuthRecord) -> Result<(), AuthRecordsError>;

    /// Removes the record stored under `api_url`, if any.
    async fn delete(&self, api_url: &str) -> Result<(), AuthRecordsError>;

    /// Returns every stored record in backend order.
    async fn get_all(&self) -> Result<Vec<AuthRecord>, AuthRecordsError>;

    /// Readiness probe. `Ok(None)` means the backend does not expose one.
    async fn readiness_probe(&self) -> Result<Option<ReadinessStatus>, AuthRecordsError> {
        Ok(None)
    }

    /// Configuration probe. `Ok(None)` means the backend does not expose one.
    async fn configuration_probe(&self) -> Result<Option<ConfigurationStatus>, AuthRecordsError> {
        Ok(None)
    }
}
