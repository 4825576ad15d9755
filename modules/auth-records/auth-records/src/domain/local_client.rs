//! Local (in-process) client for the auth-records module.

use std::sync::Arc;

use async_trait::async_trait;
use auth_records_sdk::{
    AuthRecord, AuthRecordsClientV1, AuthRecordsError, ConfigurationStatus, ReadinessStatus,
};

use super::{DomainError, Service};

/// Local client wrapping the auth-records service.
///
/// Handed out by the module during `init()`.
pub struct AuthRecordsLocalClient {
    svc: Arc<Service>,
}

impl AuthRecordsLocalClient {
    /// Creates a new local client wrapping the given service.
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> AuthRecordsError {
    match &e {
        DomainError::NotFound => {
            tracing::debug!(operation = op, "auth record not found");
        }
        DomainError::Backend(_) => {
            tracing::error!(operation = op, error = ?e, "auth-records call failed");
        }
    }
    e.into()
}

#[async_trait]
impl AuthRecordsClientV1 for AuthRecordsLocalClient {
    async fn get(&self, api_url: &str) -> Result<Option<AuthRecord>, AuthRecordsError> {
        self.svc
            .get(api_url)
            .await
            .map_err(|e| log_and_convert("get", e))
    }

    async fn set(&self, record: AuthRecord) -> Result<(), AuthRecordsError> {
        self.svc
            .set(record)
            .await
            .map_err(|e| log_and_convert("set", e))
    }

    async fn delete(&self, api_url: &str) -> Result<(), AuthRecordsError> {
        self.svc
            .delete(api_url)
            .await
            .map_err(|e| log_and_convert("delete", e))
    }

    async fn get_all(&self) -> Result<Vec<AuthRecord>, AuthRecordsError> {
        self.svc
            .get_all()
            .await
            .map_err(|e| log_and_convert("get_all", e))
    }

    async fn is_ready(&self) -> Result<ReadinessStatus, AuthRecordsError> {
        self.svc
            .is_ready()
            .await
            .map_err(|e| log_and_convert("is_ready", e))
    }

    async fn is_configured(&self) -> Result<ConfigurationStatus, AuthRecordsError> {
        self.svc
            .is_configured()
            .await
            .map_err(|e| log_and_convert("is_configured", e))
    }
}
