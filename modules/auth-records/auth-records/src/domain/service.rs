//! Domain service for the auth-records module.
//!
//! Holds no state of its own: every call is forwarded to the backing store
//! with the API URL rewritten at the boundary.

use std::sync::Arc;

use auth_records_sdk::{
    canonicalize, insecure_form, AuthRecord, AuthRecordBackendV1, ConfigurationStatus,
    ReadinessStatus,
};
use futures::future;
use tracing::{debug, warn};

use super::error::DomainError;

/// `AuthRecords` domain service.
pub struct Service {
    backend: Arc<dyn AuthRecordBackendV1>,
}

impl Service {
    #[must_use]
    pub fn new(backend: Arc<dyn AuthRecordBackendV1>) -> Self {
        Self { backend }
    }

    /// Resolves the record for `api_url`.
    ///
    /// Tries the `https://` form, then the `http://` form, then `api_url`
    /// exactly as given, stopping at the first hit. The returned record
    /// always carries the canonical URL.
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` if the backing store fails.
    #[tracing::instrument(skip_all, fields(api_url = %api_url))]
    pub async fn get(&self, api_url: &str) -> Result<Option<AuthRecord>, DomainError> {
        let canonical = canonicalize(api_url);
        let insecure = insecure_form(api_url);

        for candidate in [&*canonical, &*insecure, api_url] {
            if let Some(record) = self.backend.get(candidate).await? {
                debug!(candidate, "Resolved auth record");
                return Ok(Some(record.into_canonical()));
            }
        }

        warn!(api_url, "No auth record found for API URL");
        Ok(None)
    }

    /// Stores `record` under its canonical URL.
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` if the backing store fails.
    #[tracing::instrument(skip_all, fields(api_url = %record.api_url))]
    pub async fn set(&self, record: AuthRecord) -> Result<(), DomainError> {
        self.backend.set(record.into_canonical()).await?;
        Ok(())
    }

    /// Deletes the canonical and the as-given entry concurrently.
    ///
    /// Both deletes run to completion. Individual failures, including a
    /// missing entry, are logged and do not fail the call.
    ///
    /// # Errors
    ///
    /// Currently always returns `Ok`.
    #[tracing::instrument(skip_all, fields(api_url = %api_url))]
    pub async fn delete(&self, api_url: &str) -> Result<(), DomainError> {
        let canonical = canonicalize(api_url);

        let (canonical_res, given_res) = future::join(
            self.backend.delete(&canonical),
            self.backend.delete(api_url),
        )
        .await;

        for (url, result) in [(&*canonical, canonical_res), (api_url, given_res)] {
            if let Err(e) = result {
                warn!(url, error = %e, "Auth record delete did not complete");
            }
        }

        Ok(())
    }

    /// Lists all records with canonical URLs, in backend order.
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` if the backing store fails.
    #[tracing::instrument(skip_all)]
    pub async fn get_all(&self) -> Result<Vec<AuthRecord>, DomainError> {
        let records = self.backend.get_all().await?;
        Ok(records.into_iter().map(AuthRecord::into_canonical).collect())
    }

    /// # Errors
    ///
    /// Returns a `DomainError` if the backend's own probe fails.
    pub async fn is_ready(&self) -> Result<ReadinessStatus, DomainError> {
        Ok(self
            .backend
            .readiness_probe()
            .await?
            .unwrap_or(ReadinessStatus::READY))
    }

    /// # Errors
    ///
    /// Returns a `DomainError` if the backend's own probe fails.
    pub async fn is_configured(&self) -> Result<ConfigurationStatus, DomainError> {
        Ok(self
            .backend
            .configuration_probe()
            .await?
            .unwrap_or(ConfigurationStatus::CONFIGURED))
    }
}
