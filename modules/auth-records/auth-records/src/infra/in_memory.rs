use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use auth_records_sdk::{AuthRecord, AuthRecordBackendV1, AuthRecordsError};

/// In-memory backing store.
///
/// Keys on the exact `api_url` with no scheme handling, like any opaque
/// store. Records keep insertion order; `set` on an existing key replaces
/// in place. Exposes neither probe.
#[derive(Default)]
pub struct InMemoryAuthRecordBackend {
    records: Mutex<Vec<AuthRecord>>,
}

fn lock_records(
    mutex: &Mutex<Vec<AuthRecord>>,
) -> Result<MutexGuard<'_, Vec<AuthRecord>>, AuthRecordsError> {
    mutex
        .lock()
        .map_err(|e| AuthRecordsError::backend(format!("lock poisoned: {e}")))
}

impl InMemoryAuthRecordBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store without any URL rewriting.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = AuthRecord>) -> Self {
        Self {
            records: Mutex::new(records.into_iter().collect()),
        }
    }

    /// Get the stored URLs, as stored (for testing/inspection).
    pub fn stored_urls(&self) -> Vec<String> {
        lock_records(&self.records)
            .map(|r| r.iter().map(|rec| rec.api_url.clone()).collect())
            .unwrap_or_default()
    }

    /// Get the number of stored records.
    pub fn count(&self) -> usize {
        lock_records(&self.records).map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AuthRecordBackendV1 for InMemoryAuthRecordBackend {
    async fn get(&self, api_url: &str) -> Result<Option<AuthRecord>, AuthRecordsError> {
        let records = lock_records(&self.records)?;
        Ok(records.iter().find(|r| r.api_url == api_url).cloned())
    }

    async fn set(&self, record: AuthRecord) -> Result<(), AuthRecordsError> {
        let mut records = lock_records(&self.records)?;
        match records.iter_mut().find(|r| r.api_url == record.api_url) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        Ok(())
    }

    async fn delete(&self, api_url: &str) -> Result<(), AuthRecordsError> {
        let mut records = lock_records(&self.records)?;
        records.retain(|r| r.api_url != api_url);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<AuthRecord>, AuthRecordsError> {
        Ok(lock_records(&self.records)?.clone())
    }
}
