//! `AuthRecords` SDK
//!
//! This crate provides the public API for the `auth-records` module:
//!
//! - [`AuthRecordsClientV1`] — Consumer API trait used by webhook handlers to resolve callers
//! - [`AuthRecordBackendV1`] — Plugin API trait for backing store adapters
//! - [`AuthRecord`], [`ReadinessStatus`], [`ConfigurationStatus`] — Domain models
//! - [`canonicalize`], [`insecure_form`] — Endpoint identity scheme helpers
//! - [`AuthRecordsError`] — Error types
//!
//! # Usage
//!
//! ```rust,ignore
//! use auth_records_sdk::AuthRecordsClientV1;
//!
//! async fn resolve(client: &dyn AuthRecordsClientV1, api_url: &str) {
//!     // Lookups tolerate `http://` and `https://` variants of the same URL.
//!     if let Some(record) = client.get(api_url).await.unwrap() {
//!         assert!(record.api_url.starts_with("https://"));
//!     }
//! }
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod canonical;
pub mod error;
pub mod models;
pub mod plugin_api;

// Re-export main types at crate root
pub use api::AuthRecordsClientV1;
pub use canonical::{canonicalize, insecure_form, INSECURE_SCHEME, SECURE_SCHEME};
pub use error::AuthRecordsError;
pub use models::{AuthRecord, ConfigurationStatus, ReadinessStatus};
pub use plugin_api::AuthRecordBackendV1;
