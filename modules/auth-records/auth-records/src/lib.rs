//! `AuthRecords` Gateway Module
//!
//! Implements the `auth-records` gateway module that:
//! 1. Wraps a pluggable backing store behind `AuthRecordsClientV1`
//! 2. Stores every record under its canonical `https://` API URL
//! 3. Resolves lookups across `https://`, `http://` and as-given URL variants
//! 4. Installs the signature verification patcher at init
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;
pub mod logging;
pub mod module;

pub use config::{AuthRecordsConfig, ConfigError};
pub use domain::{AuthRecordsLocalClient, DomainError, Service};
pub use infra::InMemoryAuthRecordBackend;
pub use module::{AuthRecordsModule, ModuleDeps};
