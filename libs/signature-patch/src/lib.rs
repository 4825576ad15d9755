//! Retrofits webhook signature verification into a library that exposes no
//! extension point for it.
//!
//! The library resolves its verification function through a
//! [`ModuleRegistry`] owned by the host process. [`SignaturePatcher`] scans
//! that registry for the known function name and swaps the binding for an
//! override, once immediately and once after a short delay for modules that
//! register late.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod error;
pub mod patcher;
pub mod registry;
pub mod verifier;

pub use config::PatcherConfig;
pub use error::{PatchError, VerifyError};
pub use patcher::{
    Installation, Pass, PassOutcome, PassReport, PatchTarget, PatcherState, SignaturePatcher,
};
pub use registry::{ExportRoute, ExportSurface, LoadedModule, ModuleRegistry};
pub use verifier::{AcceptAllVerifier, SignatureVerifier};
