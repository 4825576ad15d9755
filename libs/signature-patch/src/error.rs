use thiserror::Error;

/// Errors raised while scanning or mutating the module registry.
///
/// These never leave [`crate::SignaturePatcher`]; they surface only as
/// diagnostics.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("module registry lock poisoned: {0}")]
    RegistryPoisoned(String),

    #[error("export surface lock poisoned for module '{module}'")]
    ExportsPoisoned { module: String },

    #[error("invalid patcher configuration: {0}")]
    InvalidConfig(String),
}

/// Errors returned by a [`crate::SignatureVerifier`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("signature rejected: {0}")]
    Rejected(String),
}
