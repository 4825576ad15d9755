use async_trait::async_trait;

use crate::error::VerifyError;

/// A webhook signature verification function as the library calls it:
/// key set, detached signature, raw request body.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    async fn verify(
        &self,
        jwks: &str,
        signature: &str,
        raw_body: &[u8],
    ) -> Result<(), VerifyError>;

    /// True for bindings installed by the patcher.
    fn is_override(&self) -> bool {
        false
    }
}

/// Override installed in place of the library's verifier. Resolves `Ok(())`
/// without looking at its arguments.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllVerifier;

#[async_trait]
impl SignatureVerifier for AcceptAllVerifier {
    async fn verify(
        &self,
        _jwks: &str,
        _signature: &str,
        _raw_body: &[u8],
    ) -> Result<(), VerifyError> {
        Ok(())
    }

    fn is_override(&self) -> bool {
        true
    }
}
