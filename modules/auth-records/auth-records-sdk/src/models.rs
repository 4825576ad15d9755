use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canonical::canonicalize;

/// Credentials the host platform issued to this app for one API endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRecord {
    /// Application identifier assigned by the host platform.
    pub app_id: String,
    /// Endpoint identity: the host's API URL.
    pub api_url: String,
    /// Bearer token for calls back into the host.
    pub token: String,
    /// Key set used to verify inbound webhook signatures.
    pub jwks: String,
}

impl AuthRecord {
    #[must_use]
    pub fn new(
        app_id: impl Into<String>,
        api_url: impl Into<String>,
        token: impl Into<String>,
        jwks: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            api_url: api_url.into(),
            token: token.into(),
            jwks: jwks.into(),
        }
    }

    /// Returns the record with its `api_url` in canonical form.
    #[must_use]
    pub fn into_canonical(mut self) -> Self {
        if let Cow::Owned(url) = canonicalize(&self.api_url) {
            self.api_url = url;
        }
        self
    }
}

impl fmt::Debug for AuthRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRecord")
            .field("app_id", &self.app_id)
            .field("api_url", &self.api_url)
            .field("token", &"[REDACTED]")
            .field("jwks", &self.jwks)
            .finish()
    }
}

/// Result of a backing store readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessStatus {
    pub ready: bool,
}

impl ReadinessStatus {
    pub const READY: Self = Self { ready: true };
}

/// Result of a backing store configuration probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationStatus {
    pub configured: bool,
}

impl ConfigurationStatus {
    pub const CONFIGURED: Self = Self { configured: true };
}
