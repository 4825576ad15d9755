//! `AuthRecords` module.

use std::sync::{Arc, OnceLock};

use auth_records_sdk::{AuthRecordBackendV1, AuthRecordsClientV1};
use signature_patch::{ModuleRegistry, SignaturePatcher};
use tracing::{info, warn};

use crate::config::AuthRecordsConfig;
use crate::domain::{AuthRecordsLocalClient, Service};

/// What the host process hands the module at init.
pub struct ModuleDeps {
    /// Backing store plugin.
    pub backend: Arc<dyn AuthRecordBackendV1>,
    /// Registry through which the webhook library resolves its signature
    /// verifier. `None` skips patching.
    pub module_registry: Option<Arc<ModuleRegistry>>,
}

/// `AuthRecords` gateway module.
///
/// This module:
/// 1. Wraps the backing store plugin in the domain service
/// 2. Hands out `Arc<dyn AuthRecordsClientV1>` to webhook handlers
/// 3. Installs the signature verification patcher once per process
#[derive(Default)]
pub struct AuthRecordsModule {
    service: OnceLock<Arc<Service>>,
    patcher: OnceLock<Arc<SignaturePatcher>>,
}

impl AuthRecordsModule {
    pub const MODULE_NAME: &'static str = "auth-records";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns an error if the module is already initialized or the config is invalid.
    #[tracing::instrument(skip_all, fields(patcher_enabled = cfg.patcher.enabled))]
    pub async fn init(
        &self,
        cfg: &AuthRecordsConfig,
        deps: ModuleDeps,
    ) -> anyhow::Result<Arc<dyn AuthRecordsClientV1>> {
        info!("Initializing {} module", Self::MODULE_NAME);
        cfg.validate()?;

        let svc = Arc::new(Service::new(deps.backend));
        self.service
            .set(svc.clone())
            .map_err(|_| anyhow::anyhow!("{} module already initialized", Self::MODULE_NAME))?;

        match svc.is_configured().await {
            Ok(status) if !status.configured => {
                warn!("Auth record backing store reports it is not configured");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Auth record backing store configuration probe failed"),
        }

        match deps.module_registry {
            Some(registry) if cfg.patcher.enabled => {
                let patcher = Arc::new(SignaturePatcher::new(registry, cfg.patcher.clone()));
                let installation = patcher.install();
                info!(
                    outcome = ?installation.immediate.outcome,
                    delay_ms = cfg.patcher.delay_ms,
                    "Signature verification patcher installed"
                );
                // The delayed pass is detached; its handle is not awaited.
                drop(installation.delayed);
                self.patcher.set(patcher).map_err(|_| {
                    anyhow::anyhow!("{} patcher already installed", Self::MODULE_NAME)
                })?;
            }
            Some(_) => info!("Signature verification patcher disabled"),
            None => info!("No module registry supplied; skipping signature verification patcher"),
        }

        let api: Arc<dyn AuthRecordsClientV1> = Arc::new(AuthRecordsLocalClient::new(svc));
        info!("{} module initialized successfully", Self::MODULE_NAME);

        Ok(api)
    }

    /// The installed patcher, if any.
    #[must_use]
    pub fn patcher(&self) -> Option<Arc<SignaturePatcher>> {
        self.patcher.get().cloned()
    }
}
