//! Locates the library's verification function and replaces it.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PatcherConfig;
use crate::error::PatchError;
use crate::registry::{ExportRoute, ModuleRegistry};
use crate::verifier::{AcceptAllVerifier, SignatureVerifier};

/// Which of the two scans a report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Immediate,
    Delayed,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => f.write_str("immediate"),
            Self::Delayed => f.write_str("delayed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// At least one target holds the override after this pass.
    Patched,
    /// No candidate module exposes the function.
    NotFound,
    /// The scan hit a registry error and stopped early.
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatcherState {
    Unattempted,
    Scanning(Pass),
    Finished(Pass, PassOutcome),
}

/// A function binding on one loaded module instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatchTarget {
    pub module_instance: u64,
    pub module_path: String,
    pub route: ExportRoute,
    pub function: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub pass: Pass,
    pub outcome: PassOutcome,
    /// Targets rebound during this pass.
    pub patched: Vec<PatchTarget>,
    /// Matches skipped because an earlier pass already rebound them.
    pub already_patched: usize,
}

/// Handle returned by [`SignaturePatcher::install`].
pub struct Installation {
    pub immediate: PassReport,
    pub delayed: JoinHandle<PassReport>,
}

/// Replaces the library's signature verifier with [`AcceptAllVerifier`].
///
/// Every rebound target is remembered; later passes skip it.
pub struct SignaturePatcher {
    registry: Arc<ModuleRegistry>,
    config: PatcherConfig,
    replacement: Arc<dyn SignatureVerifier>,
    patched: Mutex<HashSet<PatchTarget>>,
    state: Mutex<PatcherState>,
}

impl SignaturePatcher {
    #[must_use]
    pub fn new(registry: Arc<ModuleRegistry>, config: PatcherConfig) -> Self {
        Self {
            registry,
            config,
            replacement: Arc::new(AcceptAllVerifier),
            patched: Mutex::new(HashSet::new()),
            state: Mutex::new(PatcherState::Unattempted),
        }
    }

    #[must_use]
    pub fn state(&self) -> PatcherState {
        self.state
            .lock()
            .map_or(PatcherState::Unattempted, |state| *state)
    }

    /// Every target rebound so far.
    #[must_use]
    pub fn patched_targets(&self) -> Vec<PatchTarget> {
        self.patched
            .lock()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Runs the immediate pass and schedules the delayed one.
    ///
    /// Must be called inside a tokio runtime. The delayed task is detached
    /// and runs whether or not the handle is awaited.
    pub fn install(self: &Arc<Self>) -> Installation {
        let immediate = self.run_pass(Pass::Immediate);
        let patcher = Arc::clone(self);
        let delay = self.config.delay();
        let delayed = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            patcher.run_pass(Pass::Delayed)
        });
        Installation { immediate, delayed }
    }

    /// Scans the registry once. Never fails; errors are logged and the
    /// report is marked [`PassOutcome::Aborted`].
    pub fn run_pass(&self, pass: Pass) -> PassReport {
        self.set_state(PatcherState::Scanning(pass));

        let mut report = PassReport {
            pass,
            outcome: PassOutcome::NotFound,
            patched: Vec::new(),
            already_patched: 0,
        };

        match self.scan(&mut report) {
            Ok(()) if report.patched.is_empty() && report.already_patched == 0 => {
                warn!(
                    pass = %pass,
                    function = %self.config.function_name,
                    "Signature verification function not found; \
                     library may support the hook natively"
                );
            }
            Ok(()) => {
                report.outcome = PassOutcome::Patched;
                info!(
                    pass = %pass,
                    patched = report.patched.len(),
                    already_patched = report.already_patched,
                    "Signature verification patch pass complete"
                );
            }
            Err(e) => {
                report.outcome = PassOutcome::Aborted;
                debug!(pass = %pass, error = %e, "Signature verification patch pass failed");
            }
        }

        self.set_state(PatcherState::Finished(pass, report.outcome));
        report
    }

    fn scan(&self, report: &mut PassReport) -> Result<(), PatchError> {
        let name = self.config.function_name.as_str();

        for module in self.registry.modules()? {
            if !self.config.is_candidate(module.path()) {
                continue;
            }

            for route in [ExportRoute::Direct, ExportRoute::Default] {
                let Some(surface) = module.surface(route) else {
                    continue;
                };
                let Some(current) = surface.get(module.path(), name)? else {
                    continue;
                };

                let target = PatchTarget {
                    module_instance: module.instance_id(),
                    module_path: module.path().to_owned(),
                    route,
                    function: name.to_owned(),
                };
                if current.is_override() || self.is_patched(&target)? {
                    report.already_patched += 1;
                    continue;
                }

                surface.bind(module.path(), name, Arc::clone(&self.replacement))?;
                self.mark_patched(target.clone())?;
                report.patched.push(target);
                info!(
                    module = %module.path(),
                    instance = module.instance_id(),
                    route = %route,
                    count = report.patched.len(),
                    "Patched signature verification function"
                );
            }
        }

        Ok(())
    }

    fn is_patched(&self, target: &PatchTarget) -> Result<bool, PatchError> {
        let patched = self
            .patched
            .lock()
            .map_err(|e| PatchError::RegistryPoisoned(format!("patched set: {e}")))?;
        Ok(patched.contains(target))
    }

    fn mark_patched(&self, target: PatchTarget) -> Result<(), PatchError> {
        self.patched
            .lock()
            .map_err(|e| PatchError::RegistryPoisoned(format!("patched set: {e}")))?
            .insert(target);
        Ok(())
    }

    fn set_state(&self, next: PatcherState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::registry::LoadedModule;

    #[test]
    fn test_state_transitions() {
        let registry = Arc::new(ModuleRegistry::new());
        let patcher = SignaturePatcher::new(registry, PatcherConfig::default());
        assert_eq!(patcher.state(), PatcherState::Unattempted);

        let report = patcher.run_pass(Pass::Immediate);
        assert_eq!(report.outcome, PassOutcome::NotFound);
        assert_eq!(
            patcher.state(),
            PatcherState::Finished(Pass::Immediate, PassOutcome::NotFound)
        );
    }

    #[test]
    fn test_existing_override_counts_as_already_patched() {
        let registry = Arc::new(ModuleRegistry::new());
        registry
            .register(
                LoadedModule::new("node_modules/app-sdk/verify-signature.js")
                    .with_export("verifySignatureWithJwks", Arc::new(AcceptAllVerifier)),
            )
            .unwrap();
        let patcher = SignaturePatcher::new(registry, PatcherConfig::default());

        let report = patcher.run_pass(Pass::Immediate);
        assert_eq!(report.outcome, PassOutcome::Patched);
        assert!(report.patched.is_empty());
        assert_eq!(report.already_patched, 1);
    }
}
