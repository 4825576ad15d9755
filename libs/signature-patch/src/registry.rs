//! In-process registry of loaded library modules.
//!
//! Libraries that want a replaceable verifier register their modules here
//! and resolve the function through [`LoadedModule::resolve`] on every call,
//! so a binding swapped by the patcher takes effect on the next request.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::PatchError;
use crate::verifier::SignatureVerifier;

/// Where a function was found on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportRoute {
    Direct,
    Default,
}

impl fmt::Display for ExportRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// Named function bindings exported by a module. Bindings are mutable.
#[derive(Default)]
pub struct ExportSurface {
    functions: RwLock<HashMap<String, Arc<dyn SignatureVerifier>>>,
}

impl ExportSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `PatchError::ExportsPoisoned` if a writer panicked while holding the lock.
    pub fn get(
        &self,
        module: &str,
        name: &str,
    ) -> Result<Option<Arc<dyn SignatureVerifier>>, PatchError> {
        let functions = self.functions.read().map_err(|_| PatchError::ExportsPoisoned {
            module: module.to_owned(),
        })?;
        Ok(functions.get(name).cloned())
    }

    /// Rebinds `name`, returning the previous binding.
    ///
    /// # Errors
    ///
    /// Returns `PatchError::ExportsPoisoned` if a writer panicked while holding the lock.
    pub fn bind(
        &self,
        module: &str,
        name: &str,
        function: Arc<dyn SignatureVerifier>,
    ) -> Result<Option<Arc<dyn SignatureVerifier>>, PatchError> {
        let mut functions = self.functions.write().map_err(|_| PatchError::ExportsPoisoned {
            module: module.to_owned(),
        })?;
        Ok(functions.insert(name.to_owned(), function))
    }

    fn insert(&mut self, name: String, function: Arc<dyn SignatureVerifier>) {
        // Exclusive access during construction; a poisoned lock cannot exist yet.
        if let Ok(functions) = self.functions.get_mut() {
            functions.insert(name, function);
        }
    }
}

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// One loaded module: its path plus direct and default export surfaces.
///
/// The same path may be loaded more than once; each load is a distinct
/// instance with its own bindings.
pub struct LoadedModule {
    instance_id: u64,
    path: String,
    exports: ExportSurface,
    default_export: Option<ExportSurface>,
}

impl LoadedModule {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            instance_id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            path: path.into(),
            exports: ExportSurface::new(),
            default_export: None,
        }
    }

    #[must_use]
    pub fn with_export(
        mut self,
        name: impl Into<String>,
        function: Arc<dyn SignatureVerifier>,
    ) -> Self {
        self.exports.insert(name.into(), function);
        self
    }

    #[must_use]
    pub fn with_default_export(
        mut self,
        name: impl Into<String>,
        function: Arc<dyn SignatureVerifier>,
    ) -> Self {
        self.default_export
            .get_or_insert_with(ExportSurface::new)
            .insert(name.into(), function);
        self
    }

    #[must_use]
    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn surface(&self, route: ExportRoute) -> Option<&ExportSurface> {
        match route {
            ExportRoute::Direct => Some(&self.exports),
            ExportRoute::Default => self.default_export.as_ref(),
        }
    }

    /// Looks `name` up on the direct exports, then through the default export.
    ///
    /// # Errors
    ///
    /// Returns `PatchError::ExportsPoisoned` if an export surface lock is poisoned.
    pub fn resolve(&self, name: &str) -> Result<Option<Arc<dyn SignatureVerifier>>, PatchError> {
        for route in [ExportRoute::Direct, ExportRoute::Default] {
            if let Some(surface) = self.surface(route) {
                if let Some(function) = surface.get(&self.path, name)? {
                    return Ok(Some(function));
                }
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("instance_id", &self.instance_id)
            .field("path", &self.path)
            .field("has_default_export", &self.default_export.is_some())
            .finish_non_exhaustive()
    }
}

/// The live set of loaded modules, in load order.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: RwLock<Vec<Arc<LoadedModule>>>,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `PatchError::RegistryPoisoned` if the registry lock is poisoned.
    pub fn register(&self, module: LoadedModule) -> Result<Arc<LoadedModule>, PatchError> {
        let module = Arc::new(module);
        self.modules
            .write()
            .map_err(|e| PatchError::RegistryPoisoned(e.to_string()))?
            .push(Arc::clone(&module));
        Ok(module)
    }

    /// Snapshot of the modules loaded so far.
    ///
    /// # Errors
    ///
    /// Returns `PatchError::RegistryPoisoned` if the registry lock is poisoned.
    pub fn modules(&self) -> Result<Vec<Arc<LoadedModule>>, PatchError> {
        Ok(self
            .modules
            .read()
            .map_err(|e| PatchError::RegistryPoisoned(e.to_string()))?
            .clone())
    }
}
