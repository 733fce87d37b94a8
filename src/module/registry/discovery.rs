//! Module discovery
//!
//! Scans module directories and builds one module per subdirectory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::module::directory::DirectoryModule;
use crate::module::handlers::HandlerRegistry;
use crate::module::registry::manifest::{ModuleManifest, MANIFEST_FILE};
use crate::module::registry::set::ModuleSet;
use crate::module::traits::Module;
use crate::module::validation::{ManifestValidator, ValidationResult};

/// Module discovery scanner
pub struct ModuleDiscovery {
    handlers: Arc<HandlerRegistry>,
    manifest_file: String,
    validator: ManifestValidator,
}

impl ModuleDiscovery {
    /// Create a new module discovery scanner
    pub fn new(handlers: Arc<HandlerRegistry>) -> Self {
        Self {
            handlers,
            manifest_file: MANIFEST_FILE.to_string(),
            validator: ManifestValidator::new(),
        }
    }

    /// Use a different manifest file name
    pub fn with_manifest_file(mut self, manifest_file: impl Into<String>) -> Self {
        self.manifest_file = manifest_file.into();
        self
    }

    /// Discover modules across several source directories
    ///
    /// Directories are scanned in order and merged last-write-wins, so a
    /// later directory overrides same-named modules of an earlier one.
    pub fn discover<P: AsRef<Path>>(&self, source_dirs: &[P]) -> ModuleSet {
        let mut modules = ModuleSet::new();
        for dir in source_dirs {
            for module in self.scan_dir(dir.as_ref()) {
                if let Some(previous) = modules.insert(module) {
                    debug!(
                        "Module {} from {:?} overridden by a later source",
                        previous.name(),
                        previous.metadata().directory
                    );
                }
            }
        }
        info!("Discovered {} modules", modules.len());
        modules
    }

    /// Scan a single directory
    ///
    /// A missing or unreadable directory contributes no modules.
    pub fn scan_dir(&self, dir: &Path) -> Vec<Arc<dyn Module>> {
        debug!("Discovering modules in {:?}", dir);

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read modules directory {:?}: {}", dir, e);
                return Vec::new();
            }
        };

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    warn!("Failed to read directory entry in {:?}: {}", dir, e);
                    None
                }
            })
            .filter(|path| path.is_dir() && !is_hidden(path))
            .collect();
        // Lexical order keeps the scan deterministic across filesystems
        candidates.sort();

        candidates
            .into_iter()
            .filter_map(|path| self.load_module(&path))
            .collect()
    }

    /// Build the module for one directory
    ///
    /// None only when the manifest cannot be read or parsed, or the directory
    /// name is not valid UTF-8.
    pub fn load_module(&self, path: &Path) -> Option<Arc<dyn Module>> {
        let manifest = match ModuleManifest::load_from_dir(path, &self.manifest_file) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!("Failed to parse manifest in {:?}: {}", path, e);
                return None;
            }
        };

        // Validation is advisory: every parseable directory yields a module
        if let ValidationResult::Invalid(errors) = self.validator.validate(&manifest) {
            warn!(
                "Module {} in {:?} has manifest issues: {:?}",
                manifest.name, path, errors
            );
        }

        debug!("Loaded module {} from {:?}", manifest.name, path);
        Some(Arc::new(DirectoryModule::new(
            manifest,
            path,
            Arc::clone(&self.handlers),
        )))
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(true)
}
