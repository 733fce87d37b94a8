//! Module registry and discovery
//!
//! Handles module discovery, manifest parsing, and dependency admission.

pub mod dependencies;
pub mod discovery;
pub mod manifest;
pub mod set;

pub use dependencies::{DependencyResolution, ExcludedModule, ModuleDependencies};
pub use discovery::ModuleDiscovery;
pub use manifest::{ActionManifest, ModuleManifest, MANIFEST_FILE};
pub use set::ModuleSet;
