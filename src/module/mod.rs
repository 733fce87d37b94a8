//! Module system
//!
//! A module is a self-contained unit that claims a URL prefix (its domain),
//! names the modules it depends on and handles the requests routed to it.
//!
//! ## Layout
//!
//! - **traits**: the [`Module`] contract and [`ModuleError`]
//! - **registry**: directory discovery, manifests and dependency admission
//! - **directory**: modules built from discovered directories
//! - **handlers**: handler kinds that execute manifest actions
//! - **inline**: closure-backed modules compiled into the application
//! - **validation**: manifest checks applied during discovery

pub mod directory;
pub mod handlers;
pub mod inline;
pub mod registry;
pub mod traits;
pub mod validation;

pub use directory::DirectoryModule;
pub use handlers::{ActionHandler, HandlerRegistry};
pub use inline::InlineModule;
pub use registry::{
    DependencyResolution, ExcludedModule, ModuleDependencies, ModuleDiscovery, ModuleManifest,
    ModuleSet,
};
pub use traits::{Module, ModuleError, ModuleMetadata};
