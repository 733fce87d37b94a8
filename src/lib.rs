//! modrouter - modular request dispatch core
//!
//! Discovers modules from directories on disk, admits only those whose
//! dependencies are present, and routes each request to the first module
//! whose URL prefix (domain) matches and which produces a response. When no
//! module answers, a fallback builder synthesizes a JSON error response, so
//! every dispatch yields a response.
//!
//! ## Layers
//!
//! 1. **module**: the [`Module`] contract, discovery, manifests, dependency admission
//! 2. **router**: prefix routing, request-local module stack, fallback responses
//! 3. **instrumentation**: dispatch timings and counters
//! 4. **config** / **utils**: configuration and logging setup
//!
//! ## Example
//!
//! ```rust,no_run
//! use modrouter::{DispatchConfig, HandlerRegistry, Request, Router};
//!
//! let config = DispatchConfig::default();
//! let router = Router::from_config(&config, HandlerRegistry::with_builtins());
//! let response = router.dispatch(&mut Request::new("GET", "/shop/items"));
//! println!("{} {}", response.status(), response.body_text());
//! ```

pub mod config;
pub mod http;
pub mod instrumentation;
pub mod module;
pub mod router;
pub mod utils;

pub use config::{DispatchConfig, InstrumentationConfig, LoggingConfig, ModuleConfig};
pub use http::{Request, Response};
pub use instrumentation::{DispatchProfiler, NoopSink, OperationStats, StatSink, StatTimer};
pub use module::{
    DependencyResolution, DirectoryModule, ExcludedModule, HandlerRegistry, InlineModule, Module,
    ModuleDependencies, ModuleDiscovery, ModuleError, ModuleMetadata, ModuleSet,
};
pub use router::{DispatchContext, DispatchOutcome, FailedFilter, FilterLog, FilterManager, Router};
