//! Request routing
//!
//! # Responsibilities
//! - Assign each dispatch a correlation id and time it
//! - Walk the resolved modules in registration order
//! - Invoke every module whose domain prefixes the URL until one answers
//! - Hand unanswered or failed dispatches to the fallback builder
//!
//! # Design Decisions
//! - First module that matches AND returns a response wins
//! - The resolved set is immutable and swapped atomically on reload
//! - The module stack lives in the per-request [`DispatchContext`]

use arc_swap::ArcSwap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, debug_span, info, trace, warn};
use uuid::Uuid;

use crate::config::DispatchConfig;
use crate::http::{Request, Response, DISPATCHING_ID};
use crate::instrumentation::{
    DispatchProfiler, NoopSink, StatSink, StatTimer, DISPATCH_TIME, EXCLUDED_COUNTER,
    FALLBACK_COUNTER, HANDLER_ERROR_COUNTER,
};
use crate::module::{
    ExcludedModule, HandlerRegistry, Module, ModuleDependencies, ModuleDiscovery, ModuleError,
    ModuleSet,
};
use crate::router::context::{DispatchContext, DEFAULT_MAX_DEPTH};
use crate::router::fallback;
use crate::router::filters::FilterManager;
use crate::router::paths;

/// Counter key for dispatches no module answered
pub const UNHANDLED_KEY: &str = "";

/// Result of routing a request before fallback synthesis
#[derive(Debug)]
pub enum DispatchOutcome {
    /// A module produced a response
    Handled { module: String, response: Response },
    /// No matching module produced a response
    Unhandled,
    /// A matching module failed or panicked
    Failed { module: String, error: ModuleError },
}

impl DispatchOutcome {
    /// Turn the outcome into the response returned to the caller
    ///
    /// Counters are keyed by module name, or by the empty string when no
    /// module answered, so their key set stays bounded by the module set.
    pub fn into_response(self, filters: &dyn FilterManager, sink: &dyn StatSink) -> Response {
        match self {
            DispatchOutcome::Handled { response, .. } => {
                fallback::build_safe_response(Some(response), filters)
            }
            DispatchOutcome::Unhandled => {
                sink.increment(FALLBACK_COUNTER, UNHANDLED_KEY);
                fallback::build_safe_response(None, filters)
            }
            DispatchOutcome::Failed { module, error } => {
                sink.increment(HANDLER_ERROR_COUNTER, &module);
                fallback::handler_failure(&module, &error)
            }
        }
    }
}

impl DispatchContext {
    /// Route a request without synthesizing a fallback
    ///
    /// A top-level route starts from clean filter state; nested routes share
    /// the failures recorded by their callers.
    pub fn route(&mut self, request: &mut Request) -> DispatchOutcome {
        if self.stack_level() == 0 {
            self.filters_mut().clear();
        }

        let dispatching_id = Uuid::new_v4().to_string();
        request.set_context(DISPATCHING_ID, dispatching_id.as_str());
        let timer = StatTimer::start(
            Arc::clone(self.sink()),
            DISPATCH_TIME,
            format!("{} {} {}", request.method(), request.url(), dispatching_id),
        );

        let url = paths::normalize_url(request.url());
        let span = debug_span!(
            "dispatch",
            id = %dispatching_id,
            method = %request.method(),
            url = %url,
            depth = self.stack_level()
        );
        let _entered = span.enter();

        let modules = Arc::clone(self.modules());
        let mut outcome = DispatchOutcome::Unhandled;
        for module in modules.iter() {
            if !paths::matches_domain(&url, module.domain()) {
                continue;
            }

            trace!(module = module.name(), "domain matched");
            match self.invoke(module, request) {
                Ok(Some(response)) => {
                    outcome = DispatchOutcome::Handled {
                        module: module.name().to_string(),
                        response,
                    };
                    break;
                }
                Ok(None) => {
                    trace!(module = module.name(), "module declined");
                }
                Err(error) => {
                    warn!("Module {} failed handling {}: {}", module.name(), url, error);
                    outcome = DispatchOutcome::Failed {
                        module: module.name().to_string(),
                        error,
                    };
                    break;
                }
            }
        }

        let elapsed = timer.finish();
        match &outcome {
            DispatchOutcome::Handled { module, response } => debug!(
                module = %module,
                status = response.status(),
                elapsed_us = elapsed.as_micros() as u64,
                "dispatch handled"
            ),
            DispatchOutcome::Unhandled => debug!(
                elapsed_us = elapsed.as_micros() as u64,
                "no module answered, using fallback"
            ),
            DispatchOutcome::Failed { module, .. } => debug!(
                module = %module,
                elapsed_us = elapsed.as_micros() as u64,
                "dispatch failed"
            ),
        }
        outcome
    }
}

/// Resolved module table swapped as one unit
struct RouteTable {
    modules: Arc<ModuleSet>,
    excluded: Vec<ExcludedModule>,
}

/// Dispatcher over a resolved module set
///
/// Shareable across threads: dispatch only reads the current table and
/// keeps all mutable state in a fresh [`DispatchContext`].
pub struct Router {
    table: ArcSwap<RouteTable>,
    sink: Arc<dyn StatSink>,
    max_depth: usize,
}

impl Router {
    /// Resolve dependencies of a discovered set and build a router
    pub fn new(discovered: ModuleSet, sink: Arc<dyn StatSink>) -> Self {
        let table = Self::admit(&discovered, sink.as_ref());
        Self {
            table: ArcSwap::from_pointee(table),
            sink,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Discover, resolve and build from configuration
    ///
    /// The stat sink follows `config.instrumentation`.
    pub fn from_config(config: &DispatchConfig, handlers: HandlerRegistry) -> Self {
        let sink: Arc<dyn StatSink> = if config.instrumentation.enabled {
            Arc::new(DispatchProfiler::new(config.instrumentation.max_samples))
        } else {
            Arc::new(NoopSink)
        };
        Self::from_config_with_sink(config, handlers, sink)
    }

    /// Like [`Router::from_config`] with an explicit sink
    pub fn from_config_with_sink(
        config: &DispatchConfig,
        handlers: HandlerRegistry,
        sink: Arc<dyn StatSink>,
    ) -> Self {
        let discovered = Self::discover(config, handlers);
        Self::new(discovered, sink)
    }

    /// Scan the configured user and built-in module directories
    pub fn discover(config: &DispatchConfig, handlers: HandlerRegistry) -> ModuleSet {
        let source_dirs: Vec<PathBuf> = config.modules.source_dirs();
        info!("modules directory: {:?}", source_dirs.first());
        ModuleDiscovery::new(Arc::new(handlers))
            .with_manifest_file(config.modules.manifest_file.as_str())
            .discover(&source_dirs)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Dispatch a top-level request; never fails
    pub fn dispatch(&self, request: &mut Request) -> Response {
        self.context().dispatch(request)
    }

    /// Fresh dispatch context over the current module set
    pub fn context(&self) -> DispatchContext {
        DispatchContext::new(Arc::clone(&self.table.load().modules), Arc::clone(&self.sink))
            .with_max_depth(self.max_depth)
    }

    /// Fresh dispatch context using a caller-supplied filter collaborator
    pub fn context_with_filters(&self, filters: Box<dyn FilterManager>) -> DispatchContext {
        self.context().with_filters(filters)
    }

    /// Replace the resolved module set
    ///
    /// Dispatches already running keep the set they started with.
    pub fn reload(&self, discovered: ModuleSet) {
        let table = Self::admit(&discovered, self.sink.as_ref());
        info!(
            modules = table.modules.len(),
            excluded = table.excluded.len(),
            "Module set reloaded"
        );
        self.table.store(Arc::new(table));
    }

    /// Resolved modules in routing order
    pub fn installed_modules(&self) -> Vec<Arc<dyn Module>> {
        self.table.load().modules.iter().cloned().collect()
    }

    /// Current module set snapshot
    pub fn modules(&self) -> Arc<ModuleSet> {
        Arc::clone(&self.table.load().modules)
    }

    pub fn module(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.table.load().modules.get(name).cloned()
    }

    /// First module whose namespace equals `namespace`, ignoring ASCII case
    pub fn module_by_namespace(&self, namespace: &str) -> Option<Arc<dyn Module>> {
        self.table
            .load()
            .modules
            .iter()
            .find(|m| m.namespace().eq_ignore_ascii_case(namespace))
            .cloned()
    }

    /// Modules the resolver refused at the last (re)load
    pub fn excluded_modules(&self) -> Vec<ExcludedModule> {
        self.table.load().excluded.clone()
    }

    pub fn sink(&self) -> &Arc<dyn StatSink> {
        &self.sink
    }

    fn admit(discovered: &ModuleSet, sink: &dyn StatSink) -> RouteTable {
        let resolution = ModuleDependencies::resolve(discovered);
        for excluded in &resolution.excluded {
            sink.increment(EXCLUDED_COUNTER, &excluded.name);
        }
        info!(
            "Loaded {} modules ({} excluded for missing dependencies)",
            resolution.resolved.len(),
            resolution.excluded.len()
        );
        RouteTable {
            modules: Arc::new(resolution.resolved),
            excluded: resolution.excluded,
        }
    }
}
