//! Module system traits and interfaces
//!
//! Defines the contract every routable module implements and the errors the
//! module layer reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::http::{Request, Response};
use crate::router::DispatchContext;

/// Module metadata describing identity, routing domain and dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    /// Module name (unique key in the registry)
    pub name: String,
    /// Namespace shown in stack paths and used for namespace lookups
    pub namespace: String,
    /// URL prefix claimed by this module, normalized and lower-cased
    pub domain: String,
    /// Names of modules that must be present for this one to load
    pub dependencies: Vec<String>,
    /// Module version, if the manifest declares one
    pub version: Option<String>,
    /// Human-readable description
    pub description: String,
    /// Directory the module was discovered in (None for in-process modules)
    pub directory: Option<PathBuf>,
}

impl ModuleMetadata {
    /// Metadata with namespace equal to the name and no dependencies
    pub fn new(name: impl Into<String>, domain: &str) -> Self {
        let name = name.into();
        Self {
            namespace: name.clone(),
            name,
            domain: crate::router::paths::normalize_domain(domain),
            dependencies: Vec::new(),
            version: None,
            description: String::new(),
            directory: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }
}

/// Module trait that all routable modules implement
///
/// Modules are immutable after construction and shared between concurrent
/// dispatches, so any per-call state lives in the [`DispatchContext`] or
/// the [`Request`] rather than in the module itself.
pub trait Module: Send + Sync {
    /// Get module metadata
    fn metadata(&self) -> &ModuleMetadata;

    /// Handle a request routed to this module
    ///
    /// `Ok(None)` declines the request and lets the router try the next
    /// module whose domain also matches.
    fn exec(
        &self,
        request: &mut Request,
        ctx: &mut DispatchContext,
    ) -> Result<Option<Response>, ModuleError>;

    fn name(&self) -> &str {
        &self.metadata().name
    }

    fn namespace(&self) -> &str {
        &self.metadata().namespace
    }

    fn domain(&self) -> &str {
        &self.metadata().domain
    }

    fn dependencies(&self) -> &[String] {
        &self.metadata().dependencies
    }
}

impl fmt::Debug for dyn Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name())
            .field("namespace", &self.namespace())
            .field("domain", &self.domain())
            .finish()
    }
}

/// Module system errors
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("Invalid module manifest: {0}")]
    InvalidManifest(String),

    #[error("Invalid action {action}: {reason}")]
    InvalidAction { action: String, reason: String },

    #[error("No handler registered for kind: {0}")]
    HandlerNotFound(String),

    #[error("Handler failed: {0}")]
    HandlerFailed(String),

    #[error("Handler panicked: {0}")]
    HandlerPanicked(String),

    #[error("Module nesting too deep: {0} levels")]
    NestingTooDeep(usize),

    #[error("Module operation failed: {0}")]
    OperationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ModuleError {
    fn from(e: serde_json::Error) -> Self {
        ModuleError::SerializationError(e.to_string())
    }
}

impl From<anyhow::Error> for ModuleError {
    fn from(e: anyhow::Error) -> Self {
        ModuleError::OperationError(e.to_string())
    }
}
