//! Action handlers
//!
//! Manifests name a handler kind per action. The [`HandlerRegistry`] maps
//! each kind to a constructor, resolved when the action is first used.

use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::http::{Request, Response, CONTENT_TYPE, JSON_CONTENT_TYPE};
use crate::module::registry::manifest::ActionManifest;
use crate::module::traits::ModuleError;
use crate::router::filters::FailedFilter;
use crate::router::DispatchContext;

/// Context prefix under which path parameters are stored on the request
pub const PARAM_PREFIX: &str = "param.";

/// Executes one manifest action
pub trait ActionHandler: Send + Sync {
    fn handle(
        &self,
        request: &mut Request,
        ctx: &mut DispatchContext,
    ) -> Result<Option<Response>, ModuleError>;
}

/// Constructor for a handler kind
pub type HandlerFactory =
    Arc<dyn Fn(&ActionManifest) -> Result<Arc<dyn ActionHandler>, ModuleError> + Send + Sync>;

/// Registry of handler kinds
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    factories: HashMap<String, HandlerFactory>,
}

impl HandlerRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `static`, `echo`, `forward` and `reject` kinds
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("static", |action| {
            Ok(Arc::new(StaticHandler::from_action(action)?) as Arc<dyn ActionHandler>)
        });
        registry.register("echo", |_| Ok(Arc::new(EchoHandler) as Arc<dyn ActionHandler>));
        registry.register("forward", |action| {
            Ok(Arc::new(ForwardHandler::from_action(action)?) as Arc<dyn ActionHandler>)
        });
        registry.register("reject", |action| {
            Ok(Arc::new(RejectHandler::from_action(action)?) as Arc<dyn ActionHandler>)
        });
        registry
    }

    /// Register (or replace) a handler kind
    pub fn register<F>(&mut self, kind: &str, factory: F)
    where
        F: Fn(&ActionManifest) -> Result<Arc<dyn ActionHandler>, ModuleError>
            + Send
            + Sync
            + 'static,
    {
        self.factories
            .insert(kind.to_ascii_lowercase(), Arc::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(&kind.to_ascii_lowercase())
    }

    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Instantiate the handler for an action
    pub fn create(&self, action: &ActionManifest) -> Result<Arc<dyn ActionHandler>, ModuleError> {
        let factory = self
            .factories
            .get(&action.handler.to_ascii_lowercase())
            .ok_or_else(|| ModuleError::HandlerNotFound(action.handler.clone()))?;
        factory(action)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

fn parse_status(action: &ActionManifest, key: &str, default: u16) -> Result<u16, ModuleError> {
    match action.param(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|status| (100..=599).contains(status))
            .ok_or_else(|| ModuleError::InvalidAction {
                action: action.name.clone(),
                reason: format!("{} must be an HTTP status code, got {:?}", key, raw),
            }),
    }
}

fn required_param<'a>(action: &'a ActionManifest, key: &str) -> Result<&'a str, ModuleError> {
    action
        .param(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ModuleError::InvalidAction {
            action: action.name.clone(),
            reason: format!("missing parameter {}", key),
        })
}

/// Returns a fixed response
#[derive(Debug, Clone)]
pub struct StaticHandler {
    status: u16,
    content_type: String,
    body: String,
}

impl StaticHandler {
    pub fn from_action(action: &ActionManifest) -> Result<Self, ModuleError> {
        Ok(Self {
            status: parse_status(action, "status", 200)?,
            content_type: action
                .param("content_type")
                .unwrap_or(JSON_CONTENT_TYPE)
                .to_string(),
            body: action.param("body").unwrap_or_default().to_string(),
        })
    }
}

impl ActionHandler for StaticHandler {
    fn handle(
        &self,
        _request: &mut Request,
        _ctx: &mut DispatchContext,
    ) -> Result<Option<Response>, ModuleError> {
        Ok(Some(
            Response::new(self.status)
                .with_header(CONTENT_TYPE, self.content_type.as_str())
                .with_body(self.body.as_bytes()),
        ))
    }
}

/// Describes the request and the module stack it reached
#[derive(Debug, Clone, Copy)]
pub struct EchoHandler;

impl ActionHandler for EchoHandler {
    fn handle(
        &self,
        request: &mut Request,
        ctx: &mut DispatchContext,
    ) -> Result<Option<Response>, ModuleError> {
        let params: HashMap<&str, &str> = request
            .context_values()
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(PARAM_PREFIX).map(|k| (k, v.as_str())))
            .collect();

        let body = json!({
            "method": request.method(),
            "url": request.url(),
            "dispatchingId": request.dispatching_id(),
            "stack": ctx.stack_path(),
            "depth": ctx.stack_level(),
            "params": params,
        });
        Ok(Some(Response::json(200, &body)))
    }
}

/// Dispatches the request again under another URL
///
/// The nested dispatch shares the caller's module stack and filters.
#[derive(Debug, Clone)]
pub struct ForwardHandler {
    target: String,
}

impl ForwardHandler {
    pub fn from_action(action: &ActionManifest) -> Result<Self, ModuleError> {
        Ok(Self {
            target: required_param(action, "target")?.to_string(),
        })
    }
}

impl ActionHandler for ForwardHandler {
    fn handle(
        &self,
        request: &mut Request,
        ctx: &mut DispatchContext,
    ) -> Result<Option<Response>, ModuleError> {
        let mut inner = request.derive(self.target.as_str());
        Ok(Some(ctx.dispatch(&mut inner)))
    }
}

/// Records a failed filter and declines
#[derive(Debug, Clone)]
pub struct RejectHandler {
    filter: FailedFilter,
}

impl RejectHandler {
    pub fn from_action(action: &ActionManifest) -> Result<Self, ModuleError> {
        Ok(Self {
            filter: FailedFilter {
                name: required_param(action, "filter")?.to_string(),
                message: action.param("message").unwrap_or_default().to_string(),
                status: parse_status(action, "status", 400)?,
            },
        })
    }
}

impl ActionHandler for RejectHandler {
    fn handle(
        &self,
        _request: &mut Request,
        ctx: &mut DispatchContext,
    ) -> Result<Option<Response>, ModuleError> {
        ctx.filters_mut().record_failure(self.filter.clone());
        Ok(None)
    }
}
