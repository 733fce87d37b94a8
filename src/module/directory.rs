//! Modules backed by a discovered directory
//!
//! A [`DirectoryModule`] routes requests below its domain to the actions its
//! manifest declares. Handlers are built on first use, never at discovery.

use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::http::{Request, Response};
use crate::module::handlers::{ActionHandler, HandlerRegistry, PARAM_PREFIX};
use crate::module::registry::manifest::{ActionManifest, ModuleManifest};
use crate::module::traits::{Module, ModuleError, ModuleMetadata};
use crate::router::paths;
use crate::router::DispatchContext;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

struct RoutedAction {
    manifest: ActionManifest,
    segments: Vec<Segment>,
    handler: OnceLock<Arc<dyn ActionHandler>>,
}

impl RoutedAction {
    fn new(manifest: ActionManifest) -> Self {
        let segments = manifest
            .path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(param) => Segment::Param(param.to_string()),
                None => Segment::Literal(s.to_ascii_lowercase()),
            })
            .collect();
        Self {
            manifest,
            segments,
            handler: OnceLock::new(),
        }
    }

    fn accepts_method(&self, method: &str) -> bool {
        self.manifest.method == "*" || self.manifest.method.eq_ignore_ascii_case(method)
    }

    /// Match path segments, returning captured parameters
    fn capture<'u>(&self, parts: &[&'u str]) -> Option<Vec<(&str, &'u str)>> {
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit.eq_ignore_ascii_case(part) => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.push((name.as_str(), *part)),
            }
        }
        Some(params)
    }

    fn handler(&self, registry: &HandlerRegistry) -> Result<Arc<dyn ActionHandler>, ModuleError> {
        if let Some(handler) = self.handler.get() {
            return Ok(Arc::clone(handler));
        }
        let created = registry.create(&self.manifest)?;
        // A concurrent first call may have won; either instance is equivalent
        Ok(Arc::clone(self.handler.get_or_init(|| created)))
    }
}

/// Module described by a directory and its manifest
pub struct DirectoryModule {
    metadata: ModuleMetadata,
    actions: Vec<RoutedAction>,
    handlers: Arc<HandlerRegistry>,
}

impl DirectoryModule {
    pub fn new(manifest: ModuleManifest, directory: &Path, handlers: Arc<HandlerRegistry>) -> Self {
        Self {
            metadata: manifest.to_metadata(Some(directory)),
            actions: manifest.actions.into_iter().map(RoutedAction::new).collect(),
            handlers,
        }
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions
            .iter()
            .map(|a| a.manifest.name.as_str())
            .collect()
    }
}

impl Module for DirectoryModule {
    fn metadata(&self) -> &ModuleMetadata {
        &self.metadata
    }

    fn exec(
        &self,
        request: &mut Request,
        ctx: &mut DispatchContext,
    ) -> Result<Option<Response>, ModuleError> {
        let url = paths::normalize_url(request.url());
        let Some(rest) = paths::strip_domain(&url, &self.metadata.domain) else {
            return Ok(None);
        };
        let parts: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

        for action in &self.actions {
            if !action.accepts_method(request.method()) {
                continue;
            }
            let Some(params) = action.capture(&parts) else {
                continue;
            };

            debug!(
                "Module {} dispatching action {}",
                self.metadata.name, action.manifest.name
            );
            let params: Vec<(String, String)> = params
                .into_iter()
                .map(|(k, v)| (format!("{}{}", PARAM_PREFIX, k), v.to_string()))
                .collect();
            for (key, value) in params {
                request.set_context(key, value);
            }

            let handler = action.handler(&self.handlers)?;
            return handler.handle(request, ctx);
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routed(path: &str) -> RoutedAction {
        let mut manifest = ActionManifest::new("a", "echo");
        manifest.path = path.to_string();
        RoutedAction::new(manifest)
    }

    #[test]
    fn test_segment_parsing() {
        let action = routed("/items/{id}/");
        assert_eq!(
            action.segments,
            vec![
                Segment::Literal("items".into()),
                Segment::Param("id".into())
            ]
        );
    }

    #[test]
    fn test_capture() {
        let action = routed("items/{id}");
        assert_eq!(action.capture(&["Items", "5"]), Some(vec![("id", "5")]));
        assert_eq!(action.capture(&["items"]), None);
        assert_eq!(action.capture(&["orders", "5"]), None);
    }

    #[test]
    fn test_root_action_matches_empty_rest() {
        let action = routed("");
        assert_eq!(action.capture(&[]), Some(vec![]));
    }

    #[test]
    fn test_method_wildcard() {
        let mut action = routed("");
        assert!(action.accepts_method("DELETE"));
        action.manifest.method = "get".into();
        assert!(action.accepts_method("GET"));
        assert!(!action.accepts_method("POST"));
    }
}
