//! Module call stack
//!
//! Records which modules are executing, outermost first. Each dispatch
//! context owns its own stack.

use std::sync::Arc;

use crate::module::Module;

/// Separator used by [`ModuleStack::path_string`]
pub const PATH_DELIMITER: char = '/';

/// LIFO stack of executing modules
#[derive(Default, Clone)]
pub struct ModuleStack {
    frames: Vec<Arc<dyn Module>>,
}

impl ModuleStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, module: Arc<dyn Module>) {
        self.frames.push(module);
    }

    pub fn pop(&mut self) -> Option<Arc<dyn Module>> {
        self.frames.pop()
    }

    /// Module currently executing
    pub fn current(&self) -> Option<&Arc<dyn Module>> {
        self.frames.last()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Namespaces from bottom to top, each preceded by `/`
    ///
    /// Empty string for an empty stack.
    pub fn path_string(&self) -> String {
        self.frames.iter().fold(String::new(), |mut path, module| {
            path.push(PATH_DELIMITER);
            path.push_str(module.namespace());
            path
        })
    }

    /// Frames from bottom to top
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Module>> {
        self.frames.iter()
    }
}

impl std::fmt::Debug for ModuleStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ModuleStack").field(&self.path_string()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{InlineModule, ModuleMetadata};

    fn module(name: &str, namespace: &str) -> Arc<dyn Module> {
        Arc::new(InlineModule::declining(
            ModuleMetadata::new(name, name).with_namespace(namespace),
        ))
    }

    #[test]
    fn test_push_pop() {
        let mut stack = ModuleStack::new();
        assert!(stack.current().is_none());
        assert_eq!(stack.depth(), 0);

        stack.push(module("outer", "shop"));
        stack.push(module("inner", "cart"));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.current().unwrap().name(), "inner");

        assert_eq!(stack.pop().unwrap().name(), "inner");
        assert_eq!(stack.current().unwrap().name(), "outer");
        stack.pop();
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_path_string() {
        let mut stack = ModuleStack::new();
        assert_eq!(stack.path_string(), "");
        stack.push(module("outer", "shop"));
        stack.push(module("inner", "cart"));
        assert_eq!(stack.path_string(), "/shop/cart");
    }
}
