//! Insertion-ordered module map
//!
//! Re-inserting an existing name replaces the module in place, so the
//! position of the first registration wins while the latest module wins.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::module::traits::Module;

/// Ordered mapping from module name to module
#[derive(Clone, Default)]
pub struct ModuleSet {
    order: Vec<Arc<dyn Module>>,
    index: HashMap<String, usize>,
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a module, returning the one it replaced
    pub fn insert(&mut self, module: Arc<dyn Module>) -> Option<Arc<dyn Module>> {
        match self.index.get(module.name()) {
            Some(&slot) => Some(std::mem::replace(&mut self.order[slot], module)),
            None => {
                self.index.insert(module.name().to_string(), self.order.len());
                self.order.push(module);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.index.get(name).map(|&slot| &self.order[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Keep only the modules accepted by `keep`, preserving order
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Arc<dyn Module>) -> bool,
    {
        self.order.retain(|m| keep(m));
        self.reindex();
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Module>> {
        let slot = self.index.remove(name)?;
        let removed = self.order.remove(slot);
        self.reindex();
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Module>> {
        self.order.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|m| m.name()).collect()
    }

    /// Merge `other` into self with last-write-wins semantics
    pub fn extend(&mut self, other: ModuleSet) {
        for module in other.order {
            self.insert(module);
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .order
            .iter()
            .enumerate()
            .map(|(slot, m)| (m.name().to_string(), slot))
            .collect();
    }
}

impl FromIterator<Arc<dyn Module>> for ModuleSet {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Module>>>(iter: I) -> Self {
        let mut set = ModuleSet::new();
        for module in iter {
            set.insert(module);
        }
        set
    }
}

impl fmt::Debug for ModuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::inline::InlineModule;
    use crate::module::traits::ModuleMetadata;

    fn module(name: &str, domain: &str) -> Arc<dyn Module> {
        Arc::new(InlineModule::declining(ModuleMetadata::new(name, domain)))
    }

    #[test]
    fn test_insertion_order_preserved() {
        let set: ModuleSet = vec![module("b", "/b"), module("a", "/a"), module("c", "/c")]
            .into_iter()
            .collect();
        assert_eq!(set.names(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_overwrite_keeps_position_and_replaces_module() {
        let mut set = ModuleSet::new();
        set.insert(module("users", "/users"));
        set.insert(module("shop", "/shop"));
        let replaced = set.insert(module("users", "/people"));

        assert_eq!(replaced.unwrap().domain(), "/users");
        assert_eq!(set.names(), vec!["users", "shop"]);
        assert_eq!(set.get("users").unwrap().domain(), "/people");
    }

    #[test]
    fn test_remove_reindexes() {
        let mut set: ModuleSet = vec![module("a", "/a"), module("b", "/b"), module("c", "/c")]
            .into_iter()
            .collect();
        assert!(set.remove("a").is_some());
        assert!(set.remove("a").is_none());
        assert_eq!(set.get("c").unwrap().name(), "c");
        assert_eq!(set.names(), vec!["b", "c"]);
    }
}
