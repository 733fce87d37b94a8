//! Module dependency admission
//!
//! Drops every module whose declared dependencies are not all present,
//! repeating until nothing more can be dropped. The output keeps discovery
//! order; this is an admission filter, not a load-order sort.
//!
//! Modules that only depend on each other (A needs B, B needs A) are
//! admitted: the check is name presence, there is no cycle detection.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::module::registry::set::ModuleSet;

/// A module the resolver refused, with the dependency names it lacked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedModule {
    pub name: String,
    pub missing: Vec<String>,
}

/// Dependency resolution result
#[derive(Debug, Clone, Default)]
pub struct DependencyResolution {
    /// Admitted modules, in discovery order
    pub resolved: ModuleSet,
    /// Modules dropped, in the order they were dropped
    pub excluded: Vec<ExcludedModule>,
}

/// Dependency resolver
pub struct ModuleDependencies;

impl ModuleDependencies {
    /// Filter a discovered module set down to its satisfiable subset
    pub fn resolve(discovered: &ModuleSet) -> DependencyResolution {
        let graph: Vec<(String, Vec<String>)> = discovered
            .iter()
            .map(|m| (m.name().to_string(), m.dependencies().to_vec()))
            .collect();

        let (admitted, excluded) = Self::admit(&graph);
        let admitted: HashSet<&str> = admitted.iter().map(String::as_str).collect();

        let mut resolved = discovered.clone();
        resolved.retain(|m| admitted.contains(m.name()));

        for module in &excluded {
            warn!(
                "Unable to load module {}: missing dependencies {:?}",
                module.name, module.missing
            );
        }
        debug!(
            "Dependency resolution complete: {} admitted, {} excluded",
            resolved.len(),
            excluded.len()
        );

        DependencyResolution { resolved, excluded }
    }

    /// Fixpoint admission over a name -> dependencies list
    ///
    /// Each pass scans from the start and removes the first module that
    /// references an absent name; removal restarts the scan because it can
    /// invalidate modules already checked.
    ///
    /// Names are expected to be unique, as in a [`ModuleSet`]. A repeated
    /// name is judged per entry and stays present until every entry
    /// carrying it has been excluded.
    pub fn admit(graph: &[(String, Vec<String>)]) -> (Vec<String>, Vec<ExcludedModule>) {
        let mut working: Vec<&(String, Vec<String>)> = graph.iter().collect();
        let mut present: HashMap<&str, usize> = HashMap::new();
        for (name, _) in graph {
            *present.entry(name.as_str()).or_insert(0) += 1;
        }
        let mut excluded = Vec::new();

        loop {
            let unsatisfied = working.iter().position(|(_, deps)| {
                deps.iter().any(|dep| !present.contains_key(dep.as_str()))
            });

            let Some(slot) = unsatisfied else {
                break;
            };

            let (name, deps) = working.remove(slot);
            let missing = deps
                .iter()
                .filter(|dep| !present.contains_key(dep.as_str()))
                .cloned()
                .collect();
            if let Some(count) = present.get_mut(name.as_str()) {
                *count -= 1;
                if *count == 0 {
                    present.remove(name.as_str());
                }
            }
            excluded.push(ExcludedModule {
                name: name.clone(),
                missing,
            });
        }

        let admitted = working.into_iter().map(|(name, _)| name.clone()).collect();
        (admitted, excluded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(entries: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
        entries
            .iter()
            .map(|(name, deps)| {
                (
                    name.to_string(),
                    deps.iter().map(|d| d.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_all_satisfied() {
        let (admitted, excluded) =
            ModuleDependencies::admit(&graph(&[("a", &[]), ("b", &["a"]), ("c", &["a", "b"])]));
        assert_eq!(admitted, vec!["a", "b", "c"]);
        assert!(excluded.is_empty());
    }

    #[test]
    fn test_missing_dependency_cascades() {
        // c needs x (absent); b needs c; a is independent
        let (admitted, excluded) =
            ModuleDependencies::admit(&graph(&[("b", &["c"]), ("a", &[]), ("c", &["x"])]));
        assert_eq!(admitted, vec!["a"]);
        assert_eq!(
            excluded,
            vec![
                ExcludedModule {
                    name: "c".into(),
                    missing: vec!["x".into()]
                },
                ExcludedModule {
                    name: "b".into(),
                    missing: vec!["c".into()]
                },
            ]
        );
    }

    #[test]
    fn test_mutual_dependency_is_admitted() {
        let (admitted, excluded) =
            ModuleDependencies::admit(&graph(&[("a", &["b"]), ("b", &["a"])]));
        assert_eq!(admitted, vec!["a", "b"]);
        assert!(excluded.is_empty());
    }

    #[test]
    fn test_cycle_with_external_missing_dependency_is_dropped() {
        let (admitted, _) = ModuleDependencies::admit(&graph(&[
            ("a", &["b"]),
            ("b", &["a", "missing"]),
            ("c", &[]),
        ]));
        assert_eq!(admitted, vec!["c"]);
    }

    #[test]
    fn test_self_dependency_is_admitted() {
        let (admitted, _) = ModuleDependencies::admit(&graph(&[("a", &["a"])]));
        assert_eq!(admitted, vec!["a"]);
    }

    #[test]
    fn test_duplicate_names_counted_separately() {
        // The first "a" lacks x; the second still satisfies b
        let (admitted, excluded) =
            ModuleDependencies::admit(&graph(&[("a", &["x"]), ("a", &[]), ("b", &["a"])]));
        assert_eq!(admitted, vec!["a", "b"]);
        assert_eq!(
            excluded,
            vec![ExcludedModule {
                name: "a".into(),
                missing: vec!["x".into()]
            }]
        );
    }

    #[test]
    fn test_empty_graph() {
        let (admitted, excluded) = ModuleDependencies::admit(&[]);
        assert!(admitted.is_empty());
        assert!(excluded.is_empty());
    }
}
