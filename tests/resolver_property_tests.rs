//! Property tests for dependency admission invariants

use modrouter::{InlineModule, Module, ModuleDependencies, ModuleMetadata, ModuleSet};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Up to 10 modules named m0..mN, each depending on names drawn from m0..m13,
/// so some dependencies point at modules that do not exist
fn module_graph() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    (0usize..10).prop_flat_map(|count| {
        proptest::collection::vec(proptest::collection::vec(0usize..14, 0..4), count).prop_map(
            |deps| {
                deps.into_iter()
                    .enumerate()
                    .map(|(i, targets)| {
                        (
                            format!("m{}", i),
                            targets.into_iter().map(|t| format!("m{}", t)).collect(),
                        )
                    })
                    .collect()
            },
        )
    })
}

fn module_set(graph: &[(String, Vec<String>)]) -> ModuleSet {
    graph
        .iter()
        .map(|(name, deps)| {
            Arc::new(InlineModule::declining(
                ModuleMetadata::new(name.as_str(), &format!("/{}", name))
                    .with_dependencies(deps.clone()),
            )) as Arc<dyn Module>
        })
        .collect()
}

proptest! {
    #[test]
    fn test_resolved_is_ordered_subset(graph in module_graph()) {
        // Invariant: admission only removes, never reorders
        let (admitted, _) = ModuleDependencies::admit(&graph);
        let mut input = graph.iter().map(|(name, _)| name);
        for name in &admitted {
            prop_assert!(input.any(|candidate| candidate == name));
        }
    }

    #[test]
    fn test_resolved_is_closed_under_dependencies(graph in module_graph()) {
        let (admitted, _) = ModuleDependencies::admit(&graph);
        let admitted: HashSet<&str> = admitted.iter().map(String::as_str).collect();
        for (name, deps) in &graph {
            if admitted.contains(name.as_str()) {
                for dep in deps {
                    prop_assert!(admitted.contains(dep.as_str()), "{} kept without {}", name, dep);
                }
            }
        }
    }

    #[test]
    fn test_every_module_admitted_or_excluded(graph in module_graph()) {
        let (admitted, excluded) = ModuleDependencies::admit(&graph);
        prop_assert_eq!(admitted.len() + excluded.len(), graph.len());

        let admitted: HashSet<&str> = admitted.iter().map(String::as_str).collect();
        for module in &excluded {
            prop_assert!(!module.missing.is_empty());
            for missing in &module.missing {
                prop_assert!(!admitted.contains(missing.as_str()));
            }
        }
    }

    #[test]
    fn test_module_set_resolution_matches_graph(graph in module_graph()) {
        let (admitted, _) = ModuleDependencies::admit(&graph);
        let resolution = ModuleDependencies::resolve(&module_set(&graph));
        prop_assert_eq!(resolution.resolved.names(), admitted.iter().map(String::as_str).collect::<Vec<_>>());
    }
}

#[test]
fn test_transitive_exclusion() {
    let graph = vec![
        ("c".to_string(), vec!["b".to_string()]),
        ("b".to_string(), vec!["a".to_string()]),
    ];
    let (admitted, excluded) = ModuleDependencies::admit(&graph);
    assert!(admitted.is_empty());
    let names: Vec<&str> = excluded.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["b", "c"]);
}

#[test]
fn test_mutual_pair_kept() {
    let graph = vec![
        ("x".to_string(), vec!["y".to_string()]),
        ("y".to_string(), vec!["x".to_string()]),
    ];
    let (admitted, excluded) = ModuleDependencies::admit(&graph);
    assert_eq!(admitted, vec!["x".to_string(), "y".to_string()]);
    assert!(excluded.is_empty());
}
