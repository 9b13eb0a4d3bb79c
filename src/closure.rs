//! Language closures: generalization ("super language") and encapsulation
//! ("carrying language").
//!
//! Both relations are expected to be acyclic, but models are hand-drawn, so the
//! walk carries an explicit visited set and stops at anything already seen. A
//! language reached twice contributes once; a cycle just ends the walk with the
//! closure collected so far.

use std::collections::HashSet;

use crate::entity::{EntityId, LanguageSet};
use crate::graph::EntityGraph;

/// Reflexive-transitive closure of `lang` over the super-language relation.
///
/// `visited` is shared with the caller: languages already in it are listed if
/// directly reachable but not expanded further.
pub fn super_closure(
    graph: &EntityGraph,
    lang: EntityId,
    visited: &mut HashSet<EntityId>,
) -> LanguageSet {
    closure(graph, lang, visited, EntityGraph::direct_super_languages)
}

/// Reflexive-transitive closure of `lang` over the carrying-language relation.
pub fn carrying_closure(
    graph: &EntityGraph,
    lang: EntityId,
    visited: &mut HashSet<EntityId>,
) -> LanguageSet {
    closure(graph, lang, visited, EntityGraph::direct_carrying_languages)
}

/// [`super_closure`] from a fresh visited set.
pub fn super_closure_of(graph: &EntityGraph, lang: EntityId) -> LanguageSet {
    super_closure(graph, lang, &mut HashSet::new())
}

/// [`carrying_closure`] from a fresh visited set.
pub fn carrying_closure_of(graph: &EntityGraph, lang: EntityId) -> LanguageSet {
    carrying_closure(graph, lang, &mut HashSet::new())
}

fn closure(
    graph: &EntityGraph,
    lang: EntityId,
    visited: &mut HashSet<EntityId>,
    step: fn(&EntityGraph, EntityId) -> Vec<EntityId>,
) -> LanguageSet {
    visited.insert(lang);

    let mut all = LanguageSet::from([lang]);
    let mut pending = vec![lang];
    while let Some(current) = pending.pop() {
        for next in step(graph, current) {
            all.insert(next);
            if visited.insert(next) {
                pending.push(next);
            }
        }
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Role;

    fn generalizes(g: &mut EntityGraph, specific: EntityId, general: EntityId) {
        g.associate_roles(specific, None, general, Some(Role::SuperLanguage));
    }

    #[test]
    fn closure_includes_self() {
        let mut g = EntityGraph::new();
        let l = g.add_language("L");
        assert_eq!(super_closure_of(&g, l), LanguageSet::from([l]));
        assert_eq!(carrying_closure_of(&g, l), LanguageSet::from([l]));
    }

    #[test]
    fn chain_is_transitive() {
        // modbus-tcp -> modbus -> fieldbus-protocol
        let mut g = EntityGraph::new();
        let tcp = g.add_language("Modbus/TCP");
        let modbus = g.add_language("Modbus");
        let field = g.add_language("Fieldbus protocol");
        generalizes(&mut g, tcp, modbus);
        generalizes(&mut g, modbus, field);

        assert_eq!(
            super_closure_of(&g, tcp),
            LanguageSet::from([tcp, modbus, field])
        );
        // Generalization is directed.
        assert_eq!(super_closure_of(&g, field), LanguageSet::from([field]));
    }

    #[test]
    fn closure_is_idempotent() {
        let mut g = EntityGraph::new();
        let a = g.add_language("a");
        let b = g.add_language("b");
        let c = g.add_language("c");
        let d = g.add_language("d");
        generalizes(&mut g, a, b);
        generalizes(&mut g, a, c);
        generalizes(&mut g, c, d);

        let first = super_closure_of(&g, a);
        for &member in &first {
            assert!(super_closure_of(&g, member).is_subset(&first));
        }
    }

    #[test]
    fn cycle_terminates() {
        let mut g = EntityGraph::new();
        let a = g.add_language("a");
        let b = g.add_language("b");
        let c = g.add_language("c");
        g.associate_roles(a, None, b, Some(Role::CarryingLanguage));
        g.associate_roles(b, None, c, Some(Role::CarryingLanguage));
        g.associate_roles(c, None, a, Some(Role::CarryingLanguage));

        assert_eq!(carrying_closure_of(&g, a), LanguageSet::from([a, b, c]));
    }

    #[test]
    fn relations_are_independent() {
        let mut g = EntityGraph::new();
        let payload = g.add_language("payload");
        let frame = g.add_language("frame");
        g.associate_roles(payload, None, frame, Some(Role::CarryingLanguage));

        assert_eq!(super_closure_of(&g, payload), LanguageSet::from([payload]));
        assert_eq!(
            carrying_closure_of(&g, payload),
            LanguageSet::from([payload, frame])
        );
    }

    #[test]
    fn pre_visited_languages_are_not_expanded() {
        let mut g = EntityGraph::new();
        let a = g.add_language("a");
        let b = g.add_language("b");
        let c = g.add_language("c");
        generalizes(&mut g, a, b);
        generalizes(&mut g, b, c);

        let mut visited = HashSet::from([b]);
        assert_eq!(super_closure(&g, a, &mut visited), LanguageSet::from([a, b]));
    }

    #[test]
    fn deep_hierarchy_is_walked_without_recursion() {
        let mut g = EntityGraph::new();
        let langs: Vec<EntityId> = (0..20_000).map(|i| g.add_language(&format!("L{i}"))).collect();
        for pair in langs.windows(2) {
            generalizes(&mut g, pair[0], pair[1]);
        }

        let closure = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || super_closure_of(&g, langs[0]))
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(closure.len(), 20_000);
    }
}
