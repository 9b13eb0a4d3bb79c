//! Addressing between two actors on a carrier.
//!
//! A fixed carrier (a point-to-point link) needs no addressing. Otherwise one
//! actor must know an address the other owns, and that address must be
//! expressible on the carrier: either directly, in one of the carrier's
//! addressing languages, or through a relay actor on the same carrier that
//! speaks a language bridging one side's own address to the other side's known
//! address.

use std::collections::HashSet;

use tracing::trace;

use crate::entity::EntityId;
use crate::graph::EntityGraph;

/// Whether `curr` and `next` can address each other on `carrier`.
///
/// `visited_relays` bounds relay recursion. It is shared by every nested call
/// of one resolution and only grows.
pub fn addressing_satisfied(
    graph: &EntityGraph,
    curr: EntityId,
    next: EntityId,
    carrier: EntityId,
    visited_relays: &mut HashSet<EntityId>,
) -> bool {
    graph.is_fixed(carrier) || addressable(graph, curr, next, carrier, visited_relays)
}

/// Mutual addressability through a known/owned address pair.
pub fn addressable(
    graph: &EntityGraph,
    curr: EntityId,
    next: EntityId,
    carrier: EntityId,
    visited_relays: &mut HashSet<EntityId>,
) -> bool {
    let directions = [(curr, next), (next, curr)];
    for (knower, owner) in directions {
        let owned = graph.own_addresses(owner);
        for address in graph.known_addresses(knower) {
            if !owned.contains(&address) {
                continue;
            }
            if valid_address_on_carrier(graph, address, carrier)
                || relay_exists(graph, curr, next, carrier, visited_relays)
            {
                return true;
            }
        }
    }
    false
}

/// An address is valid on a carrier when one of its languages is one of the
/// carrier's addressing languages.
pub fn valid_address_on_carrier(graph: &EntityGraph, address: EntityId, carrier: EntityId) -> bool {
    let address_langs = graph.languages_of(address);
    graph
        .addressing_languages(carrier)
        .iter()
        .any(|l| address_langs.contains(l))
}

/// Look for a relay actor on `carrier` that bridges the two actors' address
/// languages and through which addressing holds on both legs.
///
/// Candidates are the carrier's actors other than the two endpoints that are
/// not yet in `visited_relays` when the search starts. A candidate is marked
/// visited before recursing.
pub fn relay_exists(
    graph: &EntityGraph,
    curr: EntityId,
    next: EntityId,
    carrier: EntityId,
    visited_relays: &mut HashSet<EntityId>,
) -> bool {
    let curr_own = address_languages(graph, graph.own_addresses(curr));
    let curr_known = address_languages(graph, graph.known_addresses(curr));
    let next_own = address_languages(graph, graph.own_addresses(next));
    let next_known = address_languages(graph, graph.known_addresses(next));

    let candidates: Vec<EntityId> = graph
        .actors_of(carrier)
        .into_iter()
        .filter(|r| *r != curr && *r != next && !visited_relays.contains(r))
        .collect();

    for relay in candidates {
        let bridges = graph.languages_of(relay).iter().any(|l| {
            (curr_own.contains(l) && next_known.contains(l))
                || (next_own.contains(l) && curr_known.contains(l))
        });
        if !bridges {
            continue;
        }
        visited_relays.insert(relay);
        trace!(
            relay = %graph.name(relay),
            carrier = %graph.name(carrier),
            "trying address relay"
        );
        if addressing_satisfied(graph, curr, relay, carrier, visited_relays)
            && addressing_satisfied(graph, relay, next, carrier, visited_relays)
        {
            return true;
        }
    }
    false
}

fn address_languages(graph: &EntityGraph, addresses: Vec<EntityId>) -> HashSet<EntityId> {
    addresses
        .into_iter()
        .flat_map(|a| graph.languages_of(a))
        .collect()
}
