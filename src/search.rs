//! Path search: depth-first exploration of actor → carrier → actor hops.
//!
//! Starting from one actor of a communication need, the search walks hops that
//! are reliable (available, non-distorting, non-dropping), carry at least one
//! usable language, and resolve addressing, until it reaches the target actor.
//! Actors and carriers already on the current path are never revisited, which
//! bounds the search tree on any finite graph. An additional step budget caps
//! the number of candidate hops examined, since the enumeration is exponential
//! in the worst case.
//!
//! The walk keeps its own stack of [`Frame`]s instead of recursing, so a path
//! thousands of hops long costs heap, not call stack. The current path lives in
//! a [`Trail`]: a hop is pushed when its frame is entered and popped when that
//! frame is exhausted, so sibling branches never see each other's state.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::addressing::addressing_satisfied;
use crate::entity::{EntityId, LanguageSet};
use crate::graph::EntityGraph;
use crate::language::LanguageContext;

/// Which constraints a search enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checks {
    pub language: bool,
    pub addressing: bool,
}

impl Checks {
    pub const FULL: Checks = Checks {
        language: true,
        addressing: true,
    };
    pub const LANGUAGE_RELAXED: Checks = Checks {
        language: false,
        addressing: true,
    };
    pub const ADDRESSING_RELAXED: Checks = Checks {
        language: true,
        addressing: false,
    };
    pub const NONE: Checks = Checks {
        language: false,
        addressing: false,
    };
}

impl Default for Checks {
    fn default() -> Self {
        Checks::FULL
    }
}

/// Settings for one pair search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    pub checks: Checks,
    /// Maximum number of candidate hops examined before giving up.
    pub max_steps: usize,
}

impl SearchSettings {
    pub fn with_checks(self, checks: Checks) -> Self {
        Self { checks, ..self }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            checks: Checks::FULL,
            max_steps: 1_000_000,
        }
    }
}

/// Decides dependent (addressing) needs on behalf of a running search.
pub trait NeedOracle {
    fn need_satisfied(&mut self, need: EntityId, checks: Checks) -> bool;
}

/// Oracle for searches that must not recurse into dependent needs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSubNeeds;

impl NeedOracle for NoSubNeeds {
    fn need_satisfied(&mut self, _need: EntityId, _checks: Checks) -> bool {
        false
    }
}

/// One actor → carrier → actor step with the languages usable across it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub from: EntityId,
    pub carrier: EntityId,
    pub to: EntityId,
    pub languages: Vec<EntityId>,
}

/// Ordered hop sequence from source to target actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessPath {
    pub hops: Vec<Hop>,
}

impl WitnessPath {
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Alternating actor/carrier node sequence, starting and ending at actors.
    pub fn nodes(&self) -> Vec<EntityId> {
        let mut nodes = Vec::with_capacity(self.hops.len() * 2 + 1);
        if let Some(first) = self.hops.first() {
            nodes.push(first.from);
        }
        for hop in &self.hops {
            nodes.push(hop.carrier);
            nodes.push(hop.to);
        }
        nodes
    }
}

/// The path currently being explored: nodes plus per-hop language sets.
#[derive(Debug, Clone)]
pub struct Trail {
    nodes: Vec<EntityId>,
    languages: Vec<LanguageSet>,
    on_path: HashSet<EntityId>,
}

impl Trail {
    pub fn start(actor: EntityId) -> Self {
        Self {
            nodes: vec![actor],
            languages: Vec::new(),
            on_path: HashSet::from([actor]),
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.on_path.contains(&id)
    }

    /// `[actor, carrier, actor, carrier, actor, ...]`
    pub fn nodes(&self) -> &[EntityId] {
        &self.nodes
    }

    pub fn language_trace(&self) -> &[LanguageSet] {
        &self.languages
    }

    pub fn hop_count(&self) -> usize {
        self.languages.len()
    }

    /// Extend the trail by `carrier` then `actor`.
    pub fn push_hop(&mut self, carrier: EntityId, actor: EntityId, languages: LanguageSet) {
        self.nodes.push(carrier);
        self.nodes.push(actor);
        self.on_path.insert(carrier);
        self.on_path.insert(actor);
        self.languages.push(languages);
    }

    /// Remove the last hop. The start actor is never popped.
    pub fn pop_hop(&mut self) -> Option<LanguageSet> {
        let languages = self.languages.pop()?;
        for _ in 0..2 {
            if let Some(id) = self.nodes.pop() {
                self.on_path.remove(&id);
            }
        }
        Some(languages)
    }

    fn witness(&self) -> WitnessPath {
        let hops = self
            .nodes
            .windows(3)
            .step_by(2)
            .zip(&self.languages)
            .map(|(w, langs)| Hop {
                from: w[0],
                carrier: w[1],
                to: w[2],
                languages: langs.iter().copied().collect(),
            })
            .collect();
        WitnessPath { hops }
    }
}

/// One actor whose outgoing hops are being scanned.
#[derive(Debug)]
struct Frame {
    curr: EntityId,
    /// Languages usable on the hop that reached `curr`.
    inbound: LanguageSet,
    /// `(carrier, next actor)` in scan order.
    candidates: Vec<(EntityId, EntityId)>,
    cursor: usize,
}

/// Entities appearing on successful paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Involvement {
    pub actors: BTreeSet<EntityId>,
    pub carriers: BTreeSet<EntityId>,
    pub languages: BTreeSet<EntityId>,
}

impl Involvement {
    pub fn record(&mut self, path: &WitnessPath) {
        for hop in &path.hops {
            self.actors.insert(hop.from);
            self.actors.insert(hop.to);
            self.carriers.insert(hop.carrier);
            self.languages.extend(hop.languages.iter().copied());
        }
    }

    pub fn merge(&mut self, other: &Involvement) {
        self.actors.extend(other.actors.iter().copied());
        self.carriers.extend(other.carriers.iter().copied());
        self.languages.extend(other.languages.iter().copied());
    }
}

/// Result of searching one actor pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOutcome {
    pub found: bool,
    /// Path of the last successful branch in scan order.
    pub witness: Option<WitnessPath>,
    pub paths_found: usize,
    /// The step budget ran out before the search finished.
    pub truncated: bool,
    pub steps: usize,
    /// Accepted hops whose addressing was resolved through dependent needs.
    pub sub_need_hops: usize,
    pub involvement: Involvement,
}

/// Depth-first path search for one communication need.
pub struct PathSearch<'a, 'g> {
    graph: &'g EntityGraph,
    need: EntityId,
    languages: LanguageContext<'g>,
    settings: SearchSettings,
    oracle: &'a mut dyn NeedOracle,
    outcome: PathOutcome,
}

impl<'a, 'g> PathSearch<'a, 'g> {
    pub fn new(
        graph: &'g EntityGraph,
        need: EntityId,
        settings: SearchSettings,
        oracle: &'a mut dyn NeedOracle,
    ) -> Self {
        Self {
            graph,
            need,
            languages: LanguageContext::for_need(graph, need),
            settings,
            oracle,
            outcome: PathOutcome::default(),
        }
    }

    /// Search for a path from `source` to `target`.
    ///
    /// The inbound language set of the first hop is everything `source` knows.
    pub fn run(mut self, source: EntityId, target: EntityId) -> PathOutcome {
        let mut trail = Trail::start(source);
        let inbound: LanguageSet = self.graph.languages_of(source).into_iter().collect();
        let found = self.find_path(source, target, &mut trail, &inbound);
        self.outcome.found = found;
        self.outcome
    }

    /// Explore every hop out of `source` and, transitively, out of every actor
    /// reached. Returns whether any branch reached `target`; all siblings are
    /// explored either way. `trail` is back at its starting state on return.
    pub fn find_path(
        &mut self,
        source: EntityId,
        target: EntityId,
        trail: &mut Trail,
        inbound: &LanguageSet,
    ) -> bool {
        if source == target {
            self.record_success(trail);
            return true;
        }

        let found_before = self.outcome.paths_found;
        let base = trail.hop_count();
        let mut stack = vec![self.frame(source, inbound.clone())];

        while let Some(frame) = stack.last_mut() {
            let Some(&(carrier, next)) = frame.candidates.get(frame.cursor) else {
                stack.pop();
                if !stack.is_empty() {
                    trail.pop_hop();
                }
                continue;
            };
            frame.cursor += 1;
            let curr = frame.curr;

            if trail.contains(carrier) || trail.contains(next) {
                continue;
            }
            if self.outcome.steps >= self.settings.max_steps {
                warn!(
                    need = %self.graph.name(self.need),
                    max_steps = self.settings.max_steps,
                    depth = trail.hop_count(),
                    "path search step budget exhausted, result may be incomplete"
                );
                self.outcome.truncated = true;
                break;
            }
            self.outcome.steps += 1;

            let allowed = self
                .languages
                .allowed_languages(curr, next, carrier, &frame.inbound);
            if allowed.is_empty() && self.settings.checks.language {
                trace!(
                    from = %self.graph.name(curr),
                    to = %self.graph.name(next),
                    carrier = %self.graph.name(carrier),
                    "hop rejected: no usable language"
                );
                continue;
            }
            if !self.conditions_for_satisfaction(curr, next, carrier) {
                continue;
            }

            debug!(
                from = %self.graph.name(curr),
                to = %self.graph.name(next),
                carrier = %self.graph.name(carrier),
                languages = ?allowed.iter().map(|l| self.graph.name(*l)).collect::<Vec<_>>(),
                "hop accepted"
            );

            trail.push_hop(carrier, next, allowed.clone());
            if next == target {
                self.record_success(trail);
                trail.pop_hop();
            } else {
                stack.push(self.frame(next, allowed));
            }
        }

        while trail.hop_count() > base {
            trail.pop_hop();
        }
        self.outcome.paths_found > found_before
    }

    fn frame(&self, curr: EntityId, inbound: LanguageSet) -> Frame {
        let candidates = self
            .graph
            .carriers_of(curr)
            .into_iter()
            .flat_map(|carrier| {
                self.graph
                    .actors_of(carrier)
                    .into_iter()
                    .map(move |next| (carrier, next))
            })
            .collect();
        Frame {
            curr,
            inbound,
            candidates,
            cursor: 0,
        }
    }

    /// Reliability and addressing conditions for the hop `curr -carrier-> next`.
    ///
    /// When direct addressing fails, the hop may still be taken if the need
    /// has dependent addressing needs and all of them are satisfied.
    pub fn conditions_for_satisfaction(
        &mut self,
        curr: EntityId,
        next: EntityId,
        carrier: EntityId,
    ) -> bool {
        let reliable = [curr, next, carrier]
            .into_iter()
            .all(|id| self.graph.reliable(id));
        if !reliable {
            return false;
        }
        if !self.settings.checks.addressing {
            return true;
        }

        let mut relays = HashSet::new();
        if addressing_satisfied(self.graph, curr, next, carrier, &mut relays) {
            return true;
        }

        let sub_needs = self.graph.sub_needs(self.need);
        if sub_needs.is_empty() {
            trace!(
                from = %self.graph.name(curr),
                to = %self.graph.name(next),
                carrier = %self.graph.name(carrier),
                "hop rejected: addressing not satisfied"
            );
            return false;
        }
        let checks = self.settings.checks;
        let resolved = sub_needs
            .into_iter()
            .all(|sub| self.oracle.need_satisfied(sub, checks));
        if resolved {
            self.outcome.sub_need_hops += 1;
        }
        resolved
    }

    fn record_success(&mut self, trail: &Trail) {
        let path = trail.witness();
        debug!(
            need = %self.graph.name(self.need),
            path = ?path.nodes().iter().map(|n| self.graph.name(*n)).collect::<Vec<_>>(),
            "possible communication path"
        );
        self.outcome.paths_found += 1;
        self.outcome.involvement.record(&path);
        self.outcome.witness = Some(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ActorAttrs, CarrierAttrs, Role};

    /// Actors on fixed carriers, everyone speaking `lang`, which every carrier carries.
    struct Net {
        g: EntityGraph,
        need: EntityId,
        lang: EntityId,
    }

    impl Net {
        fn new() -> Self {
            let mut g = EntityGraph::new();
            let need = g.add_need("N");
            let lang = g.add_language("L");
            g.associate(need, lang);
            Self { g, need, lang }
        }

        fn actor(&mut self, name: &str) -> EntityId {
            let a = self.g.add_actor(name, ActorAttrs::default());
            self.g.associate(a, self.lang);
            a
        }

        fn carrier(&mut self, name: &str, actors: &[EntityId]) -> EntityId {
            let c = self.g.add_carrier(
                name,
                CarrierAttrs {
                    fixed: true,
                    ..Default::default()
                },
            );
            self.g
                .associate_roles(c, None, self.lang, Some(Role::Format));
            for &a in actors {
                self.g.associate(a, c);
            }
            c
        }

        fn search(&self, source: EntityId, target: EntityId, checks: Checks) -> PathOutcome {
            let mut oracle = NoSubNeeds;
            let settings = SearchSettings::default().with_checks(checks);
            PathSearch::new(&self.g, self.need, settings, &mut oracle).run(source, target)
        }
    }

    #[test]
    fn single_hop() {
        let mut net = Net::new();
        let a = net.actor("A");
        let b = net.actor("B");
        let link = net.carrier("link", &[a, b]);

        let out = net.search(a, b, Checks::FULL);
        assert!(out.found);
        let witness = out.witness.unwrap();
        assert_eq!(witness.len(), 1);
        assert_eq!(witness.nodes(), vec![a, link, b]);
        assert_eq!(witness.hops[0].languages, vec![net.lang]);
    }

    #[test]
    fn multi_hop_chain() {
        let mut net = Net::new();
        let a = net.actor("A");
        let b = net.actor("B");
        let c = net.actor("C");
        let ab = net.carrier("ab", &[a, b]);
        let bc = net.carrier("bc", &[b, c]);

        let out = net.search(a, c, Checks::FULL);
        assert!(out.found);
        assert_eq!(out.witness.unwrap().nodes(), vec![a, ab, b, bc, c]);
        assert_eq!(out.involvement.actors, BTreeSet::from([a, b, c]));
        assert_eq!(out.involvement.carriers, BTreeSet::from([ab, bc]));
    }

    #[test]
    fn last_successful_branch_is_retained() {
        let mut net = Net::new();
        let a = net.actor("A");
        let b = net.actor("B");
        let first = net.carrier("first", &[a, b]);
        let second = net.carrier("second", &[a, b]);

        let out = net.search(a, b, Checks::FULL);
        assert_eq!(out.paths_found, 2);
        assert_eq!(out.witness.unwrap().nodes(), vec![a, second, b]);
        assert_eq!(out.involvement.carriers, BTreeSet::from([first, second]));
    }

    #[test]
    fn unreliable_intermediary_blocks_path() {
        let mut net = Net::new();
        let a = net.actor("A");
        let b = net.g.add_actor(
            "B",
            ActorAttrs {
                distorts_message: true,
                ..Default::default()
            },
        );
        net.g.associate(b, net.lang);
        let c = net.actor("C");
        net.carrier("ab", &[a, b]);
        net.carrier("bc", &[b, c]);

        assert!(!net.search(a, c, Checks::FULL).found);
        assert!(!net.search(a, c, Checks::NONE).found);
    }

    #[test]
    fn cycles_terminate() {
        let mut net = Net::new();
        let actors: Vec<EntityId> = (0..5).map(|i| net.actor(&format!("A{i}"))).collect();
        // Fully meshed ring plus one shared bus.
        for i in 0..actors.len() {
            let j = (i + 1) % actors.len();
            net.carrier(&format!("c{i}"), &[actors[i], actors[j]]);
        }
        net.carrier("bus", &actors);
        let isolated = net.actor("isolated");

        let out = net.search(actors[0], isolated, Checks::FULL);
        assert!(!out.found);
        assert!(!out.truncated);
        assert!(out.steps > 0);
    }

    #[test]
    fn step_budget_truncates() {
        let mut net = Net::new();
        let actors: Vec<EntityId> = (0..6).map(|i| net.actor(&format!("A{i}"))).collect();
        net.carrier("bus", &actors);
        let isolated = net.actor("isolated");

        let mut oracle = NoSubNeeds;
        let settings = SearchSettings {
            checks: Checks::FULL,
            max_steps: 3,
        };
        let out = PathSearch::new(&net.g, net.need, settings, &mut oracle).run(actors[0], isolated);
        assert!(!out.found);
        assert!(out.truncated);
        assert_eq!(out.steps, 3);
    }

    #[test]
    fn trail_restored_after_search() {
        let mut net = Net::new();
        let a = net.actor("A");
        let b = net.actor("B");
        let c = net.actor("C");
        net.carrier("ab", &[a, b]);
        net.carrier("bc", &[b, c]);
        net.carrier("ac", &[a, c]);

        let mut oracle = NoSubNeeds;
        let mut search =
            PathSearch::new(&net.g, net.need, SearchSettings::default(), &mut oracle);
        let mut trail = Trail::start(a);
        let inbound = LanguageSet::from([net.lang]);
        assert!(search.find_path(a, c, &mut trail, &inbound));
        assert_eq!(trail.nodes(), &[a]);
        assert!(trail.language_trace().is_empty());

        let mut trail = Trail::start(a);
        let ghost_target = net.g.add_language("nobody");
        let mut search =
            PathSearch::new(&net.g, net.need, SearchSettings::default(), &mut oracle);
        assert!(!search.find_path(a, ghost_target, &mut trail, &inbound));
        assert_eq!(trail.nodes(), &[a]);
    }

    #[test]
    fn push_and_pop_hop() {
        let a = EntityId::from(petgraph::graph::NodeIndex::new(0));
        let c = EntityId::from(petgraph::graph::NodeIndex::new(1));
        let b = EntityId::from(petgraph::graph::NodeIndex::new(2));
        let mut trail = Trail::start(a);
        trail.push_hop(c, b, LanguageSet::from([a]));
        assert!(trail.contains(b));
        assert!(trail.contains(c));
        assert_eq!(trail.hop_count(), 1);

        assert_eq!(trail.pop_hop(), Some(LanguageSet::from([a])));
        assert!(!trail.contains(b));
        assert!(!trail.contains(c));
        assert!(trail.contains(a));
        assert_eq!(trail.pop_hop(), None);
        assert_eq!(trail.nodes(), &[a]);
    }

    #[test]
    fn long_chain_runs_on_a_small_stack() {
        let mut net = Net::new();
        let actors: Vec<EntityId> = (0..5_000).map(|i| net.actor(&format!("A{i}"))).collect();
        for (i, pair) in actors.windows(2).enumerate() {
            net.carrier(&format!("link{i}"), pair);
        }
        let (first, last) = (actors[0], actors[actors.len() - 1]);

        let out = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || net.search(first, last, Checks::FULL))
            .unwrap()
            .join()
            .unwrap();
        assert!(out.found);
        assert!(!out.truncated);
        assert_eq!(out.witness.unwrap().len(), actors.len() - 1);
    }

    #[test]
    fn relaxation_is_monotonic() {
        let mut net = Net::new();
        let a = net.actor("A");
        let b = net.actor("B");
        net.carrier("link", &[a, b]);

        for checks in [
            Checks::FULL,
            Checks::LANGUAGE_RELAXED,
            Checks::ADDRESSING_RELAXED,
            Checks::NONE,
        ] {
            assert!(net.search(a, b, checks).found, "{checks:?}");
        }
    }

    struct Always(usize);

    impl NeedOracle for Always {
        fn need_satisfied(&mut self, _need: EntityId, _checks: Checks) -> bool {
            self.0 += 1;
            true
        }
    }

    #[test]
    fn dependent_need_resolves_addressing() {
        let mut g = EntityGraph::new();
        let need = g.add_need("N");
        let sub = g.add_need("N.addressing");
        g.associate_roles(need, None, sub, Some(Role::AddressingNeed));
        let lang = g.add_language("L");
        g.associate(need, lang);
        let a = g.add_actor("A", ActorAttrs::default());
        let b = g.add_actor("B", ActorAttrs::default());
        let bus = g.add_carrier("Bus", CarrierAttrs::default());
        g.associate_roles(bus, None, lang, Some(Role::Format));
        for x in [a, b] {
            g.associate(x, lang);
            g.associate(x, bus);
        }

        let mut none = NoSubNeeds;
        let out = PathSearch::new(&g, need, SearchSettings::default(), &mut none).run(a, b);
        assert!(!out.found);

        let mut always = Always(0);
        let out = PathSearch::new(&g, need, SearchSettings::default(), &mut always).run(a, b);
        assert!(out.found);
        assert_eq!(out.sub_need_hops, 1);
        assert_eq!(always.0, 1);
    }
}
