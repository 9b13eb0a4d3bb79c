//! Top-level satisfiability of communication needs.
//!
//! A need is satisfied when at least one unordered pair of its actors is
//! connected by a path. Each pair is searched once, in index order; searching
//! continues after the first success so the report covers every pair.
//!
//! Evaluation reads an immutable graph and returns everything it learned as
//! a [`NeedReport`]. Statistics are merged by the caller and the `satisfied`
//! flags are written back only after all needs have been evaluated, so needs
//! can be evaluated in parallel against the same graph.

use std::collections::{BTreeSet, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnosis, diagnose};
use crate::entity::EntityId;
use crate::graph::EntityGraph;
use crate::multiplicity::{self, MultiplicityReport};
use crate::search::{Checks, NeedOracle, PathOutcome, PathSearch, SearchSettings, WitnessPath};

/// Settings for a whole evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalSettings {
    pub search: SearchSettings,
    /// Classify failed pairs by re-running them with constraints relaxed.
    pub diagnostics: bool,
    /// Evaluate needs on the rayon thread pool.
    pub parallel: bool,
}

impl Default for EvalSettings {
    fn default() -> Self {
        Self {
            search: SearchSettings::default(),
            diagnostics: true,
            parallel: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Aggregate counters over satisfied paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub needs_satisfied: usize,
    /// Accepted hops whose addressing was resolved through a dependent need.
    pub sub_need_hops: usize,
    pub actors: BTreeSet<EntityId>,
    pub carriers: BTreeSet<EntityId>,
    pub languages: BTreeSet<EntityId>,
}

impl SearchStats {
    fn record(&mut self, outcome: &PathOutcome) {
        self.sub_need_hops += outcome.sub_need_hops;
        let involved = &outcome.involvement;
        self.actors.extend(involved.actors.iter().copied());
        self.carriers.extend(involved.carriers.iter().copied());
        self.languages.extend(involved.languages.iter().copied());
    }

    pub fn merge(&mut self, other: &SearchStats) {
        self.needs_satisfied += other.needs_satisfied;
        self.sub_need_hops += other.sub_need_hops;
        self.actors.extend(other.actors.iter().copied());
        self.carriers.extend(other.carriers.iter().copied());
        self.languages.extend(other.languages.iter().copied());
    }
}

/// Result for one actor pair of a need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairReport {
    pub source: EntityId,
    pub target: EntityId,
    pub satisfied: bool,
    pub witness: Option<WitnessPath>,
    pub paths_found: usize,
    pub steps: usize,
    pub truncated: bool,
    /// Present for unsatisfied pairs when diagnostics are enabled.
    pub diagnosis: Option<Diagnosis>,
}

/// Result for one communication need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedReport {
    pub need: EntityId,
    pub satisfied: bool,
    pub pairs: Vec<PairReport>,
    pub stats: SearchStats,
    /// Dependent needs found satisfied while evaluating this one.
    pub sub_needs_satisfied: BTreeSet<EntityId>,
}

/// Result of [`evaluate_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub multiplicity: MultiplicityReport,
    pub needs: Vec<NeedReport>,
    pub stats: SearchStats,
}

impl EvaluationReport {
    pub fn need(&self, need: EntityId) -> Option<&NeedReport> {
        self.needs.iter().find(|r| r.need == need)
    }
}

// ---------------------------------------------------------------------------
// Session: dependent-need recursion
// ---------------------------------------------------------------------------

/// Per-evaluation state for deciding dependent needs.
///
/// Holds the stack of needs under evaluation (a need reached again through
/// its own addressing needs counts as unsatisfied) and a memo of decided
/// needs per check mode.
struct Session<'g> {
    graph: &'g EntityGraph,
    max_steps: usize,
    in_progress: Vec<EntityId>,
    memo: HashMap<(EntityId, Checks), bool>,
    /// Number of cycle cuts so far. A negative answer reached after a cut
    /// depends on the stack at the time and is not memoized.
    cuts: usize,
    satisfied: BTreeSet<EntityId>,
}

impl<'g> Session<'g> {
    fn new(graph: &'g EntityGraph, max_steps: usize) -> Self {
        Self {
            graph,
            max_steps,
            in_progress: Vec::new(),
            memo: HashMap::new(),
            cuts: 0,
            satisfied: BTreeSet::new(),
        }
    }

    fn search(
        &mut self,
        need: EntityId,
        source: EntityId,
        target: EntityId,
        checks: Checks,
    ) -> PathOutcome {
        let graph = self.graph;
        let settings = SearchSettings {
            checks,
            max_steps: self.max_steps,
        };
        PathSearch::new(graph, need, settings, self).run(source, target)
    }

    /// Whether any pair of `need`'s actors connects. Stops at the first hit.
    fn any_pair(&mut self, need: EntityId, checks: Checks) -> bool {
        let actors = self.graph.actors_of(need);
        for (i, &source) in actors.iter().enumerate() {
            for &target in &actors[i + 1..] {
                if self.search(need, source, target, checks).found {
                    return true;
                }
            }
        }
        false
    }
}

impl NeedOracle for Session<'_> {
    fn need_satisfied(&mut self, need: EntityId, checks: Checks) -> bool {
        if let Some(&known) = self.memo.get(&(need, checks)) {
            return known;
        }
        if self.in_progress.contains(&need) {
            tracing::warn!(
                need = %self.graph.name(need),
                "addressing need depends on itself, treated as unsatisfied"
            );
            self.cuts += 1;
            return false;
        }

        let cuts_before = self.cuts;
        self.in_progress.push(need);
        let satisfied = self.any_pair(need, checks);
        self.in_progress.pop();

        if satisfied || self.cuts == cuts_before {
            self.memo.insert((need, checks), satisfied);
        }
        if satisfied && checks == Checks::FULL {
            self.satisfied.insert(need);
        }
        tracing::debug!(
            need = %self.graph.name(need),
            satisfied,
            ?checks,
            "dependent need evaluated"
        );
        satisfied
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Evaluates communication needs against an immutable graph.
pub struct Evaluator<'g> {
    graph: &'g EntityGraph,
    settings: EvalSettings,
}

impl<'g> Evaluator<'g> {
    pub fn new(graph: &'g EntityGraph, settings: EvalSettings) -> Self {
        Self { graph, settings }
    }

    /// Evaluate one need over all unordered pairs of its actors.
    pub fn evaluate_need(&self, need: EntityId) -> NeedReport {
        let graph = self.graph;
        let checks = self.settings.search.checks;
        let mut session = Session::new(graph, self.settings.search.max_steps);
        session.in_progress.push(need);

        tracing::info!(need = %graph.name(need), "evaluating communication need");

        let actors = graph.actors_of(need);
        let mut pairs = Vec::new();
        let mut stats = SearchStats::default();

        for (i, &source) in actors.iter().enumerate() {
            for &target in &actors[i + 1..] {
                let outcome = session.search(need, source, target, checks);
                if outcome.found {
                    stats.record(&outcome);
                }

                let diagnosis = (!outcome.found && self.settings.diagnostics).then(|| {
                    diagnose(&outcome, |relaxed| {
                        session.search(need, source, target, relaxed)
                    })
                });
                if let Some(diagnosis) = diagnosis {
                    tracing::info!(
                        need = %graph.name(need),
                        source = %graph.name(source),
                        target = %graph.name(target),
                        %diagnosis,
                        "pair not satisfied"
                    );
                }
                if outcome.truncated {
                    tracing::warn!(
                        need = %graph.name(need),
                        source = %graph.name(source),
                        target = %graph.name(target),
                        steps = outcome.steps,
                        "pair search truncated"
                    );
                }

                pairs.push(PairReport {
                    source,
                    target,
                    satisfied: outcome.found,
                    witness: outcome.witness,
                    paths_found: outcome.paths_found,
                    steps: outcome.steps,
                    truncated: outcome.truncated,
                    diagnosis,
                });
            }
        }
        session.in_progress.pop();

        let satisfied = pairs.iter().any(|p| p.satisfied);
        if satisfied {
            stats.needs_satisfied = 1;
        }
        tracing::info!(
            need = %graph.name(need),
            satisfied,
            pairs = pairs.len(),
            "communication need evaluated"
        );

        NeedReport {
            need,
            satisfied,
            pairs,
            stats,
            sub_needs_satisfied: session.satisfied,
        }
    }

    /// Evaluate every need, in need order.
    pub fn evaluate_needs(&self) -> Vec<NeedReport> {
        let needs = self.graph.needs();
        if self.settings.parallel {
            needs.par_iter().map(|&n| self.evaluate_need(n)).collect()
        } else {
            needs.iter().map(|&n| self.evaluate_need(n)).collect()
        }
    }
}

/// Validate multiplicities, evaluate every need and write the `satisfied`
/// flags back to the graph.
pub fn evaluate_all(graph: &mut EntityGraph, settings: &EvalSettings) -> EvaluationReport {
    let multiplicity = multiplicity::validate(graph);
    if !multiplicity.all_ok {
        tracing::warn!(
            violations = multiplicity.violations().count(),
            "model has multiplicity violations, evaluating anyway"
        );
    }

    let needs = Evaluator::new(graph, *settings).evaluate_needs();

    let mut stats = SearchStats::default();
    for report in &needs {
        stats.merge(&report.stats);
        if report.satisfied {
            graph.set_satisfied(report.need);
        }
        for &sub in &report.sub_needs_satisfied {
            graph.set_satisfied(sub);
        }
    }

    tracing::info!(
        needs = needs.len(),
        satisfied = stats.needs_satisfied,
        actors = stats.actors.len(),
        carriers = stats.carriers.len(),
        languages = stats.languages.len(),
        "evaluation complete"
    );

    EvaluationReport {
        multiplicity,
        needs,
        stats,
    }
}
