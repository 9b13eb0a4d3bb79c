//! Structural multiplicity checks.
//!
//! Each entity kind expects certain relation cardinalities: a carrier connects
//! at least two actors, a need has exactly one reference language, and so on.
//! Violations are reported and logged but never stop the evaluation, which
//! simply works with whatever relations exist.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::entity::{EntityId, EntityType, Role};
use crate::graph::{EntityGraph, RoleFilter};

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

/// Result of checking one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplicityFinding {
    pub entity: EntityId,
    pub entity_type: EntityType,
    pub ok: bool,
    /// Violated expectations, empty when `ok`.
    pub detail: Vec<String>,
}

/// All findings of one validation pass, in entity order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplicityReport {
    pub findings: Vec<MultiplicityFinding>,
    pub all_ok: bool,
}

impl MultiplicityReport {
    pub fn violations(&self) -> impl Iterator<Item = &MultiplicityFinding> {
        self.findings.iter().filter(|f| !f.ok)
    }
}

// ---------------------------------------------------------------------------
// Expectations
// ---------------------------------------------------------------------------

enum Bound {
    AtLeast(usize),
    AtMost(usize),
    Exactly(usize),
}

impl Bound {
    fn holds(&self, n: usize) -> bool {
        match *self {
            Bound::AtLeast(min) => n >= min,
            Bound::AtMost(max) => n <= max,
            Bound::Exactly(k) => n == k,
        }
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bound::AtLeast(n) => write!(f, "at least {n}"),
            Bound::AtMost(n) => write!(f, "at most {n}"),
            Bound::Exactly(n) => write!(f, "exactly {n}"),
        }
    }
}

struct Expectation {
    what: &'static str,
    bound: Bound,
    count: usize,
}

fn expectations(graph: &EntityGraph, id: EntityId, ty: EntityType) -> Vec<Expectation> {
    let count = |roles, target| graph.related(id, roles, Some(target)).len();
    let expect = |what, bound, count| Expectation { what, bound, count };

    match ty {
        EntityType::Carrier => vec![
            expect(
                "actors",
                Bound::AtLeast(2),
                count(RoleFilter::Any, EntityType::Actor),
            ),
            expect(
                "format languages",
                Bound::AtLeast(1),
                count(RoleFilter::Far(Role::Format), EntityType::Language),
            ),
        ],
        EntityType::CommunicationNeed => vec![
            expect(
                "actors",
                Bound::AtLeast(2),
                count(RoleFilter::Any, EntityType::Actor),
            ),
            expect(
                "reference languages",
                Bound::Exactly(1),
                count(RoleFilter::Any, EntityType::Language),
            ),
            expect(
                "addressing needs",
                Bound::AtMost(1),
                count(
                    RoleFilter::Far(Role::AddressingNeed),
                    EntityType::CommunicationNeed,
                ),
            ),
        ],
        EntityType::Translation => vec![
            expect(
                "languages",
                Bound::Exactly(2),
                count(RoleFilter::Any, EntityType::Language),
            ),
            expect(
                "performing actors",
                Bound::Exactly(1),
                count(RoleFilter::Any, EntityType::Actor),
            ),
        ],
        EntityType::Address => vec![expect(
            "owners",
            Bound::Exactly(1),
            count(RoleFilter::Near(Role::Identifier), EntityType::Actor),
        )],
        EntityType::Actor => vec![expect(
            "known languages",
            Bound::AtLeast(1),
            count(RoleFilter::Any, EntityType::Language),
        )],
        EntityType::Language => vec![],
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check one entity against the expectations for its kind.
///
/// Returns `None` for unknown ids and for languages, which have none.
pub fn check_entity(graph: &EntityGraph, id: EntityId) -> Option<MultiplicityFinding> {
    let ty = graph.kind(id)?.entity_type();
    let expected = expectations(graph, id, ty);
    if expected.is_empty() {
        return None;
    }

    let detail: Vec<String> = expected
        .iter()
        .filter(|e| !e.bound.holds(e.count))
        .map(|e| format!("expected {} {}, found {}", e.bound, e.what, e.count))
        .collect();

    Some(MultiplicityFinding {
        entity: id,
        entity_type: ty,
        ok: detail.is_empty(),
        detail,
    })
}

/// Check every entity. Never fails; the report says what is off.
pub fn validate(graph: &EntityGraph) -> MultiplicityReport {
    let findings: Vec<MultiplicityFinding> = graph
        .entities()
        .filter_map(|(id, _)| check_entity(graph, id))
        .collect();

    for finding in &findings {
        let name = graph.name(finding.entity);
        if finding.ok {
            info!(kind = %finding.entity_type, %name, "correct multiplicity");
        } else {
            warn!(
                kind = %finding.entity_type,
                %name,
                detail = %finding.detail.join("; "),
                "wrong multiplicity"
            );
        }
    }

    let all_ok = findings.iter().all(|f| f.ok);
    MultiplicityReport { findings, all_ok }
}
