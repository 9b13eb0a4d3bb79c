//! Export types for serializing evaluation results.
//!
//! These types provide human-readable, label-resolved representations of an
//! [`EvaluationReport`] suitable for JSON export: entity ids are replaced by
//! names so the report can be read without the graph.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::error::OutputError;
use crate::evaluator::{EvaluationReport, NeedReport, PairReport};
use crate::graph::EntityGraph;
use crate::search::Hop;

/// Exported hop with resolved names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopExport {
    /// Sending actor.
    pub from: String,
    /// Carrier crossed.
    pub carrier: String,
    /// Receiving actor.
    pub to: String,
    /// Languages usable across the hop.
    pub languages: Vec<String>,
}

/// Exported actor-pair result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairExport {
    pub source: String,
    pub target: String,
    pub satisfied: bool,
    /// Number of distinct successful branches.
    pub paths_found: usize,
    pub steps: usize,
    pub truncated: bool,
    /// Witnessing path, empty when unsatisfied.
    pub path: Vec<HopExport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
}

/// Exported need result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedExport {
    pub name: String,
    pub satisfied: bool,
    pub pairs: Vec<PairExport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_needs_satisfied: Vec<String>,
}

/// Exported multiplicity finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplicityExport {
    /// Entity kind label.
    pub kind: String,
    pub name: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detail: Vec<String>,
}

/// Exported aggregate counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsExport {
    pub needs_total: usize,
    pub needs_satisfied: usize,
    pub sub_need_hops: usize,
    /// Actors on any witnessing path.
    pub actors: Vec<String>,
    pub carriers: Vec<String>,
    pub languages: Vec<String>,
}

/// The full report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportExport {
    /// Name of the model the report was computed for.
    pub model: String,
    pub multiplicity_ok: bool,
    pub multiplicity: Vec<MultiplicityExport>,
    pub needs: Vec<NeedExport>,
    pub stats: StatsExport,
}

impl HopExport {
    pub fn from_hop(graph: &EntityGraph, hop: &Hop) -> Self {
        Self {
            from: graph.name(hop.from),
            carrier: graph.name(hop.carrier),
            to: graph.name(hop.to),
            languages: hop.languages.iter().map(|&l| graph.name(l)).collect(),
        }
    }
}

impl PairExport {
    pub fn from_pair(graph: &EntityGraph, pair: &PairReport) -> Self {
        let path = pair
            .witness
            .iter()
            .flat_map(|w| &w.hops)
            .map(|hop| HopExport::from_hop(graph, hop))
            .collect();
        Self {
            source: graph.name(pair.source),
            target: graph.name(pair.target),
            satisfied: pair.satisfied,
            paths_found: pair.paths_found,
            steps: pair.steps,
            truncated: pair.truncated,
            path,
            diagnosis: pair.diagnosis.map(|d| d.label().to_string()),
        }
    }
}

impl NeedExport {
    pub fn from_need(graph: &EntityGraph, need: &NeedReport) -> Self {
        Self {
            name: graph.name(need.need),
            satisfied: need.satisfied,
            pairs: need
                .pairs
                .iter()
                .map(|p| PairExport::from_pair(graph, p))
                .collect(),
            sub_needs_satisfied: need
                .sub_needs_satisfied
                .iter()
                .map(|&n| graph.name(n))
                .collect(),
        }
    }
}

impl ReportExport {
    pub fn build(graph: &EntityGraph, model: &str, report: &EvaluationReport) -> Self {
        let names = |ids: &BTreeSet<EntityId>| -> Vec<String> {
            ids.iter().map(|&id| graph.name(id)).collect()
        };

        Self {
            model: model.to_string(),
            multiplicity_ok: report.multiplicity.all_ok,
            multiplicity: report
                .multiplicity
                .findings
                .iter()
                .map(|f| MultiplicityExport {
                    kind: f.entity_type.to_string(),
                    name: graph.name(f.entity),
                    ok: f.ok,
                    detail: f.detail.clone(),
                })
                .collect(),
            needs: report
                .needs
                .iter()
                .map(|n| NeedExport::from_need(graph, n))
                .collect(),
            stats: StatsExport {
                needs_total: report.needs.len(),
                needs_satisfied: report.stats.needs_satisfied,
                sub_need_hops: report.stats.sub_need_hops,
                actors: names(&report.stats.actors),
                carriers: names(&report.stats.carriers),
                languages: names(&report.stats.languages),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, OutputError> {
        serde_json::to_string_pretty(self).map_err(|e| OutputError::Serialize {
            message: e.to_string(),
        })
    }
}
