//! Human-readable renderings of an evaluation: the plain-text results log and
//! a Graphviz view of the witnessing paths.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use petgraph::dot::{Config, Dot};
use petgraph::graph::{NodeIndex, UnGraph};

use crate::entity::{EntityId, EntityType};
use crate::evaluator::{EvaluationReport, PairReport};
use crate::graph::EntityGraph;

const RULE: &str = "------------------------------------";

fn banner(out: &mut String, title: &str) {
    let _ = write!(out, "\n{RULE}\n{title}\n{RULE}\n\n");
}

/// Render the results log.
///
/// ```text
/// ------------------------------------
/// Interoperability rules checks.
/// ------------------------------------
///
/// Communication Need: HMI-PLC
///
/// Possible communication path:
/// -> HMI
/// -> Ethernet
/// -> PLC
///
/// Communication Need::HMI-PLC --> Satisfied
/// ```
pub fn render_text(graph: &EntityGraph, report: &EvaluationReport) -> String {
    let mut out = String::new();
    banner(
        &mut out,
        "Start. Interoperability metamodel conformance evaluation.",
    );

    banner(&mut out, "Multiplicity rules checks.");
    for finding in &report.multiplicity.findings {
        let verdict = if finding.ok { "Correct" } else { "Wrong" };
        let _ = writeln!(
            out,
            "{verdict} multiplicity for {}::{}.",
            finding.entity_type,
            graph.name(finding.entity)
        );
        for detail in &finding.detail {
            let _ = writeln!(out, "    {detail}");
        }
    }

    banner(&mut out, "Interoperability rules checks.");
    for need in &report.needs {
        let name = graph.name(need.need);
        let _ = writeln!(out, "Communication Need: {name}\n");
        for pair in &need.pairs {
            render_pair(&mut out, graph, &name, pair);
        }
    }

    banner(&mut out, "Summary.");
    let stats = &report.stats;
    let _ = writeln!(
        out,
        "Communication needs satisfied: {} of {}",
        stats.needs_satisfied,
        report.needs.len()
    );
    let _ = writeln!(out, "Sub-need hops: {}", stats.sub_need_hops);
    let _ = writeln!(out, "Actors involved: {}", stats.actors.len());
    let _ = writeln!(out, "Message-passing systems involved: {}", stats.carriers.len());
    let _ = writeln!(out, "Languages involved: {}", stats.languages.len());
    out
}

fn render_pair(out: &mut String, graph: &EntityGraph, need: &str, pair: &PairReport) {
    if let Some(path) = &pair.witness {
        let _ = writeln!(out, "Possible communication path:");
        for node in path.nodes() {
            let _ = writeln!(out, "-> {}", graph.name(node));
        }
        let _ = writeln!(out);
    }

    let verdict = if pair.satisfied {
        "Satisfied"
    } else {
        "Not satisfied"
    };
    let _ = writeln!(out, "Communication Need::{need} --> {verdict}");
    if let Some(diagnosis) = pair.diagnosis {
        let _ = writeln!(
            out,
            "    {} / {}: {diagnosis}",
            graph.name(pair.source),
            graph.name(pair.target)
        );
    }
    if pair.truncated {
        let _ = writeln!(out, "    search truncated after {} steps", pair.steps);
    }
    let _ = writeln!(out, "\n");
}

/// Render the union of all witnessing paths as a Graphviz graph.
///
/// Nodes are actors (ellipses) and carriers (boxes); an edge joins entities
/// adjacent on some path.
pub fn render_dot(graph: &EntityGraph, report: &EvaluationReport) -> String {
    let mut paths: UnGraph<String, ()> = UnGraph::new_undirected();
    let mut nodes: HashMap<EntityId, NodeIndex> = HashMap::new();

    let witnesses = report
        .needs
        .iter()
        .flat_map(|n| &n.pairs)
        .filter_map(|p| p.witness.as_ref());

    for witness in witnesses {
        let ids: Vec<NodeIndex> = witness
            .nodes()
            .into_iter()
            .map(|id| {
                *nodes
                    .entry(id)
                    .or_insert_with(|| paths.add_node(graph.name(id)))
            })
            .collect();
        for pair in ids.windows(2) {
            if paths.find_edge(pair[0], pair[1]).is_none() {
                paths.add_edge(pair[0], pair[1], ());
            }
        }
    }

    let carriers: HashSet<NodeIndex> = nodes
        .iter()
        .filter(|(id, _)| graph.kind(**id).map(|k| k.entity_type()) == Some(EntityType::Carrier))
        .map(|(_, idx)| *idx)
        .collect();

    format!(
        "{:?}",
        Dot::with_attr_getters(
            &paths,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &|_, _| String::new(),
            &|_, (idx, label)| {
                let shape = if carriers.contains(&idx) { "box" } else { "ellipse" };
                format!("label = \"{}\" shape = {shape}", dot_escape(label))
            },
        )
    )
}

/// Escape a name for a double-quoted DOT string.
fn dot_escape(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}
