//! Model documents: loading an entity graph from JSON and saving it back.
//!
//! A document is a package of entities and associations, optionally holding
//! nested packages. Association ends refer to entities by name, so names are
//! unique across the whole document. Associations may refer to entities in
//! any package.
//!
//! ```json
//! {
//!   "name": "plant",
//!   "entities": [
//!     { "name": "PLC", "kind": "Actor" },
//!     { "name": "Fieldbus", "kind": "Carrier", "fixed": true },
//!     { "name": "Modbus", "kind": "Language" }
//!   ],
//!   "associations": [
//!     { "from": "PLC", "to": "Fieldbus" },
//!     { "from": "Fieldbus", "to": "Modbus", "toRole": "format" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, Role};
use crate::error::ModelError;
use crate::graph::{Association, EntityGraph};

/// Association between two named entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationDoc {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_role: Option<Role>,
}

/// A package of model elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Package {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub associations: Vec<AssociationDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
}

/// Counters from building a graph out of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    pub packages: usize,
    pub entities: usize,
    pub associations: usize,
    /// Associations naming an entity that does not exist.
    pub skipped_associations: usize,
}

impl Package {
    /// This package and all nested ones, depth first.
    pub fn walk(&self) -> Vec<&Package> {
        let mut out = vec![self];
        for child in &self.packages {
            out.extend(child.walk());
        }
        out
    }

    /// Build an entity graph. Entities are added in depth-first package order,
    /// then associations in the same order.
    pub fn to_graph(&self) -> Result<(EntityGraph, LoadStats), ModelError> {
        let packages = self.walk();
        let mut graph = EntityGraph::new();
        let mut stats = LoadStats {
            packages: packages.len(),
            ..Default::default()
        };

        let mut seen = HashSet::new();
        for package in &packages {
            for entity in &package.entities {
                if !seen.insert(entity.name.as_str()) {
                    return Err(ModelError::DuplicateEntity {
                        name: entity.name.clone(),
                    });
                }
                graph.add_entity(entity.clone());
                stats.entities += 1;
            }
        }

        for package in &packages {
            for assoc in &package.associations {
                let (Some(from), Some(to)) = (graph.find(&assoc.from), graph.find(&assoc.to))
                else {
                    tracing::warn!(
                        package = %package.name,
                        from = %assoc.from,
                        to = %assoc.to,
                        "association refers to an unknown entity, skipped"
                    );
                    stats.skipped_associations += 1;
                    continue;
                };
                graph.associate_roles(from, assoc.from_role, to, assoc.to_role);
                stats.associations += 1;
            }
        }

        Ok((graph, stats))
    }

    /// Flat document of the graph's current state.
    pub fn from_graph(name: &str, graph: &EntityGraph) -> Self {
        let entities = graph.entities().map(|(_, e)| e.clone()).collect();
        let associations = graph
            .associations()
            .into_iter()
            .map(|(from, to, Association { role_at_source, role_at_target })| AssociationDoc {
                from: graph.name(from),
                to: graph.name(to),
                from_role: role_at_source,
                to_role: role_at_target,
            })
            .collect();
        Self {
            name: name.to_string(),
            entities,
            associations,
            packages: Vec::new(),
        }
    }
}

/// Parse a model document.
pub fn parse_model(json: &str) -> Result<(EntityGraph, LoadStats), ModelError> {
    let package: Package = serde_json::from_str(json).map_err(|e| ModelError::Parse {
        message: e.to_string(),
    })?;
    package.to_graph()
}

/// Read and parse a model document from disk.
pub fn load_model(path: &Path) -> Result<(EntityGraph, LoadStats), ModelError> {
    let json = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let (graph, stats) = parse_model(&json)?;
    tracing::info!(
        path = %path.display(),
        entities = stats.entities,
        associations = stats.associations,
        skipped = stats.skipped_associations,
        "model loaded"
    );
    Ok((graph, stats))
}

/// Write the graph, including `satisfied` flags, as a model document.
pub fn save_model(graph: &EntityGraph, name: &str, path: &Path) -> Result<(), ModelError> {
    let doc = Package::from_graph(name, graph);
    let json = serde_json::to_string_pretty(&doc).map_err(|e| ModelError::Serialize {
        message: e.to_string(),
    })?;
    std::fs::write(path, json).map_err(|source| ModelError::Write {
        path: path.display().to_string(),
        source,
    })?;
    tracing::info!(path = %path.display(), "model saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;

    const NESTED: &str = r#"{
        "name": "plant",
        "entities": [
            { "name": "PLC", "kind": "Actor" },
            { "name": "Modbus", "kind": "Language" }
        ],
        "associations": [
            { "from": "PLC", "to": "Modbus" },
            { "from": "Fieldbus", "to": "Modbus", "toRole": "format" }
        ],
        "packages": [
            {
                "name": "field",
                "entities": [
                    { "name": "Fieldbus", "kind": "Carrier", "fixed": true },
                    { "name": "RTU", "kind": "Actor", "dropsMessage": true }
                ],
                "associations": [
                    { "from": "RTU", "to": "Fieldbus" },
                    { "from": "RTU", "to": "Ghost" }
                ]
            }
        ]
    }"#;

    #[test]
    fn nested_packages_are_flattened() {
        let (g, stats) = parse_model(NESTED).unwrap();
        assert_eq!(stats.packages, 2);
        assert_eq!(stats.entities, 4);
        assert_eq!(stats.associations, 3);
        assert_eq!(stats.skipped_associations, 1);

        let bus = g.find("Fieldbus").unwrap();
        let modbus = g.find("Modbus").unwrap();
        assert!(g.is_fixed(bus));
        assert_eq!(g.format_languages(bus), vec![modbus]);
        assert!(!g.reliable(g.find("RTU").unwrap()));
        assert_eq!(g.entities_of(EntityType::Actor).len(), 2);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let json = r#"{
            "entities": [
                { "name": "X", "kind": "Actor" },
                { "name": "X", "kind": "Language" }
            ]
        }"#;
        let err = parse_model(json).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateEntity { ref name } if name == "X"));
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let json = r#"{ "entities": [ { "name": "X", "kind": "Router" } ] }"#;
        assert!(matches!(
            parse_model(json).unwrap_err(),
            ModelError::Parse { .. }
        ));
    }

    #[test]
    fn from_graph_keeps_roles() {
        let (g, _) = parse_model(NESTED).unwrap();
        let doc = Package::from_graph("copy", &g);
        assert_eq!(doc.entities.len(), 4);
        let format = doc
            .associations
            .iter()
            .find(|a| a.to_role == Some(Role::Format))
            .unwrap();
        assert_eq!(format.from, "Fieldbus");
        assert_eq!(format.to, "Modbus");
    }
}
