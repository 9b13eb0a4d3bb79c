//! In-memory entity graph with a name index.
//!
//! Uses `petgraph` for the structure and a `HashMap` for lookups by name.
//! The graph is built once, then read by the evaluation; the only mutation
//! afterwards is [`EntityGraph::set_satisfied`].

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex};
use petgraph::visit::EdgeRef;

use crate::entity::{ActorAttrs, CarrierAttrs, Entity, EntityId, EntityKind, EntityType, Role};

use super::{Association, RoleFilter};

/// Typed entity graph backed by petgraph.
#[derive(Clone, Default)]
pub struct EntityGraph {
    graph: DiGraph<Entity, Association>,
    by_name: HashMap<String, EntityId>,
}

impl EntityGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity. A name already in use is re-pointed to the new entity;
    /// the model loader rejects duplicates before they get here.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let name = entity.name.clone();
        let id = EntityId::from(self.graph.add_node(entity));
        self.by_name.insert(name, id);
        id
    }

    pub fn add_actor(&mut self, name: &str, attrs: ActorAttrs) -> EntityId {
        self.add_entity(Entity::new(name, EntityKind::Actor(attrs)))
    }

    pub fn add_carrier(&mut self, name: &str, attrs: CarrierAttrs) -> EntityId {
        self.add_entity(Entity::new(name, EntityKind::Carrier(attrs)))
    }

    pub fn add_language(&mut self, name: &str) -> EntityId {
        self.add_entity(Entity::new(name, EntityKind::Language))
    }

    pub fn add_translation(&mut self, name: &str, correct: bool) -> EntityId {
        self.add_entity(Entity::new(name, EntityKind::Translation { correct }))
    }

    pub fn add_address(&mut self, name: &str) -> EntityId {
        self.add_entity(Entity::new(name, EntityKind::Address))
    }

    pub fn add_need(&mut self, name: &str) -> EntityId {
        self.add_entity(Entity::new(
            name,
            EntityKind::CommunicationNeed { satisfied: false },
        ))
    }

    /// Associate two entities without roles.
    pub fn associate(&mut self, a: EntityId, b: EntityId) {
        self.link(a, b, Association::plain());
    }

    /// Associate two entities, qualifying either end with a role.
    pub fn associate_roles(
        &mut self,
        a: EntityId,
        role_a: Option<Role>,
        b: EntityId,
        role_b: Option<Role>,
    ) {
        self.link(
            a,
            b,
            Association {
                role_at_source: role_a,
                role_at_target: role_b,
            },
        );
    }

    /// Insert an association. Ends that are not in the graph are ignored.
    pub fn link(&mut self, a: EntityId, b: EntityId, association: Association) {
        if !self.contains(a) || !self.contains(b) {
            tracing::warn!(%a, %b, "association end missing from graph, ignored");
            return;
        }
        self.graph.add_edge(a.node(), b.node(), association);
    }

    /// Entities associated with `id`, filtered by role and type.
    ///
    /// The queried entity itself is never returned. Results are de-duplicated
    /// and ordered by association insertion order; an unknown `id` yields an
    /// empty list.
    pub fn related(
        &self,
        id: EntityId,
        roles: RoleFilter,
        entity_type: Option<EntityType>,
    ) -> Vec<EntityId> {
        if !self.contains(id) {
            return vec![];
        }
        let node = id.node();

        let mut edges: Vec<EdgeIndex> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .chain(self.graph.edges_directed(node, Direction::Incoming))
            .map(|e| e.id())
            .collect();
        edges.sort();
        edges.dedup();

        let mut out: Vec<EntityId> = Vec::new();
        for edge in edges {
            let Some((source, target)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            let from_source = source == node;
            let other = if from_source { target } else { source };
            if other == node {
                continue;
            }
            let (near, far) = self.graph[edge].oriented(from_source);
            if !roles.accepts(near, far) {
                continue;
            }
            if let Some(wanted) = entity_type {
                if self.graph[other].entity_type() != wanted {
                    continue;
                }
            }
            let other = EntityId::from(other);
            if !out.contains(&other) {
                out.push(other);
            }
        }
        out
    }

    /// Check if an entity exists.
    pub fn contains(&self, id: EntityId) -> bool {
        self.graph.node_weight(id.node()).is_some()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.graph.node_weight(id.node())
    }

    pub fn kind(&self, id: EntityId) -> Option<&EntityKind> {
        self.entity(id).map(|e| &e.kind)
    }

    /// Display name, or the raw id for unknown entities.
    pub fn name(&self, id: EntityId) -> String {
        self.entity(id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Look up an entity by name.
    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.by_name.get(name).copied()
    }

    /// All entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.graph
            .node_indices()
            .map(|idx| (EntityId::from(idx), &self.graph[idx]))
    }

    /// All entities of one type, in insertion order.
    pub fn entities_of(&self, entity_type: EntityType) -> Vec<EntityId> {
        self.entities()
            .filter(|(_, e)| e.entity_type() == entity_type)
            .map(|(id, _)| id)
            .collect()
    }

    /// All associations as `(first end, second end, roles)`, in insertion order.
    pub fn associations(&self) -> Vec<(EntityId, EntityId, Association)> {
        self.graph
            .edge_indices()
            .filter_map(|edge| {
                let (a, b) = self.graph.edge_endpoints(edge)?;
                Some((EntityId::from(a), EntityId::from(b), self.graph[edge]))
            })
            .collect()
    }

    /// Mark a communication need satisfied. No-op for any other entity.
    pub fn set_satisfied(&mut self, need: EntityId) {
        if let Some(entity) = self.graph.node_weight_mut(need.node()) {
            if let EntityKind::CommunicationNeed { satisfied } = &mut entity.kind {
                *satisfied = true;
            }
        }
    }

    pub fn entity_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn association_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl std::fmt::Debug for EntityGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityGraph")
            .field("entities", &self.entity_count())
            .field("associations", &self.association_count())
            .finish()
    }
}
