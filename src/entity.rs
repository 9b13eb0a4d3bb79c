//! Core entity types of an interoperability model.
//!
//! Every participant, carrier, language, translation, address and
//! communication need is a node of one [`EntityGraph`](crate::graph::EntityGraph)
//! identified by an [`EntityId`]. The kind of a node is a closed enum carrying
//! its own attribute set, so query code pattern-matches instead of probing
//! runtime tags.

use std::collections::BTreeSet;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Identifier of an entity in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Get the underlying index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn node(self) -> NodeIndex {
        NodeIndex::new(self.index())
    }
}

impl From<NodeIndex> for EntityId {
    fn from(idx: NodeIndex) -> Self {
        EntityId(idx.index() as u32)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Ordered set of languages. Ordering by id keeps traces deterministic.
pub type LanguageSet = BTreeSet<EntityId>;

/// Attributes of a communication participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorAttrs {
    #[serde(default = "yes")]
    pub is_available: bool,
    #[serde(default)]
    pub distorts_message: bool,
    #[serde(default)]
    pub drops_message: bool,
}

impl Default for ActorAttrs {
    fn default() -> Self {
        Self {
            is_available: true,
            distorts_message: false,
            drops_message: false,
        }
    }
}

/// Attributes of a message-passing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierAttrs {
    #[serde(default = "yes")]
    pub is_available: bool,
    #[serde(default)]
    pub distorts_message: bool,
    #[serde(default)]
    pub drops_message: bool,
    /// A fixed carrier needs no addressing.
    #[serde(default)]
    pub fixed: bool,
}

impl Default for CarrierAttrs {
    fn default() -> Self {
        Self {
            is_available: true,
            distorts_message: false,
            drops_message: false,
            fixed: false,
        }
    }
}

fn yes() -> bool {
    true
}

/// Availability and fidelity attributes shared by actors and carriers.
pub trait Fidelity {
    fn available(&self) -> bool;
    fn distorts(&self) -> bool;
    fn drops(&self) -> bool;

    /// Available and neither distorting nor dropping messages.
    fn reliable(&self) -> bool {
        self.available() && !self.distorts() && !self.drops()
    }
}

impl Fidelity for ActorAttrs {
    fn available(&self) -> bool {
        self.is_available
    }
    fn distorts(&self) -> bool {
        self.distorts_message
    }
    fn drops(&self) -> bool {
        self.drops_message
    }
}

impl Fidelity for CarrierAttrs {
    fn available(&self) -> bool {
        self.is_available
    }
    fn distorts(&self) -> bool {
        self.distorts_message
    }
    fn drops(&self) -> bool {
        self.drops_message
    }
}

/// Kind of an entity, with the attributes that kind carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EntityKind {
    Actor(ActorAttrs),
    Carrier(CarrierAttrs),
    Language,
    Translation {
        #[serde(default = "yes")]
        correct: bool,
    },
    Address,
    CommunicationNeed {
        #[serde(default)]
        satisfied: bool,
    },
}

impl EntityKind {
    /// The attribute-free tag of this kind.
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityKind::Actor(_) => EntityType::Actor,
            EntityKind::Carrier(_) => EntityType::Carrier,
            EntityKind::Language => EntityType::Language,
            EntityKind::Translation { .. } => EntityType::Translation,
            EntityKind::Address => EntityType::Address,
            EntityKind::CommunicationNeed { .. } => EntityType::CommunicationNeed,
        }
    }

    /// Shared fidelity view, for actors and carriers only.
    pub fn fidelity(&self) -> Option<&dyn Fidelity> {
        match self {
            EntityKind::Actor(attrs) => Some(attrs),
            EntityKind::Carrier(attrs) => Some(attrs),
            _ => None,
        }
    }
}

/// Attribute-free entity tag, used as a query filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Actor,
    Carrier,
    Language,
    Translation,
    Address,
    CommunicationNeed,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityType::Actor => "Actor",
            EntityType::Carrier => "Message-Passing System",
            EntityType::Language => "Language",
            EntityType::Translation => "Language Translation",
            EntityType::Address => "Address",
            EntityType::CommunicationNeed => "Communication Need",
        };
        f.write_str(label)
    }
}

/// A node of the entity graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(flatten)]
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.kind.entity_type()
    }
}

/// Role qualifying one end of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    /// Language a carrier carries as message format.
    Format,
    /// Language a carrier accepts addresses in.
    AddressingLanguage,
    /// The more general language of a generalization.
    SuperLanguage,
    /// The language that carries (encapsulates) another.
    CarryingLanguage,
    /// Address owned by the actor at the other end.
    Identifier,
    /// Address merely known by the actor at the other end.
    KnownAddress,
    /// Dependent need that resolves addressing for the other end.
    AddressingNeed,
    /// Input language of a translation.
    Source,
    /// Output language of a translation.
    Target,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Role::Format => "format",
            Role::AddressingLanguage => "addressingLanguage",
            Role::SuperLanguage => "superLanguage",
            Role::CarryingLanguage => "carryingLanguage",
            Role::Identifier => "identifier",
            Role::KnownAddress => "knownAddress",
            Role::AddressingNeed => "addressingNeed",
            Role::Source => "source",
            Role::Target => "target",
        };
        f.write_str(label)
    }
}
