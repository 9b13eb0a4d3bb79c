//! Typed relation queries over the entity graph.
//!
//! These name the relations the interoperability rules talk about ("the
//! languages an actor knows", "the addresses it owns") in terms of
//! [`EntityGraph::related`]. Attribute readers return `false` or `None` for
//! entities of the wrong kind so malformed models degrade instead of panicking.

use crate::entity::{ActorAttrs, CarrierAttrs, EntityId, EntityKind, EntityType, Role};

use super::{EntityGraph, RoleFilter};

impl EntityGraph {
    /// Actors associated with a carrier, need, or translation.
    pub fn actors_of(&self, id: EntityId) -> Vec<EntityId> {
        self.related(id, RoleFilter::Any, Some(EntityType::Actor))
    }

    /// Carriers an actor is reachable through.
    pub fn carriers_of(&self, actor: EntityId) -> Vec<EntityId> {
        self.related(actor, RoleFilter::Any, Some(EntityType::Carrier))
    }

    /// Every language associated with `id`, regardless of role.
    pub fn languages_of(&self, id: EntityId) -> Vec<EntityId> {
        self.related(id, RoleFilter::Any, Some(EntityType::Language))
    }

    /// Languages a carrier carries as message format.
    pub fn format_languages(&self, carrier: EntityId) -> Vec<EntityId> {
        self.related(
            carrier,
            RoleFilter::Far(Role::Format),
            Some(EntityType::Language),
        )
    }

    /// Languages a carrier accepts addresses in.
    pub fn addressing_languages(&self, carrier: EntityId) -> Vec<EntityId> {
        self.related(
            carrier,
            RoleFilter::Far(Role::AddressingLanguage),
            Some(EntityType::Language),
        )
    }

    pub fn direct_super_languages(&self, lang: EntityId) -> Vec<EntityId> {
        self.related(
            lang,
            RoleFilter::Far(Role::SuperLanguage),
            Some(EntityType::Language),
        )
    }

    pub fn direct_carrying_languages(&self, lang: EntityId) -> Vec<EntityId> {
        self.related(
            lang,
            RoleFilter::Far(Role::CarryingLanguage),
            Some(EntityType::Language),
        )
    }

    /// Addresses an actor owns.
    pub fn own_addresses(&self, actor: EntityId) -> Vec<EntityId> {
        self.related(
            actor,
            RoleFilter::Far(Role::Identifier),
            Some(EntityType::Address),
        )
    }

    /// Addresses an actor knows about.
    pub fn known_addresses(&self, actor: EntityId) -> Vec<EntityId> {
        self.related(
            actor,
            RoleFilter::Far(Role::KnownAddress),
            Some(EntityType::Address),
        )
    }

    /// Actors owning an address.
    pub fn address_owners(&self, address: EntityId) -> Vec<EntityId> {
        self.related(
            address,
            RoleFilter::Near(Role::Identifier),
            Some(EntityType::Actor),
        )
    }

    /// Translations touching a language.
    pub fn translations_of(&self, lang: EntityId) -> Vec<EntityId> {
        self.related(lang, RoleFilter::Any, Some(EntityType::Translation))
    }

    pub fn translation_performers(&self, translation: EntityId) -> Vec<EntityId> {
        self.actors_of(translation)
    }

    /// Languages a translation produces when fed `from`.
    ///
    /// With `source`/`target` roles on its language ends the translation is
    /// directed; without them it works both ways.
    pub fn translation_targets(&self, translation: EntityId, from: EntityId) -> Vec<EntityId> {
        let sources = self.related(
            translation,
            RoleFilter::Far(Role::Source),
            Some(EntityType::Language),
        );
        let targets = self.related(
            translation,
            RoleFilter::Far(Role::Target),
            Some(EntityType::Language),
        );
        if sources.is_empty() && targets.is_empty() {
            return self
                .languages_of(translation)
                .into_iter()
                .filter(|&l| l != from)
                .collect();
        }
        if sources.contains(&from) {
            targets
        } else {
            vec![]
        }
    }

    pub fn translation_correct(&self, translation: EntityId) -> bool {
        matches!(
            self.kind(translation),
            Some(EntityKind::Translation { correct: true })
        )
    }

    /// Reference languages of a need. Well-formed needs have exactly one.
    pub fn reference_languages(&self, need: EntityId) -> Vec<EntityId> {
        self.languages_of(need)
    }

    /// Dependent needs that resolve addressing for `need`.
    pub fn sub_needs(&self, need: EntityId) -> Vec<EntityId> {
        self.related(
            need,
            RoleFilter::Far(Role::AddressingNeed),
            Some(EntityType::CommunicationNeed),
        )
    }

    /// All communication needs, in insertion order.
    pub fn needs(&self) -> Vec<EntityId> {
        self.entities_of(EntityType::CommunicationNeed)
    }

    pub fn actor_attrs(&self, id: EntityId) -> Option<ActorAttrs> {
        match self.kind(id) {
            Some(EntityKind::Actor(attrs)) => Some(*attrs),
            _ => None,
        }
    }

    pub fn carrier_attrs(&self, id: EntityId) -> Option<CarrierAttrs> {
        match self.kind(id) {
            Some(EntityKind::Carrier(attrs)) => Some(*attrs),
            _ => None,
        }
    }

    /// Available, non-distorting and non-dropping. `false` for non-participants.
    pub fn reliable(&self, id: EntityId) -> bool {
        self.kind(id)
            .and_then(EntityKind::fidelity)
            .is_some_and(|f| f.reliable())
    }

    /// A fixed carrier needs no addressing.
    pub fn is_fixed(&self, carrier: EntityId) -> bool {
        self.carrier_attrs(carrier).is_some_and(|a| a.fixed)
    }

    pub fn is_satisfied(&self, need: EntityId) -> bool {
        matches!(
            self.kind(need),
            Some(EntityKind::CommunicationNeed { satisfied: true })
        )
    }
}
