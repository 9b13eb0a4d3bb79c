//! Language compatibility across a hop.
//!
//! A hop from one actor to the next over a carrier can use a language when
//! both actors know it (common languages) or when the sending actor correctly
//! translates an inbound language into one the receiver knows (translated
//! languages). In both cases the language must fit the carrier's formats and
//! stay inside the generalization closure of the need's reference language.
//!
//! The reference-language scope is only defined for needs with exactly one
//! reference language. Needs with none or several get an empty scope, which
//! rejects every language.

use tracing::trace;

use crate::closure::{carrying_closure_of, super_closure_of};
use crate::entity::{EntityId, LanguageSet};
use crate::graph::EntityGraph;

/// Per-need language resolution state.
///
/// Holds the super-closure of the need's reference language so it is computed
/// once per need rather than once per candidate hop.
#[derive(Debug, Clone)]
pub struct LanguageContext<'g> {
    graph: &'g EntityGraph,
    scope: Option<LanguageSet>,
}

impl<'g> LanguageContext<'g> {
    pub fn for_need(graph: &'g EntityGraph, need: EntityId) -> Self {
        let scope = match graph.reference_languages(need).as_slice() {
            [reference] => Some(super_closure_of(graph, *reference)),
            others => {
                trace!(
                    need = %graph.name(need),
                    count = others.len(),
                    "need has no single reference language, language scope is empty"
                );
                None
            }
        };
        Self { graph, scope }
    }

    /// Super-closure of the single reference language, if there is one.
    pub fn scope(&self) -> Option<&LanguageSet> {
        self.scope.as_ref()
    }

    fn in_scope(&self, lang: EntityId) -> bool {
        self.scope.as_ref().is_some_and(|s| s.contains(&lang))
    }

    /// Inbound languages both actors know that the carrier can carry.
    pub fn common_languages(
        &self,
        curr: EntityId,
        next: EntityId,
        carrier: EntityId,
        inbound: &LanguageSet,
    ) -> LanguageSet {
        if self.scope.is_none() {
            return LanguageSet::new();
        }
        let curr_langs = self.graph.languages_of(curr);
        let next_langs = self.graph.languages_of(next);

        inbound
            .iter()
            .copied()
            .filter(|lang| {
                curr_langs.contains(lang)
                    && next_langs.contains(lang)
                    && compatible_with_carrier(self.graph, *lang, carrier)
                    && self.in_scope(*lang)
            })
            .collect()
    }

    /// Languages `curr` can produce for `next` through a correct translation
    /// of an inbound language.
    pub fn translated_languages(
        &self,
        curr: EntityId,
        next: EntityId,
        carrier: EntityId,
        inbound: &LanguageSet,
    ) -> LanguageSet {
        let mut out = LanguageSet::new();
        if self.scope.is_none() {
            return out;
        }
        let next_langs = self.graph.languages_of(next);

        for lang in self.graph.languages_of(curr) {
            if !inbound.contains(&lang) || !self.in_scope(lang) {
                continue;
            }
            for translation in self.graph.translations_of(lang) {
                if !self.graph.translation_correct(translation)
                    || !self.graph.translation_performers(translation).contains(&curr)
                {
                    continue;
                }
                for target in self.graph.translation_targets(translation, lang) {
                    if target != lang
                        && next_langs.contains(&target)
                        && self.in_scope(target)
                        && compatible_with_carrier(self.graph, target, carrier)
                    {
                        out.insert(target);
                    }
                }
            }
        }
        out
    }

    /// Union of common and translated languages for the hop.
    pub fn allowed_languages(
        &self,
        curr: EntityId,
        next: EntityId,
        carrier: EntityId,
        inbound: &LanguageSet,
    ) -> LanguageSet {
        let mut allowed = self.common_languages(curr, next, carrier, inbound);
        allowed.extend(self.translated_languages(curr, next, carrier, inbound));
        allowed
    }
}

/// A language fits a carrier when something in its carrying closure is one of
/// the carrier's format languages.
pub fn compatible_with_carrier(graph: &EntityGraph, lang: EntityId, carrier: EntityId) -> bool {
    let formats = graph.format_languages(carrier);
    carrying_closure_of(graph, lang)
        .iter()
        .any(|l| formats.contains(l))
}

/// One-shot form of [`LanguageContext::allowed_languages`].
pub fn allowed_languages(
    graph: &EntityGraph,
    need: EntityId,
    curr: EntityId,
    next: EntityId,
    carrier: EntityId,
    inbound: &LanguageSet,
) -> LanguageSet {
    LanguageContext::for_need(graph, need).allowed_languages(curr, next, carrier, inbound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ActorAttrs, CarrierAttrs, Role};

    struct Hop {
        g: EntityGraph,
        need: EntityId,
        a: EntityId,
        b: EntityId,
        bus: EntityId,
    }

    /// Two actors on one carrier; the carrier carries `wire`.
    fn hop() -> Hop {
        let mut g = EntityGraph::new();
        let need = g.add_need("N");
        let a = g.add_actor("A", ActorAttrs::default());
        let b = g.add_actor("B", ActorAttrs::default());
        let bus = g.add_carrier("Bus", CarrierAttrs::default());
        let wire = g.add_language("wire");
        g.associate(a, bus);
        g.associate(b, bus);
        g.associate_roles(bus, None, wire, Some(Role::Format));
        Hop { g, need, a, b, bus }
    }

    fn set(items: &[EntityId]) -> LanguageSet {
        items.iter().copied().collect()
    }

    #[test]
    fn common_language_carried_by_encapsulation() {
        let Hop { mut g, need, a, b, bus } = hop();
        let wire = g.find("wire").unwrap();
        let json = g.add_language("json");
        g.associate_roles(json, None, wire, Some(Role::CarryingLanguage));
        g.associate(a, json);
        g.associate(b, json);
        g.associate(need, json);

        let ctx = LanguageContext::for_need(&g, need);
        assert_eq!(
            ctx.common_languages(a, b, bus, &set(&[json])),
            set(&[json])
        );
        // Not inbound: filtered.
        assert!(ctx.common_languages(a, b, bus, &LanguageSet::new()).is_empty());
    }

    #[test]
    fn language_outside_reference_scope_is_rejected() {
        let Hop { mut g, need, a, b, bus } = hop();
        let wire = g.find("wire").unwrap();
        let other_ref = g.add_language("reference");
        g.associate(a, wire);
        g.associate(b, wire);
        g.associate(need, other_ref);

        let ctx = LanguageContext::for_need(&g, need);
        assert!(ctx.allowed_languages(a, b, bus, &set(&[wire])).is_empty());
    }

    #[test]
    fn super_language_of_reference_is_in_scope() {
        let Hop { mut g, need, a, b, bus } = hop();
        let wire = g.find("wire").unwrap();
        let general = g.add_language("general");
        g.associate_roles(general, None, wire, Some(Role::SuperLanguage));
        g.associate(a, general);
        g.associate(b, general);
        g.associate(need, general);
        g.associate_roles(general, None, wire, Some(Role::CarryingLanguage));

        let ctx = LanguageContext::for_need(&g, need);
        assert_eq!(ctx.scope(), Some(&set(&[general, wire])));
        assert_eq!(
            ctx.allowed_languages(a, b, bus, &set(&[general])),
            set(&[general])
        );
    }

    #[test]
    fn translation_bridges_disjoint_vocabularies() {
        let Hop { mut g, need, a, b, bus } = hop();
        let wire = g.find("wire").unwrap();
        let reference = g.add_language("reference");
        let src = g.add_language("src");
        g.associate_roles(reference, None, src, Some(Role::SuperLanguage));
        g.associate_roles(reference, None, wire, Some(Role::SuperLanguage));
        g.associate(need, reference);
        g.associate(a, src);
        g.associate(b, wire);

        let t = g.add_translation("src->wire", true);
        g.associate(t, a);
        g.associate_roles(t, None, src, Some(Role::Source));
        g.associate_roles(t, None, wire, Some(Role::Target));

        let ctx = LanguageContext::for_need(&g, need);
        let inbound = set(&[src]);
        assert!(ctx.common_languages(a, b, bus, &inbound).is_empty());
        assert_eq!(ctx.translated_languages(a, b, bus, &inbound), set(&[wire]));
        // The receiver cannot translate back on A's behalf.
        assert!(ctx.translated_languages(b, a, bus, &set(&[wire])).is_empty());
    }

    #[test]
    fn incorrect_or_foreign_translation_is_ignored() {
        let Hop { mut g, need, a, b, bus } = hop();
        let wire = g.find("wire").unwrap();
        let src = g.add_language("src");
        g.associate_roles(src, None, wire, Some(Role::SuperLanguage));
        g.associate(need, src);
        g.associate(a, src);
        g.associate(b, wire);

        let broken = g.add_translation("broken", false);
        g.associate(broken, a);
        g.associate(broken, src);
        g.associate(broken, wire);

        let foreign = g.add_translation("foreign", true);
        g.associate(foreign, b);
        g.associate(foreign, src);
        g.associate(foreign, wire);

        let ctx = LanguageContext::for_need(&g, need);
        assert!(ctx.translated_languages(a, b, bus, &set(&[src])).is_empty());
    }

    #[test]
    fn two_reference_languages_yield_nothing() {
        let Hop { mut g, need, a, b, bus } = hop();
        let wire = g.find("wire").unwrap();
        let extra = g.add_language("extra");
        g.associate(a, wire);
        g.associate(b, wire);
        g.associate(need, wire);
        g.associate(need, extra);

        let ctx = LanguageContext::for_need(&g, need);
        assert!(ctx.scope().is_none());
        assert!(allowed_languages(&g, need, a, b, bus, &set(&[wire])).is_empty());
    }

    #[test]
    fn carrier_compatibility() {
        let Hop { mut g, bus, .. } = hop();
        let wire = g.find("wire").unwrap();
        let radio = g.add_language("radio");
        assert!(compatible_with_carrier(&g, wire, bus));
        assert!(!compatible_with_carrier(&g, radio, bus));
    }
}
