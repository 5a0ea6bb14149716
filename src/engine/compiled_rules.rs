//! Rule compilation and validation.
//!
//! This module holds the *static* side of the engine. Routines, features and
//! the dispatch table are declared with plain names (`&'static str`) for
//! glyphs, classes and routines; compilation resolves every name once,
//! checks every arity and chain target, and leaves an immutable structure that
//! shaping runs only read.
//!
//! ## Invariants
//!
//! - `RoutineId` is an index into `CompiledRules::routines`.
//! - Every compiled rule has at least one captured item, and
//!   `first_captured <= last_captured`.
//! - A routine reached through a chain contains no chain rule itself, so chain
//!   depth is at most one.

use super::dispatch::RunArity;
use super::registry::{ClassRegistry, GlyphClass};
use crate::{
    Action, Category, Dispatch, Element, Feature, Filter, GlyphToken, MatchArityError, Offset, Output, Routine,
    SetupError,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Routine identifier (index into the routines vector).
pub(crate) type RoutineId = usize;

bitflags::bitflags! {
    /// Token categories a routine skips while matching.
    ///
    /// Bit values follow the OpenType lookup flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LookupFlags: u16 {
        const IGNORE_BASES     = 1 << 1;
        const IGNORE_LIGATURES = 1 << 2;
        const IGNORE_MARKS     = 1 << 3;
    }
}

impl Default for LookupFlags {
    fn default() -> Self {
        LookupFlags::empty()
    }
}

bitflags::bitflags! {
    /// Token categories present in a sequence.
    ///
    /// Features declare the categories they need; the shaper skips a feature
    /// when the scanned sequence lacks them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SequenceMask: u8 {
        const BASES     = 1 << 0;
        const MARKS     = 1 << 1;
        const LIGATURES = 1 << 2;
        const SENTINELS = 1 << 3;
    }
}

impl Default for SequenceMask {
    fn default() -> Self {
        SequenceMask::empty()
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Matcher {
    Glyph(String),
    Class(Arc<GlyphClass>),
}

impl Matcher {
    pub(crate) fn matches(&self, token: &GlyphToken) -> bool {
        match self {
            Matcher::Glyph(name) => token.name == *name,
            Matcher::Class(class) => class.contains(&token.name),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledItem {
    pub matcher: Matcher,
    pub captured: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CompiledFilter {
    pub flags: LookupFlags,
    pub mark_set: Option<Arc<GlyphClass>>,
    pub skip: Option<Arc<GlyphClass>>,
}

#[derive(Debug, Clone)]
pub(crate) enum CompiledAction {
    Substitute(Vec<Output>),
    Ligate(String),
    Insert(String, Category),
    Position(Vec<Offset>),
    Chain(RoutineId),
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub name: &'static str,
    pub items: Vec<CompiledItem>,
    pub first_captured: usize,
    pub action: CompiledAction,
    pub filter: Option<CompiledFilter>,
}

impl CompiledRule {
    /// Item indices of the captured elements, in order.
    pub(crate) fn captured(&self) -> impl Iterator<Item = usize> + '_ {
        self.items.iter().enumerate().filter(|(_, item)| item.captured).map(|(k, _)| k)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledRoutine {
    pub name: &'static str,
    pub filter: CompiledFilter,
    pub rules: Vec<CompiledRule>,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledFeature {
    pub tag: &'static str,
    pub routines: Vec<RoutineId>,
    pub requires: SequenceMask,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledDispatch {
    pub sentinel: &'static str,
    pub qualifying: Arc<GlyphClass>,
    pub filter: CompiledFilter,
    pub arms: Vec<(RunArity, RoutineId)>,
    pub flag_tag: &'static str,
    pub follower_tag: &'static str,
}

/// Compiled routines, features and dispatch table.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub(crate) routines: Vec<CompiledRoutine>,
    pub(crate) by_name: HashMap<&'static str, RoutineId>,
    pub(crate) features: Vec<CompiledFeature>,
    pub(crate) dispatch: CompiledDispatch,
}

impl CompiledRules {
    /// Compile `routines`, `features` (kept in the given order) and
    /// `dispatch` against `registry`.
    pub fn new(
        registry: &ClassRegistry,
        routines: &[Routine],
        features: &[Feature],
        dispatch: &Dispatch,
    ) -> Result<Self, SetupError> {
        let mut by_name = HashMap::new();
        for (id, routine) in routines.iter().enumerate() {
            if by_name.insert(routine.name, id).is_some() {
                return Err(SetupError::DuplicateRoutine(routine.name.to_string()));
            }
        }

        let compiled: Vec<CompiledRoutine> = routines
            .iter()
            .map(|routine| compile_routine(registry, &by_name, routine))
            .collect::<Result<_, _>>()?;

        // Chain depth is fixed at one.
        for routine in &compiled {
            for rule in &routine.rules {
                if let CompiledAction::Chain(target) = rule.action {
                    let target = &compiled[target];
                    if target.rules.iter().any(|r| matches!(r.action, CompiledAction::Chain(_))) {
                        return Err(SetupError::NestedChain {
                            routine: routine.name.to_string(),
                            target: target.name.to_string(),
                        });
                    }
                }
            }
        }

        let features = features
            .iter()
            .map(|feature| {
                let routines = feature
                    .routines
                    .iter()
                    .map(|name| lookup(&by_name, name, feature.tag))
                    .collect::<Result<_, _>>()?;
                Ok(CompiledFeature { tag: feature.tag, routines, requires: feature.requires })
            })
            .collect::<Result<_, SetupError>>()?;

        let dispatch = CompiledDispatch {
            sentinel: dispatch.sentinel,
            qualifying: Arc::clone(registry.resolve(dispatch.qualifying)?),
            filter: compile_filter(registry, &dispatch.filter)?,
            arms: dispatch
                .arms
                .iter()
                .map(|(arity, name)| Ok((*arity, lookup(&by_name, name, "<dispatch>")?)))
                .collect::<Result<_, SetupError>>()?,
            flag_tag: dispatch.flag_tag,
            follower_tag: dispatch.follower_tag,
        };

        Ok(CompiledRules { routines: compiled, by_name, features, dispatch })
    }

    pub(crate) fn routine_id(&self, name: &str) -> Option<RoutineId> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn feature(&self, tag: &str) -> Option<&CompiledFeature> {
        self.features.iter().find(|f| f.tag == tag)
    }

    pub fn routine_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.routines.iter().map(|r| r.name)
    }

    pub fn feature_tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.features.iter().map(|f| f.tag)
    }
}

fn lookup(by_name: &HashMap<&'static str, RoutineId>, name: &str, referenced_by: &str) -> Result<RoutineId, SetupError> {
    by_name.get(name).copied().ok_or_else(|| SetupError::UnknownRoutine {
        name: name.to_string(),
        referenced_by: referenced_by.to_string(),
    })
}

fn compile_filter(registry: &ClassRegistry, filter: &Filter) -> Result<CompiledFilter, SetupError> {
    let class = |name: Option<&'static str>| -> Result<Option<Arc<GlyphClass>>, SetupError> {
        match name {
            Some(name) => Ok(Some(Arc::clone(registry.resolve(name)?))),
            None => Ok(None),
        }
    };
    Ok(CompiledFilter { flags: filter.flags, mark_set: class(filter.mark_set)?, skip: class(filter.skip)? })
}

fn compile_routine(
    registry: &ClassRegistry,
    by_name: &HashMap<&'static str, RoutineId>,
    routine: &Routine,
) -> Result<CompiledRoutine, SetupError> {
    let filter = compile_filter(registry, &routine.filter)?;
    let mut rules = Vec::with_capacity(routine.rules.len());

    for rule in &routine.rules {
        let items = rule
            .pattern
            .iter()
            .map(|item| {
                let matcher = match item.element {
                    Element::Glyph(name) => Matcher::Glyph(name.to_string()),
                    Element::Class(name) => Matcher::Class(Arc::clone(registry.resolve(name)?)),
                };
                Ok(CompiledItem { matcher, captured: item.captured })
            })
            .collect::<Result<Vec<_>, SetupError>>()?;

        let captured = items.iter().filter(|i| i.captured).count();
        let first_captured = items
            .iter()
            .position(|i| i.captured)
            .ok_or_else(|| SetupError::NoCapture { routine: routine.name.to_string(), rule: rule.name.to_string() })?;

        let arity = |supplied: usize, kind: &'static str| MatchArityError {
            routine: routine.name.to_string(),
            rule: rule.name.to_string(),
            captured,
            supplied,
            kind,
        };

        let action = match &rule.action {
            Action::Substitute(outputs) => {
                if outputs.len() != captured {
                    return Err(arity(outputs.len(), "replacements").into());
                }
                CompiledAction::Substitute(outputs.clone())
            }
            Action::Position(deltas) => {
                if deltas.len() != captured {
                    return Err(arity(deltas.len(), "offsets").into());
                }
                CompiledAction::Position(deltas.clone())
            }
            Action::Ligate(glyph) => {
                if captured < 2 {
                    return Err(arity(1, "ligature").into());
                }
                CompiledAction::Ligate(glyph.to_string())
            }
            Action::Insert(glyph, category) => CompiledAction::Insert(glyph.to_string(), *category),
            Action::Chain(target) => CompiledAction::Chain(lookup(by_name, target, routine.name)?),
        };

        let filter = match &rule.filter {
            Some(f) => Some(compile_filter(registry, f)?),
            None => None,
        };

        rules.push(CompiledRule { name: rule.name, items, first_captured, action, filter });
    }

    Ok(CompiledRoutine { name: routine.name, filter, rules })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassExpr, Filter, RegistryBuilder, Rule};

    fn registry() -> ClassRegistry {
        let mut builder = RegistryBuilder::new(["sdb", "tdb", "BEm1"]);
        builder.define("dots", ClassExpr::Matching(regex!(r"^[st]db$"))).unwrap();
        builder.build().unwrap()
    }

    fn dispatch() -> Dispatch {
        Dispatch {
            sentinel: "SENTINEL",
            qualifying: "dots",
            filter: Filter::default(),
            arms: Vec::new(),
            flag_tag: "collides",
            follower_tag: "attached",
        }
    }

    fn routine(name: &'static str, rules: Vec<Rule>) -> Routine {
        Routine { name, filter: Filter::default(), rules }
    }

    #[test]
    fn substitution_arity_mismatch_is_rejected() {
        let bad = rule!(
            name: "two_for_one",
            pattern: [cap!(class "dots"), cap!(glyph "BEm1")],
            action: Action::Substitute(vec![Output::Keep]),
        );
        let err = CompiledRules::new(&registry(), &[routine("r", vec![bad])], &[], &dispatch()).unwrap_err();
        assert_eq!(
            err,
            SetupError::Arity(MatchArityError {
                routine: "r".into(),
                rule: "two_for_one".into(),
                captured: 2,
                supplied: 1,
                kind: "replacements",
            })
        );
    }

    #[test]
    fn positioning_arity_mismatch_is_rejected() {
        let bad = rule!(
            name: "short",
            pattern: [cap!(class "dots"), cap!(class "dots"), ctx!(glyph "SENTINEL")],
            action: Action::Position(vec![Offset::horizontal(10)]),
        );
        let err = CompiledRules::new(&registry(), &[routine("r", vec![bad])], &[], &dispatch()).unwrap_err();
        assert!(matches!(err, SetupError::Arity(MatchArityError { captured: 2, supplied: 1, .. })));
    }

    #[test]
    fn unknown_class_is_rejected() {
        let bad = rule!(name: "x", pattern: [cap!(class "nope")], action: Action::Substitute(vec![Output::Keep]));
        let err = CompiledRules::new(&registry(), &[routine("r", vec![bad])], &[], &dispatch()).unwrap_err();
        assert!(matches!(err, SetupError::Definition(_)));
    }

    #[test]
    fn rule_without_capture_is_rejected() {
        let bad = rule!(name: "ctx_only", pattern: [ctx!(class "dots")], action: Action::Substitute(vec![]));
        let err = CompiledRules::new(&registry(), &[routine("r", vec![bad])], &[], &dispatch()).unwrap_err();
        assert_eq!(err, SetupError::NoCapture { routine: "r".into(), rule: "ctx_only".into() });
    }

    #[test]
    fn nested_chain_is_rejected() {
        let outer = routine("outer", vec![rule!(name: "a", pattern: [cap!(class "dots")], action: Action::Chain("inner"))]);
        let inner = routine("inner", vec![rule!(name: "b", pattern: [cap!(class "dots")], action: Action::Chain("leaf"))]);
        let leaf = routine(
            "leaf",
            vec![rule!(name: "c", pattern: [cap!(class "dots")], action: Action::Substitute(vec![Output::Keep]))],
        );
        let err = CompiledRules::new(&registry(), &[outer, inner, leaf], &[], &dispatch()).unwrap_err();
        assert_eq!(err, SetupError::NestedChain { routine: "outer".into(), target: "inner".into() });
    }

    #[test]
    fn unknown_chain_target_is_rejected() {
        let outer = routine("outer", vec![rule!(name: "a", pattern: [cap!(class "dots")], action: Action::Chain("gone"))]);
        let err = CompiledRules::new(&registry(), &[outer], &[], &dispatch()).unwrap_err();
        assert_eq!(err, SetupError::UnknownRoutine { name: "gone".into(), referenced_by: "outer".into() });
    }

    #[test]
    fn features_keep_declared_order() {
        let a = routine("a", vec![rule!(name: "k", pattern: [cap!(class "dots")], action: Action::Substitute(vec![Output::Keep]))]);
        let features = [
            Feature { tag: "two", routines: vec!["a"], requires: SequenceMask::empty() },
            Feature { tag: "one", routines: vec!["a"], requires: SequenceMask::MARKS },
        ];
        let compiled = CompiledRules::new(&registry(), &[a], &features, &dispatch()).unwrap();
        assert_eq!(compiled.feature_tags().collect::<Vec<_>>(), vec!["two", "one"]);
        assert_eq!(compiled.feature("one").unwrap().requires, SequenceMask::MARKS);
    }
}
