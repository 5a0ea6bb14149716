//! Matching and application.
//!
//! This module is the operational core of the engine: it scans a token
//! sequence left to right and, at every position, tries the rules of a routine
//! in declaration order. A rule is only tried where its own filter (or the
//! routine's, if it has none) can see the token. The first rule that matches
//! is applied and scanning resumes right after the glyphs it consumed, so
//! matches within one pass never overlap.
//!
//! ## Anchoring
//!
//! The first captured item of a rule is anchored at the scan position.
//! Context items before it are matched backwards (lookbehind), everything
//! after it forwards, always through the rule's [`View`]:
//!
//! ```text
//! rule:     ctx(narrow)  cap(dots_moved)  ctx(SENTINEL)
//!                 <-prev-    ^ scan position   -next->
//! tokens:   BEm2  toeda  tdb.yb  SENTINEL
//!            0      1      2        3         (toeda hidden by the mark set)
//! ```
//!
//! ## Consumed span
//!
//! The consumed span ends at the last captured token. Lookahead context is
//! matched but not consumed, so it can start the next match.
//!
//! ## Chains
//!
//! A chain action runs another routine over the matched span, with that
//! routine's own filter. Compilation guarantees the target cannot chain again.

use super::compiled_rules::{CompiledAction, CompiledFilter, CompiledRule, CompiledRules, RoutineId};
use super::metrics::RoutineMetrics;
use super::view::View;
use crate::{GlyphName, GlyphToken, Offset, Output};
use std::ops::Range;

/// A successful match: the token index of every rule item.
#[derive(Debug)]
struct Match {
    positions: Vec<usize>,
}

/// What one routine pass did.
#[derive(Debug, Default, Clone)]
pub(crate) struct RoutineOutcome {
    /// Number of rule applications.
    pub applied: usize,
    /// Names of the applied rules, in application order.
    pub matched: Vec<&'static str>,
    /// Tokens that received an offset, with the offset they received.
    ///
    /// Indices refer to the sequence as it was right after the positioning;
    /// a later length-changing rule in the same pass may shift them.
    pub positioned: Vec<(usize, Offset)>,
}

/// Applies compiled routines to token sequences.
///
/// An `Applier` only borrows the compiled rules; it holds no per-run state and
/// can be shared freely between threads.
#[derive(Debug, Clone, Copy)]
pub struct Applier<'r> {
    rules: &'r CompiledRules,
}

impl<'r> Applier<'r> {
    pub fn new(rules: &'r CompiledRules) -> Self {
        Applier { rules }
    }

    pub(crate) fn rules(&self) -> &'r CompiledRules {
        self.rules
    }

    /// Run one routine over the whole sequence.
    pub(crate) fn run_routine(&self, id: RoutineId, tokens: &mut Vec<GlyphToken>) -> RoutineOutcome {
        let len = tokens.len();
        self.run_routine_in(id, tokens, 0..len, true)
    }

    /// Run one routine over `bounds`. Matches never look outside `bounds`.
    pub(crate) fn run_routine_in(
        &self,
        id: RoutineId,
        tokens: &mut Vec<GlyphToken>,
        bounds: Range<usize>,
        allow_chain: bool,
    ) -> RoutineOutcome {
        let routine = &self.rules.routines[id];
        let mut outcome = RoutineOutcome::default();
        let mut bounds = bounds.start..bounds.end.min(tokens.len());
        let mut i = bounds.start;

        while i < bounds.end {
            let mut resume = None;
            for rule in &routine.rules {
                let Some(m) = match_rule(rule, &routine.filter, tokens, bounds.clone(), i) else {
                    continue;
                };
                log::trace!("{}/{} matched at {} ({:?})", routine.name, rule.name, i, m.positions);
                resume = Some(self.apply(rule, &m, tokens, &mut bounds, &mut outcome, allow_chain));
                outcome.applied += 1;
                outcome.matched.push(rule.name);
                break;
            }

            i = resume.map_or(i + 1, |r| r.max(i + 1));
        }

        outcome
    }

    /// Apply `rule` for match `m` and return the index to resume scanning at.
    fn apply(
        &self,
        rule: &CompiledRule,
        m: &Match,
        tokens: &mut Vec<GlyphToken>,
        bounds: &mut Range<usize>,
        outcome: &mut RoutineOutcome,
        allow_chain: bool,
    ) -> usize {
        let captured: Vec<usize> = rule.captured().map(|k| m.positions[k]).collect();
        let first = captured[0];
        let last = captured[captured.len() - 1];

        match &rule.action {
            CompiledAction::Substitute(outputs) => {
                for (&index, output) in captured.iter().zip(outputs) {
                    let token = &mut tokens[index];
                    match output {
                        Output::Glyph(name) => token.name = (*name).to_string(),
                        Output::Retag { add, remove } => {
                            let mut name = GlyphName::parse(&token.name);
                            for tag in *remove {
                                name = name.without_tag(tag);
                            }
                            for tag in *add {
                                name = name.with_tag(tag);
                            }
                            token.name = name.to_string();
                        }
                        Output::Toggle(tag) => token.name = GlyphName::parse(&token.name).toggle_tag(tag).to_string(),
                        Output::Keep => {}
                    }
                }
                last + 1
            }
            CompiledAction::Ligate(glyph) => {
                tokens[first].name = glyph.clone();
                tokens[first].category = crate::Category::Ligature;
                for &index in captured[1..].iter().rev() {
                    tokens.remove(index);
                }
                let removed = captured.len() - 1;
                bounds.end -= removed;
                last + 1 - removed
            }
            CompiledAction::Insert(glyph, category) => {
                tokens.insert(first, GlyphToken::new(glyph.clone(), *category));
                bounds.end += 1;
                last + 2
            }
            CompiledAction::Position(deltas) => {
                for (&index, &delta) in captured.iter().zip(deltas) {
                    tokens[index].nudge(delta);
                    outcome.positioned.push((index, delta));
                }
                last + 1
            }
            CompiledAction::Chain(target) => {
                let span_start = m.positions.iter().copied().min().unwrap_or(first);
                let span_end = m.positions.iter().copied().max().unwrap_or(last) + 1;
                if !allow_chain {
                    debug_assert!(false, "chain depth is validated at compile time");
                    return last + 1;
                }
                let before = tokens.len();
                let inner = self.run_routine_in(*target, tokens, span_start..span_end, false);
                outcome.positioned.extend(inner.positioned);
                let grown = tokens.len() as isize - before as isize;
                bounds.end = (bounds.end as isize + grown).max(bounds.start as isize) as usize;
                (span_end as isize + grown).max(0) as usize
            }
        }
    }
}

/// Try `rule` with its first captured item anchored at `at`.
fn match_rule(
    rule: &CompiledRule,
    routine_filter: &CompiledFilter,
    tokens: &[GlyphToken],
    bounds: Range<usize>,
    at: usize,
) -> Option<Match> {
    let filter = rule.filter.as_ref().unwrap_or(routine_filter);
    let view = View::new(tokens, filter, bounds);
    if !view.is_visible(at) {
        return None;
    }

    let mut positions = vec![0; rule.items.len()];

    let mut next = Some(at);
    for (k, item) in rule.items.iter().enumerate().skip(rule.first_captured) {
        let index = next?;
        if !item.matcher.matches(&tokens[index]) {
            return None;
        }
        positions[k] = index;
        next = view.next(index + 1);
    }

    let mut before = at;
    for k in (0..rule.first_captured).rev() {
        let index = view.prev(before)?;
        if !rule.items[k].matcher.matches(&tokens[index]) {
            return None;
        }
        positions[k] = index;
        before = index;
    }

    Some(Match { positions })
}

impl RoutineOutcome {
    pub(crate) fn metrics(&self, name: &'static str) -> RoutineMetrics {
        RoutineMetrics { name, applied: self.applied }
    }
}
