//! Run counting and arity dispatch.
//!
//! Every sentinel closes a run of qualifying marks. The dispatcher counts that
//! run backwards from the sentinel, through the dispatch filter, and routes it
//! to the routine registered for its length:
//!
//! ```text
//! tokens:  BEi1 sdb.yb.collides toeda BEm2 tdb.yb.collides SENTINEL BARI_YEf1
//! counted:      ^^^^^^^^^^^^^^^              ^^^^^^^^^^^^^^^   -> 2
//!
//! count 0 | 1  -> untouched
//! count 2..=4  -> arms[arity] over [first mark ..= sentinel]
//! count > 4    -> unhandled (Overflow)
//! ```
//!
//! The arm routine is applied like a chain target: its own filter, bounded to
//! the run, no further chaining. When none of its rules matches, the run is
//! reported as unhandled (`NoPattern`) and keeps its default placement.
//!
//! Afterwards each sentinel is removed; it only exists for this pass.

use super::matcher::Applier;
use super::metrics::{DispatchMetrics, DispatchedRun, UnhandledCollisionPattern, UnhandledReason};
use super::view::View;
use crate::{GlyphToken, Offset};
use std::time::Instant;

/// Largest run length with a dispatch arm.
pub const MAX_RUN: usize = 4;

/// Number of marks an arity routine repositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunArity {
    Two,
    Three,
    Four,
}

impl RunArity {
    /// The arity for a counted run, if runs of that length are dispatched.
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            2 => Some(RunArity::Two),
            3 => Some(RunArity::Three),
            4 => Some(RunArity::Four),
            _ => None,
        }
    }

    pub fn len(self) -> usize {
        match self {
            RunArity::Two => 2,
            RunArity::Three => 3,
            RunArity::Four => 4,
        }
    }
}

impl Applier<'_> {
    /// Count, dispatch and consume every sentinel-terminated run.
    pub(crate) fn dispatch(&self, tokens: &mut Vec<GlyphToken>) -> DispatchMetrics {
        let start = Instant::now();
        let dispatch = &self.rules().dispatch;
        let mut metrics = DispatchMetrics::default();

        let sentinels: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_sentinel() && t.name == dispatch.sentinel)
            .map(|(i, _)| i)
            .collect();

        // Right to left, so removing a sentinel never shifts one still to come.
        for &sentinel in sentinels.iter().rev() {
            let run = self.count_run(tokens, sentinel);

            match run.len() {
                0 | 1 => {}
                n if n > MAX_RUN => {
                    log::debug!("more than {} marks before sentinel {}, not dispatched", MAX_RUN, sentinel);
                    metrics.unhandled.push(UnhandledCollisionPattern {
                        reason: UnhandledReason::Overflow,
                        count: n,
                        pattern: flag_pattern(tokens, &run, dispatch.flag_tag),
                        sentinel,
                    });
                }
                n => {
                    let arm = RunArity::from_count(n)
                        .and_then(|arity| dispatch.arms.iter().find(|(a, _)| *a == arity).copied());
                    let Some((arity, routine)) = arm else {
                        metrics.unhandled.push(UnhandledCollisionPattern {
                            reason: UnhandledReason::NoPattern,
                            count: n,
                            pattern: flag_pattern(tokens, &run, dispatch.flag_tag),
                            sentinel,
                        });
                        tokens.remove(sentinel);
                        continue;
                    };
                    debug_assert_eq!(arity.len(), run.len());

                    let outcome = self.run_routine_in(routine, tokens, run[0]..sentinel + 1, false);
                    let routine_name = self.rules().routines[routine].name;
                    match outcome.matched.first() {
                        Some(&pattern) => {
                            log::debug!("{} marks before sentinel {} -> {}/{}", n, sentinel, routine_name, pattern);
                            for &(index, delta) in &outcome.positioned {
                                move_followers(tokens, index, delta, dispatch.follower_tag);
                            }
                            metrics.dispatched.push(DispatchedRun { arity, routine: routine_name, pattern, marks: run });
                        }
                        None => {
                            log::debug!("{} marks before sentinel {}: no pattern in {}", n, sentinel, routine_name);
                            metrics.unhandled.push(UnhandledCollisionPattern {
                                reason: UnhandledReason::NoPattern,
                                count: n,
                                pattern: flag_pattern(tokens, &run, dispatch.flag_tag),
                                sentinel,
                            });
                        }
                    }
                }
            }

            tokens.remove(sentinel);
        }

        metrics.duration = start.elapsed();
        metrics
    }

    /// Indices of the qualifying marks right before `sentinel`, left to right.
    ///
    /// Counting stops one past [`MAX_RUN`], which is enough to tell an
    /// overflowing run apart.
    fn count_run(&self, tokens: &[GlyphToken], sentinel: usize) -> Vec<usize> {
        let dispatch = &self.rules().dispatch;
        let view = View::new(tokens, &dispatch.filter, 0..tokens.len());
        let mut run = Vec::new();
        let mut cursor = view.prev(sentinel);

        while let Some(index) = cursor {
            let token = &tokens[index];
            if token.is_sentinel() || !dispatch.qualifying.contains(&token.name) {
                break;
            }
            run.push(index);
            if run.len() > MAX_RUN {
                break;
            }
            cursor = view.prev(index);
        }

        run.reverse();
        run
    }
}

/// Give marks tagged `follower_tag` right after `index` the same horizontal
/// delta.
fn move_followers(tokens: &mut [GlyphToken], index: usize, delta: Offset, follower_tag: &str) {
    for token in tokens.iter_mut().skip(index + 1) {
        if !token.has_tag(follower_tag) {
            break;
        }
        token.nudge(Offset::horizontal(delta.x));
    }
}

fn flag_pattern(tokens: &[GlyphToken], run: &[usize], flag_tag: &str) -> String {
    run.iter().map(|&i| if tokens[i].has_tag(flag_tag) { 'C' } else { 'P' }).collect()
}
