//! Shaping run metrics.
//!
//! This module defines a small set of structs used to observe what a shaping
//! run did: which features ran (or were gated off), how often each routine
//! applied a rule, and how every sentinel-terminated run of marks was
//! dispatched.
//!
//! ## Design notes
//!
//! - Unhandled collision patterns are *reported* here and never raised as
//!   errors; the marks keep the default positioner's placement.
//! - Timings use `std::time::Instant` and are informational only.

use super::dispatch::RunArity;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time for the shaping run.
    pub total: Duration,
    /// One entry per feature, in execution order.
    pub features: Vec<FeatureMetrics>,
    /// Override routines requested through the options, in request order.
    pub overrides: Vec<RoutineMetrics>,
    pub dispatch: DispatchMetrics,
}

#[derive(Debug, Default, Clone)]
pub struct FeatureMetrics {
    pub tag: &'static str,
    pub duration: Duration,
    /// True when the feature was disabled or its required content was absent.
    pub skipped: bool,
    pub routines: Vec<RoutineMetrics>,
}

impl FeatureMetrics {
    /// Total rule applications across the feature's routines.
    pub fn applied(&self) -> usize {
        self.routines.iter().map(|r| r.applied).sum()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RoutineMetrics {
    pub name: &'static str,
    pub applied: usize,
}

#[derive(Debug, Default, Clone)]
pub struct DispatchMetrics {
    pub duration: Duration,
    pub dispatched: Vec<DispatchedRun>,
    pub unhandled: Vec<UnhandledCollisionPattern>,
}

/// A run that was routed to an arity routine and positioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedRun {
    pub arity: RunArity,
    pub routine: &'static str,
    /// Name of the rule (the collision pattern) that matched.
    pub pattern: &'static str,
    /// Token indices of the marks in the run, before sentinels were removed.
    pub marks: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnhandledReason {
    /// More marks than the largest arity covers.
    Overflow,
    /// No rule of the arity routine matched the run's flags.
    NoPattern,
}

/// A run the dispatch tables do not cover. Its marks keep their default
/// placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnhandledCollisionPattern {
    pub reason: UnhandledReason,
    /// Marks counted before giving up (at most one past the largest arity).
    pub count: usize,
    /// `C` for a flagged mark, `P` for a plain one, left to right.
    pub pattern: String,
    /// Token index of the sentinel closing the run.
    pub sentinel: usize,
}
