//! Contextual rule engine.
//!
//! The engine turns a static rule set into a compiled, immutable form once and
//! then applies it to any number of glyph runs:
//!
//! ```text
//! inventory + ClassExpr ──┐
//!                         │  RegistryBuilder::build       (registry.rs)
//!                         └───────────────┬──────────────
//!                                         │ ClassRegistry (shared, read-only)
//! Routine / Feature / Dispatch ───────────┤
//!                                         │  CompiledRules::new (compiled_rules.rs)
//!                                         v
//! tokens ── TriggerInfo::scan ──── gate features by sequence content
//!           (trigger.rs)                  │
//!                                         v
//!                              Applier::run_routine (matcher.rs)
//!                               - filtered projection   (view.rs)
//!                               - first match wins per position
//!                               - substitute / ligate / insert / position
//!                               - depth-1 chain into another routine
//!                                         │
//!                                         v
//!                              Applier::dispatch (dispatch.rs)
//!                               - count the run before each sentinel
//!                               - route to the arity-specific routine
//!                                         │
//!                                         v
//!                              resolve_tokens (resolve.rs)
//!                               - drop sentinels, emit PositionedGlyph
//! ```
//!
//! ## Responsibilities by module
//!
//! - `registry.rs`: glyph class expressions and their one-time materialization.
//! - `compiled_rules.rs`: resolves class references, validates arities and
//!   chain targets, indexes routines and features by name.
//! - `trigger.rs`: cheap scan of a run's categories for feature gating.
//! - `view.rs`: lookup-flag and mark-filtering projection of a token slice.
//! - `matcher.rs`: the scan/match/apply loop.
//! - `dispatch.rs`: run counting and the arity dispatch table.
//! - `metrics.rs`: timings and per-routine application counts.
//! - `resolve.rs`: conversion of the final token sequence to output glyphs.
//!
//! Set `RUST_LOG=qalam=trace` (with a logger installed) to see every applied
//! rule.

#[path = "engine/compiled_rules.rs"]
mod compiled_rules;
#[path = "engine/dispatch.rs"]
mod dispatch;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/registry.rs"]
mod registry;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/trigger.rs"]
mod trigger;
#[path = "engine/view.rs"]
mod view;

pub(crate) use compiled_rules::CompiledFeature;
pub use compiled_rules::{CompiledRules, LookupFlags, SequenceMask};
pub use dispatch::{MAX_RUN, RunArity};
pub use matcher::Applier;
pub use metrics::{
    DispatchMetrics, DispatchedRun, FeatureMetrics, RoutineMetrics, RunMetrics, UnhandledCollisionPattern,
    UnhandledReason,
};
pub use registry::{ClassExpr, ClassRegistry, GlyphClass, RegistryBuilder};
pub(crate) use resolve::resolve_tokens;
pub use trigger::TriggerInfo;
