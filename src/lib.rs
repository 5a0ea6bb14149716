extern crate self as qalam;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod glyph;
mod rules;

pub use api::{
    BaselinePositioner, Force, Options, Override, PositionedGlyph, Positioner, ShapeDetails, ShapeResult,
    ShapeResultVerbose, Shaper, shape, shape_verbose_with, shape_with,
};
pub use engine::{
    ClassExpr, ClassRegistry, DispatchMetrics, DispatchedRun, FeatureMetrics, GlyphClass, LookupFlags, MAX_RUN,
    RegistryBuilder, RoutineMetrics, RunArity, RunMetrics, SequenceMask, TriggerInfo, UnhandledCollisionPattern,
    UnhandledReason,
};
pub use error::{DefinitionError, MatchArityError, SetupError};
pub use glyph::GlyphName;
pub use rules::{FEATURE_ORDER, SENTINEL};

use std::ops::{Add, AddAssign};

// --- Tokens -------------------------------------------------------------------

/// Coarse glyph category, as assigned by the upstream positional-form stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Base,
    Mark,
    Ligature,
    /// Zero-width run boundary. Never emitted in shaped output.
    Sentinel,
}

/// A two-dimensional offset in font units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const fn new(x: i32, y: i32) -> Self {
        Offset { x, y }
    }

    /// Offset that only moves horizontally.
    pub const fn horizontal(x: i32) -> Self {
        Offset { x, y: 0 }
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl AddAssign for Offset {
    fn add_assign(&mut self, rhs: Offset) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// One glyph of a shaping run.
///
/// `offset` is whatever the default anchor positioner assigned (unset until
/// it runs); `adjustment` accumulates deltas from positioning rules and stays
/// `None` for glyphs no rule ever touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphToken {
    pub name: String,
    pub category: Category,
    pub offset: Option<Offset>,
    pub adjustment: Option<Offset>,
}

impl GlyphToken {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        GlyphToken { name: name.into(), category, offset: None, adjustment: None }
    }

    pub fn base(name: impl Into<String>) -> Self {
        Self::new(name, Category::Base)
    }

    pub fn mark(name: impl Into<String>) -> Self {
        Self::new(name, Category::Mark)
    }

    pub fn ligature(name: impl Into<String>) -> Self {
        Self::new(name, Category::Ligature)
    }

    pub fn sentinel() -> Self {
        Self::new(SENTINEL, Category::Sentinel)
    }

    pub fn is_sentinel(&self) -> bool {
        self.category == Category::Sentinel
    }

    /// Parsed view of the glyph name.
    pub fn glyph_name(&self) -> GlyphName {
        GlyphName::parse(&self.name)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.name.split('.').skip(1).any(|t| t == tag)
    }

    /// Add `delta` to the accumulated adjustment.
    pub fn nudge(&mut self, delta: Offset) {
        *self.adjustment.get_or_insert_with(Offset::default) += delta;
    }
}

// --- Rules --------------------------------------------------------------------

/// What a single match position compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Exactly this glyph name.
    Glyph(&'static str),
    /// Any member of the named registry class.
    Class(&'static str),
}

/// One position of a rule's match sequence.
///
/// Context-only items before the first captured item are lookbehind, those
/// after the last captured item are lookahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchItem {
    pub element: Element,
    pub captured: bool,
}

/// Replacement for one captured glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Glyph(&'static str),
    /// Add and remove suffix tags, keeping numbered variants last.
    Retag { add: &'static [&'static str], remove: &'static [&'static str] },
    /// Remove the tag if present, add it otherwise.
    Toggle(&'static str),
    Keep,
}

/// What happens to the captured glyphs of a matching rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// One output per captured glyph.
    Substitute(Vec<Output>),
    /// All captured glyphs collapse into one ligature glyph.
    Ligate(&'static str),
    /// Insert a new glyph right before the first captured glyph.
    Insert(&'static str, Category),
    /// One relative offset per captured glyph.
    Position(Vec<Offset>),
    /// Run the named routine over the matched span.
    Chain(&'static str),
}

/// Which tokens a routine (or a single rule) is allowed to see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub flags: LookupFlags,
    /// Marks outside this class are treated as absent.
    pub mark_set: Option<&'static str>,
    /// Bases, marks and ligatures in this class are treated as absent.
    pub skip: Option<&'static str>,
}

impl Filter {
    pub fn new(flags: LookupFlags) -> Self {
        Filter { flags, mark_set: None, skip: None }
    }

    pub fn with_mark_set(mut self, class: &'static str) -> Self {
        self.mark_set = Some(class);
        self
    }

    pub fn with_skip(mut self, class: &'static str) -> Self {
        self.skip = Some(class);
        self
    }
}

/// A contextual rule: a match sequence and the action applied on a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: &'static str,
    pub pattern: Vec<MatchItem>,
    pub action: Action,
    /// Overrides the routine filter for this rule only.
    pub filter: Option<Filter>,
}

/// Ordered rules; the first rule that matches at a scan position wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub name: &'static str,
    pub filter: Filter,
    pub rules: Vec<Rule>,
}

/// A named, ordered list of routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub tag: &'static str,
    pub routines: Vec<&'static str>,
    /// Sequence content that must be present for the feature to run at all.
    pub requires: SequenceMask,
}

/// Counting/positioning pass configuration.
///
/// Each sentinel closes a run of `qualifying` marks (as seen through
/// `filter`); the run length picks one of the `arms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub sentinel: &'static str,
    pub qualifying: &'static str,
    pub filter: Filter,
    pub arms: Vec<(RunArity, &'static str)>,
    /// Tag that marks a glyph as flagged in an unhandled-pattern report.
    pub flag_tag: &'static str,
    /// Marks with this tag move along with the mark right before them.
    pub follower_tag: &'static str,
}
