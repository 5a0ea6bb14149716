use crate::engine::{self, Applier, CompiledRules, TriggerInfo};
use crate::rules::{self, FEATURE_ORDER};
use crate::{
    Category, ClassRegistry, Dispatch, DispatchMetrics, Feature, FeatureMetrics, GlyphToken, Offset, Routine,
    RoutineMetrics, RunMetrics, SequenceMask, SetupError,
};
use once_cell::sync::Lazy;
use std::ops::Range;
use std::time::{Duration, Instant};

static DEFAULT_SHAPER: Lazy<Shaper> = Lazy::new(|| Shaper::new().expect("built-in rule set is valid"));

/// Options that affect a single shaping run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Feature tags to skip for this run.
    pub disabled_features: Vec<String>,
    /// Run the counting/positioning pass. Defaults to `true`.
    pub dispatch: bool,
    /// Forced states applied to the whole run after the features, in order.
    ///
    /// They run before default positioning and the counting pass rather than
    /// last, so a forced `.collides` state selects the offset pattern. Renaming
    /// after dispatch would leave offsets computed for the previous state.
    pub overrides: Vec<(Override, Force)>,
}

impl Default for Options {
    fn default() -> Self {
        Options { disabled_features: Vec::new(), dispatch: true, overrides: Vec::new() }
    }
}

/// The default anchor-based positioner.
///
/// It runs after the substitution features and before the counting pass, and
/// is expected to fill [`GlyphToken::offset`]. The counting pass only ever adds
/// to [`GlyphToken::adjustment`].
pub trait Positioner {
    fn position(&self, tokens: &mut [GlyphToken]);
}

/// Puts every glyph without an offset on the baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselinePositioner;

impl Positioner for BaselinePositioner {
    fn position(&self, tokens: &mut [GlyphToken]) {
        for token in tokens.iter_mut().filter(|t| !t.is_sentinel()) {
            token.offset.get_or_insert_with(Offset::default);
        }
    }
}

/// A dot state the caller can force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Override {
    /// The `.yb` form beneath a sweeping final.
    Moved,
    /// The `.collides` spread flag.
    Collides,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Force {
    On,
    Off,
    Flip,
}

/// A glyph handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedGlyph {
    pub name: String,
    pub category: Category,
    /// Placement from the default positioner.
    pub offset: Option<Offset>,
    /// Accumulated delta from positioning rules, `None` if none applied.
    pub adjustment: Option<Offset>,
}

impl PositionedGlyph {
    /// Offset plus adjustment, treating unset parts as zero.
    pub fn placement(&self) -> Offset {
        self.offset.unwrap_or_default() + self.adjustment.unwrap_or_default()
    }
}

/// Result from [`shape`] and [`shape_with`].
#[derive(Debug, Clone)]
pub struct ShapeResult {
    pub glyphs: Vec<PositionedGlyph>,
    /// Total elapsed time of the run.
    pub elapsed: Duration,
}

/// Per-run details returned by [`shape_verbose_with`].
///
/// Meant for rule debugging: it records what each feature and the counting
/// pass did, not the intermediate sequences.
#[derive(Debug, Clone)]
pub struct ShapeDetails {
    pub total: Duration,
    /// Feature tags in execution order.
    pub feature_order: Vec<&'static str>,
    pub features: Vec<FeatureMetrics>,
    pub overrides: Vec<RoutineMetrics>,
    pub dispatch: DispatchMetrics,
}

#[derive(Debug, Clone)]
pub struct ShapeResultVerbose {
    pub glyphs: Vec<PositionedGlyph>,
    pub elapsed: Duration,
    pub details: ShapeDetails,
}

/// Compiled rule set plus the registry it was compiled against.
///
/// Immutable once built. A `Shaper` can be shared between threads and used
/// for any number of concurrent runs; every run owns its token sequence.
#[derive(Debug, Clone)]
pub struct Shaper {
    registry: ClassRegistry,
    rules: CompiledRules,
}

impl Shaper {
    /// The built-in rule set in the default feature order.
    pub fn new() -> Result<Self, SetupError> {
        Self::with_feature_order(FEATURE_ORDER)
    }

    /// The built-in rule set with features run in `order`. Features left out
    /// of `order` never run.
    pub fn with_feature_order(order: &[&str]) -> Result<Self, SetupError> {
        let available = rules::features();
        let features = order
            .iter()
            .map(|tag| {
                available
                    .iter()
                    .find(|f| f.tag == *tag)
                    .cloned()
                    .ok_or_else(|| SetupError::UnknownFeature(tag.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_parts(rules::registry()?, &rules::routines(), &features, &rules::dispatch())
    }

    /// A shaper over a caller-supplied rule set.
    pub fn from_parts(
        registry: ClassRegistry,
        routines: &[Routine],
        features: &[Feature],
        dispatch: &Dispatch,
    ) -> Result<Self, SetupError> {
        let rules = CompiledRules::new(&registry, routines, features, dispatch)?;
        log::debug!(
            "compiled {} class(es), {} routine(s), feature order [{}]",
            registry.names().count(),
            rules.routine_names().count(),
            rules.feature_tags().collect::<Vec<_>>().join(", ")
        );
        Ok(Shaper { registry, rules })
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// A token for glyph `name`, categorized through the `marks` and
    /// `ligatures` classes (when defined) and the dispatch sentinel name.
    pub fn token(&self, name: &str) -> GlyphToken {
        let category = if name == self.rules.dispatch.sentinel {
            Category::Sentinel
        } else if self.registry.contains("marks", name) {
            Category::Mark
        } else if self.registry.contains("ligatures", name) {
            Category::Ligature
        } else {
            Category::Base
        };
        GlyphToken::new(name, category)
    }

    /// Whitespace-separated glyph names to tokens.
    pub fn tokens(&self, text: &str) -> Vec<GlyphToken> {
        text.split_whitespace().map(|name| self.token(name)).collect()
    }

    /// Run one feature, gated like in a full run.
    pub fn run_feature(&self, tag: &str, tokens: &mut Vec<GlyphToken>) -> Result<FeatureMetrics, SetupError> {
        let feature = self.rules.feature(tag).ok_or_else(|| SetupError::UnknownFeature(tag.to_string()))?;
        Ok(self.apply_feature(feature, tokens, false))
    }

    /// Run one routine over the whole sequence.
    pub fn run_routine(&self, name: &str, tokens: &mut Vec<GlyphToken>) -> Result<RoutineMetrics, SetupError> {
        let len = tokens.len();
        self.run_routine_in(name, tokens, 0..len)
    }

    /// Count and dispatch every sentinel-terminated run, consuming the
    /// sentinels.
    pub fn dispatch(&self, tokens: &mut Vec<GlyphToken>) -> DispatchMetrics {
        Applier::new(&self.rules).dispatch(tokens)
    }

    /// Force a dot state on the tokens in `span`.
    pub fn apply_override(
        &self,
        tokens: &mut Vec<GlyphToken>,
        target: Override,
        force: Force,
        span: Range<usize>,
    ) -> Result<RoutineMetrics, SetupError> {
        self.run_routine_in(rules::overrides::routine_name(target, force), tokens, span)
    }

    /// Shape `tokens`: features, overrides, default positioning, counting pass.
    pub fn shape(&self, tokens: Vec<GlyphToken>, positioner: &dyn Positioner, options: &Options) -> ShapeResult {
        let (glyphs, metrics) = self.run(tokens, positioner, options);
        ShapeResult { glyphs, elapsed: metrics.total }
    }

    pub fn shape_verbose(
        &self,
        tokens: Vec<GlyphToken>,
        positioner: &dyn Positioner,
        options: &Options,
    ) -> ShapeResultVerbose {
        let (glyphs, metrics) = self.run(tokens, positioner, options);
        let details = ShapeDetails {
            total: metrics.total,
            feature_order: self.rules.feature_tags().collect(),
            features: metrics.features,
            overrides: metrics.overrides,
            dispatch: metrics.dispatch,
        };
        ShapeResultVerbose { glyphs, elapsed: metrics.total, details }
    }

    fn run(
        &self,
        mut tokens: Vec<GlyphToken>,
        positioner: &dyn Positioner,
        options: &Options,
    ) -> (Vec<PositionedGlyph>, RunMetrics) {
        let start = Instant::now();
        let mut metrics = RunMetrics::default();

        for feature in &self.rules.features {
            let disabled = options.disabled_features.iter().any(|tag| tag == feature.tag);
            metrics.features.push(self.apply_feature(feature, &mut tokens, disabled));
        }

        for &(target, force) in &options.overrides {
            let len = tokens.len();
            match self.apply_override(&mut tokens, target, force, 0..len) {
                Ok(routine) => metrics.overrides.push(routine),
                Err(err) => log::debug!("override {:?}={:?} skipped: {}", target, force, err),
            }
        }

        positioner.position(&mut tokens);

        if options.dispatch && TriggerInfo::scan(&tokens).satisfies(SequenceMask::SENTINELS) {
            metrics.dispatch = self.dispatch(&mut tokens);
        }

        let glyphs = engine::resolve_tokens(tokens);
        metrics.total = start.elapsed();
        (glyphs, metrics)
    }

    fn apply_feature(
        &self,
        feature: &engine::CompiledFeature,
        tokens: &mut Vec<GlyphToken>,
        disabled: bool,
    ) -> FeatureMetrics {
        let start = Instant::now();
        if disabled || !TriggerInfo::scan(tokens).satisfies(feature.requires) {
            log::debug!("feature {} skipped", feature.tag);
            return FeatureMetrics { tag: feature.tag, skipped: true, ..FeatureMetrics::default() };
        }

        let applier = Applier::new(&self.rules);
        let routines: Vec<RoutineMetrics> = feature
            .routines
            .iter()
            .map(|&id| applier.run_routine(id, tokens).metrics(self.rules.routines[id].name))
            .collect();

        let metrics = FeatureMetrics { tag: feature.tag, duration: start.elapsed(), skipped: false, routines };
        log::debug!("feature {}: {} application(s) in {:?}", feature.tag, metrics.applied(), metrics.duration);
        metrics
    }

    fn run_routine_in(
        &self,
        name: &str,
        tokens: &mut Vec<GlyphToken>,
        span: Range<usize>,
    ) -> Result<RoutineMetrics, SetupError> {
        let id = self.rules.routine_id(name).ok_or_else(|| SetupError::UnknownRoutine {
            name: name.to_string(),
            referenced_by: "<caller>".to_string(),
        })?;
        let outcome = Applier::new(&self.rules).run_routine_in(id, tokens, span, true);
        Ok(outcome.metrics(self.rules.routines[id].name))
    }
}

/// Shape whitespace-separated glyph names with the built-in rule set.
///
/// # Example
/// ```
/// use qalam::shape;
///
/// let out = shape("LAMi1 ALIFf1");
/// assert_eq!(out.glyphs[0].name, "LAM_ALIFf1");
/// ```
pub fn shape(text: &str) -> ShapeResult {
    shape_with(DEFAULT_SHAPER.tokens(text), &BaselinePositioner, &Options::default())
}

/// Shape `tokens` with the built-in rule set.
pub fn shape_with(tokens: Vec<GlyphToken>, positioner: &dyn Positioner, options: &Options) -> ShapeResult {
    DEFAULT_SHAPER.shape(tokens, positioner, options)
}

/// Like [`shape_with`], with per-feature and dispatch details.
pub fn shape_verbose_with(
    tokens: Vec<GlyphToken>,
    positioner: &dyn Positioner,
    options: &Options,
) -> ShapeResultVerbose {
    DEFAULT_SHAPER.shape_verbose(tokens, positioner, options)
}
