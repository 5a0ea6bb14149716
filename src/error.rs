//! Setup-time errors.
//!
//! Everything here is raised while building a [`crate::Shaper`]; a shaping run
//! itself cannot fail. Runs the dispatch tables do not cover are reported as
//! [`crate::UnhandledCollisionPattern`] data instead.

/// A glyph class could not be materialized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("class `{name}` is not defined (referenced by `{referenced_by}`)")]
    Unresolved { name: String, referenced_by: String },

    #[error("class definitions form a cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("class `{name}` is malformed: {reason}")]
    Malformed { name: String, reason: String },

    #[error("class `{0}` is defined more than once")]
    Duplicate(String),
}

/// A rule's captured elements and its outputs disagree in number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rule `{routine}/{rule}` captures {captured} glyph(s) but supplies {supplied} {kind}")]
pub struct MatchArityError {
    pub routine: String,
    pub rule: String,
    pub captured: usize,
    pub supplied: usize,
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Arity(#[from] MatchArityError),

    #[error("routine `{name}` is not defined (referenced by `{referenced_by}`)")]
    UnknownRoutine { name: String, referenced_by: String },

    #[error("routine `{0}` is defined more than once")]
    DuplicateRoutine(String),

    #[error("routine `{routine}` chains to `{target}`, which chains again")]
    NestedChain { routine: String, target: String },

    #[error("rule `{routine}/{rule}` has no captured element")]
    NoCapture { routine: String, rule: String },

    #[error("feature `{0}` is not defined")]
    UnknownFeature(String),
}
