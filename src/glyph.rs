//! Glyph names and suffix tags.
//!
//! A glyph identifier is a base name followed by dot-separated suffix tags:
//!
//! ```text
//! sdb.yb.collides.one
//! ^^^ ^^ ^^^^^^^^ ^^^
//!  │   │     │     └─ numbered variant (always last)
//!  │   │     └─────── collision-spread state
//!  │   └───────────── "moved" form, sits beneath a sweeping final
//!  └───────────────── base name
//! ```
//!
//! Tag edits keep a canonical order so that flipping a state off and on again
//! reproduces the exact original identifier.

use std::fmt;

/// Numbered-variant tags. They always stay at the end of the tag list.
const VARIANT_TAGS: &[&str] = &["one", "two", "three"];

/// State tags, in canonical order.
const STATE_TAGS: &[&str] = &["yb", "collides", "attached"];

fn rank(tag: &str) -> usize {
    if let Some(pos) = STATE_TAGS.iter().position(|t| *t == tag) {
        return pos;
    }
    if VARIANT_TAGS.contains(&tag) {
        return usize::MAX;
    }
    STATE_TAGS.len()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphName {
    base: String,
    tags: Vec<String>,
}

impl GlyphName {
    pub fn parse(name: &str) -> Self {
        let mut parts = name.split('.');
        let base = parts.next().unwrap_or_default().to_string();
        let tags = parts.filter(|t| !t.is_empty()).map(str::to_string).collect();
        GlyphName { base, tags }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// The numbered-variant suffix, if any.
    pub fn variant(&self) -> Option<&str> {
        self.tags.iter().map(String::as_str).find(|t| VARIANT_TAGS.contains(t))
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        if self.has_tag(tag) {
            return self;
        }
        let r = rank(tag);
        let at = self.tags.iter().position(|t| rank(t) > r).unwrap_or(self.tags.len());
        self.tags.insert(at, tag.to_string());
        self
    }

    pub fn without_tag(mut self, tag: &str) -> Self {
        self.tags.retain(|t| t != tag);
        self
    }

    pub fn toggle_tag(self, tag: &str) -> Self {
        if self.has_tag(tag) { self.without_tag(tag) } else { self.with_tag(tag) }
    }
}

impl fmt::Display for GlyphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)?;
        for tag in &self.tags {
            write!(f, ".{tag}")?;
        }
        Ok(())
    }
}

impl From<&str> for GlyphName {
    fn from(name: &str) -> Self {
        GlyphName::parse(name)
    }
}
