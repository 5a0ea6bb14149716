//! Output resolution.
//!
//! The final token sequence still carries engine-internal state. Resolution
//! turns it into the glyphs handed to the renderer:
//!
//! ```text
//! GlyphToken ──┬─ Sentinel -> dropped (zero-width, never emitted)
//!              └─ others   -> PositionedGlyph { name, category, offset, adjustment }
//! ```
//!
//! Sentinels are normally consumed by the dispatch pass already; dropping any
//! that are left keeps output correct when dispatch is disabled.

use crate::{GlyphToken, PositionedGlyph};

pub(crate) fn resolve_tokens(tokens: Vec<GlyphToken>) -> Vec<PositionedGlyph> {
    tokens
        .into_iter()
        .filter(|t| !t.is_sentinel())
        .map(|t| PositionedGlyph { name: t.name, category: t.category, offset: t.offset, adjustment: t.adjustment })
        .collect()
}
