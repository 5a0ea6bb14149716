//! Trigger scanning (sequence pre-classification).
//!
//! This module inspects a token sequence and produces a coarse
//! [`SequenceMask`] of the categories it contains. Features declare the mask
//! they need and the shaper skips any feature whose requirements are absent,
//! e.g. the collision pass on a run without marks.
//!
//! ## Design notes
//!
//! - The scan is a single linear pass over categories; it never looks at glyph
//!   names or classes.
//! - A feature that passes the gate still has to match its rules; the gate only
//!   avoids scanning routines that cannot possibly apply.

use super::compiled_rules::SequenceMask;
use crate::{Category, GlyphToken};

/// Sequence characteristics detected from the tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerInfo {
    pub present: SequenceMask,
}

impl TriggerInfo {
    pub fn scan(tokens: &[GlyphToken]) -> Self {
        let mut present = SequenceMask::empty();
        for token in tokens {
            present |= match token.category {
                Category::Base => SequenceMask::BASES,
                Category::Mark => SequenceMask::MARKS,
                Category::Ligature => SequenceMask::LIGATURES,
                Category::Sentinel => SequenceMask::SENTINELS,
            };
            if present.is_all() {
                break;
            }
        }
        TriggerInfo { present }
    }

    /// True when every category in `required` is present.
    pub fn satisfies(&self, required: SequenceMask) -> bool {
        self.present.contains(required)
    }
}
