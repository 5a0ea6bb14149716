//! Filtered projection of a token slice.
//!
//! Lookup flags, mark-filtering sets and skip classes never remove tokens: they
//! only change which indices the matcher can *see*. Every index handed out here is an index
//! into the full sequence, so matches can be applied in place.
//!
//! ```text
//! tokens:  BEi1  sdb.yb  toeda  BEm2  tdb.yb  SENTINEL  BARI_YEf1
//! flags:   IGNORE_BASES, mark_set = dots_moved
//! visible:       1                    4       5
//! ```

use super::compiled_rules::{CompiledFilter, LookupFlags};
use crate::{Category, GlyphToken};
use std::ops::Range;

#[derive(Clone, Copy)]
pub(crate) struct View<'a> {
    tokens: &'a [GlyphToken],
    filter: &'a CompiledFilter,
    start: usize,
    end: usize,
}

impl<'a> View<'a> {
    /// A view confined to `bounds` (clamped to the slice).
    pub(crate) fn new(tokens: &'a [GlyphToken], filter: &'a CompiledFilter, bounds: Range<usize>) -> Self {
        let end = bounds.end.min(tokens.len());
        View { tokens, filter, start: bounds.start.min(end), end }
    }

    pub(crate) fn is_visible(&self, index: usize) -> bool {
        if index < self.start || index >= self.end {
            return false;
        }
        let token = &self.tokens[index];
        if token.category != Category::Sentinel
            && self.filter.skip.as_ref().is_some_and(|set| set.contains(&token.name))
        {
            return false;
        }
        let flags = self.filter.flags;
        match token.category {
            Category::Base => !flags.contains(LookupFlags::IGNORE_BASES),
            Category::Ligature => !flags.contains(LookupFlags::IGNORE_LIGATURES),
            Category::Mark => {
                !flags.contains(LookupFlags::IGNORE_MARKS)
                    && self.filter.mark_set.as_ref().is_none_or(|set| set.contains(&token.name))
            }
            Category::Sentinel => true,
        }
    }

    /// First visible index at or after `from`.
    pub(crate) fn next(&self, from: usize) -> Option<usize> {
        (from.max(self.start)..self.end).find(|&i| self.is_visible(i))
    }

    /// Last visible index strictly before `before`.
    pub(crate) fn prev(&self, before: usize) -> Option<usize> {
        (self.start..before.min(self.end)).rev().find(|&i| self.is_visible(i))
    }
}
