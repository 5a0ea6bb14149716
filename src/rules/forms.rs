//! Final-form overrides (`fina`).
//!
//! The letter before a final picks which final variant is drawn. Rules are
//! tried in order, so where preceding-letter classes overlap the earlier rule
//! wins: `LAMi2 ALIFf1` takes the lam-specific `ALIFf3`, not the `ALIFf2`
//! shared by the other tall connectors.

use crate::{Action, Filter, LookupFlags, Output, Routine};

pub(crate) fn routines() -> Vec<Routine> {
    vec![Routine {
        name: "final_form_overrides",
        filter: Filter::new(LookupFlags::IGNORE_MARKS),
        rules: vec![
            rule!(
                name: "alif_after_lam",
                pattern: [ctx!(class "lam_letters"), cap!(glyph "ALIFf1")],
                action: Action::Substitute(vec![Output::Glyph("ALIFf3")]),
            ),
            rule!(
                name: "alif_after_tall",
                pattern: [ctx!(class "tall_connectors"), cap!(glyph "ALIFf1")],
                action: Action::Substitute(vec![Output::Glyph("ALIFf2")]),
            ),
            rule!(
                name: "bari_ye_after_jim",
                pattern: [ctx!(class "jim_letters"), cap!(glyph "BARI_YEf1")],
                action: Action::Substitute(vec![Output::Glyph("BARI_YEf2")]),
            ),
            rule!(
                name: "nun_after_sin_sad",
                pattern: [ctx!(class "sin_sad"), cap!(glyph "NUNf1")],
                action: Action::Substitute(vec![Output::Glyph("NUNf2")]),
            ),
            rule!(
                name: "nun_after_kaf_gaf",
                pattern: [ctx!(class "kaf_gaf"), cap!(glyph "NUNf1")],
                action: Action::Substitute(vec![Output::Glyph("NUNf2")]),
            ),
        ],
    }]
}
