//! Exact-pair ligature formation (`liga`).

use crate::{Action, Filter, LookupFlags, Routine};

pub(crate) fn routines() -> Vec<Routine> {
    vec![Routine {
        name: "pair_ligatures",
        filter: Filter::new(LookupFlags::IGNORE_MARKS),
        rules: vec![
            rule!(name: "lam_alif_initial", pattern: [cap!(glyph "LAMi1"), cap!(glyph "ALIFf1")], action: Action::Ligate("LAM_ALIFf1")),
            rule!(name: "lam_alif_medial", pattern: [cap!(glyph "LAMm1"), cap!(glyph "ALIFf1")], action: Action::Ligate("LAM_ALIFf2")),
            rule!(name: "kaf_alif", pattern: [cap!(glyph "KAFi1"), cap!(glyph "ALIFf1")], action: Action::Ligate("KAF_ALIFf1")),
            rule!(name: "gaf_alif", pattern: [cap!(glyph "GAFi1"), cap!(glyph "ALIFf1")], action: Action::Ligate("GAF_ALIFf1")),
            rule!(name: "lam_mim", pattern: [cap!(glyph "LAMi1"), cap!(glyph "MIMf1")], action: Action::Ligate("LAM_MIMf1")),
        ],
    }]
}
