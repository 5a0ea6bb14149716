//! Collision marking (`dotc`).
//!
//! Three passes over the moved dots below:
//!
//! ```text
//! input:           BEi1 sdb.yb toeda BEm2 tdb.yb BARI_YEf1
//! attach_secondary      ........ toeda.attached
//! flag_collisions       sdb.yb.collides ...... tdb.yb.collides
//! mark_sweep_boundaries                                SENTINEL BARI_YEf1
//! ```
//!
//! The collision test is pattern based: two moved dots separated only by narrow
//! letters (any number of them, or none) are both flagged, whatever their
//! actual geometry.
//! The positioning tables are tuned against exactly this over-approximation.
//!
//! Every pass is idempotent.

use super::SENTINEL;
use crate::{Action, Category, Filter, Output, Routine};

const COLLIDES: Output = Output::Retag { add: &["collides"], remove: &[] };

pub(crate) fn routines() -> Vec<Routine> {
    vec![attach_secondary(), flag_collisions(), mark_sweep_boundaries()]
}

fn attach_secondary() -> Routine {
    Routine {
        name: "attach_secondary",
        filter: Filter::default(),
        rules: vec![rule!(
            name: "after_moved_dot",
            pattern: [ctx!(class "dots_moved"), cap!(class "secondary_marks")],
            action: Action::Substitute(vec![Output::Retag { add: &["attached"], remove: &[] }]),
        )],
    }
}

fn flag_collisions() -> Routine {
    // Narrow letters are skipped and only moved dots are visible among the
    // marks, so a dot's visible neighbour is either the next dot or a blocker.
    Routine {
        name: "flag_collisions",
        filter: Filter::default().with_mark_set("dots_moved").with_skip("narrow"),
        rules: vec![
            rule!(
                name: "before_dot",
                pattern: [cap!(class "dots_moved"), ctx!(class "dots_moved")],
                action: Action::Substitute(vec![COLLIDES]),
            ),
            rule!(
                name: "after_dot",
                pattern: [ctx!(class "dots_moved"), cap!(class "dots_moved")],
                action: Action::Substitute(vec![COLLIDES]),
            ),
        ],
    }
}

fn mark_sweep_boundaries() -> Routine {
    Routine {
        name: "mark_sweep_boundaries",
        filter: Filter::default(),
        rules: vec![
            rule!(
                name: "already_marked",
                pattern: [cap!(glyph SENTINEL), cap!(class "sweeps")],
                action: Action::Substitute(vec![Output::Keep, Output::Keep]),
            ),
            rule!(name: "before_sweep", pattern: [cap!(class "sweeps")], action: Action::Insert(SENTINEL, Category::Sentinel)),
        ],
    }
}
