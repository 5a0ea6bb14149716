//! User override routines.
//!
//! Pure suffix-tag flips, run by the caller on a chosen span after the
//! automatic passes. Numbered variants (`.one`, `.two`) survive every flip.

use crate::{Action, Filter, Force, Output, Override, Routine};

pub(crate) fn routines() -> Vec<Routine> {
    vec![
        flip("toggle_moved", "dots_below", Output::Toggle("yb")),
        flip("force_moved_on", "dots_below", Output::Retag { add: &["yb"], remove: &[] }),
        flip("force_moved_off", "dots_below", Output::Retag { add: &[], remove: &["yb"] }),
        flip("toggle_collides", "dots_moved", Output::Toggle("collides")),
        flip("force_collides_on", "dots_moved", Output::Retag { add: &["collides"], remove: &[] }),
        flip("force_collides_off", "dots_moved", Output::Retag { add: &[], remove: &["collides"] }),
    ]
}

/// Routine implementing `force` for the `target` state.
pub(crate) fn routine_name(target: Override, force: Force) -> &'static str {
    match (target, force) {
        (Override::Moved, Force::Flip) => "toggle_moved",
        (Override::Moved, Force::On) => "force_moved_on",
        (Override::Moved, Force::Off) => "force_moved_off",
        (Override::Collides, Force::Flip) => "toggle_collides",
        (Override::Collides, Force::On) => "force_collides_on",
        (Override::Collides, Force::Off) => "force_collides_off",
    }
}

fn flip(name: &'static str, targets: &'static str, output: Output) -> Routine {
    Routine {
        name,
        filter: Filter::default(),
        rules: vec![rule!(name: "flip", pattern: [cap!(class targets)], action: Action::Substitute(vec![output]))],
    }
}
