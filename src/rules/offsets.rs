//! Arity-specific positioning tables (dispatch arms).
//!
//! Each entry is one anticipated flag pattern for a counted run, read left to
//! right (`C` collides, `P` plain), with one horizontal offset per mark. The
//! values are hand-tuned against the collision heuristic and snapped to
//! [`OFFSET_QUANTUM`] units when the routines are built. Patterns missing from
//! a table (all-plain runs, for instance) fall back to the default placement.

use super::SENTINEL;
use crate::{Action, Filter, LookupFlags, MatchItem, Offset, Routine, Rule};

pub(crate) const OFFSET_QUANTUM: i32 = 10;

pub(crate) const TWO: &[(&str, [i32; 2])] = &[
    ("CC", [0, -203]),
    ("CP", [118, 0]),
    ("PC", [0, -147]),
];

pub(crate) const THREE: &[(&str, [i32; 3])] = &[
    ("CCC", [0, -180, -352]),
    ("CCP", [96, -104, 0]),
    ("PCC", [0, 124, -176]),
    ("CPC", [0, 0, -212]),
    ("CPP", [142, 0, 0]),
    ("PPC", [0, 0, -158]),
    ("PCP", [0, -121, 0]),
];

pub(crate) const FOUR: &[(&str, [i32; 4])] = &[
    ("CCCC", [0, -170, -340, -512]),
    ("PCPP", [0, -163, 38, 0]),
    ("CCPP", [84, -96, 0, 0]),
    ("PPCC", [0, 0, 118, -176]),
    ("CPPP", [131, 0, 0, 0]),
    ("PPPC", [0, 0, 0, -149]),
    ("PPCP", [0, 0, -114, 0]),
    ("CCCP", [92, -88, -262, 0]),
    ("PCCC", [0, 106, -74, -251]),
];

/// Round `value` to the nearest multiple of `degree`, halves away from zero.
pub(crate) fn quantize(value: i32, degree: i32) -> i32 {
    if degree <= 1 {
        return value;
    }
    (value + value.signum() * degree / 2) / degree * degree
}

pub(crate) fn routines() -> Vec<Routine> {
    vec![positioning("dots_two", TWO), positioning("dots_three", THREE), positioning("dots_four", FOUR)]
}

fn positioning<const N: usize>(name: &'static str, table: &'static [(&'static str, [i32; N])]) -> Routine {
    let rules = table
        .iter()
        .map(|&(label, offsets)| {
            let mut pattern: Vec<MatchItem> = label
                .chars()
                .map(|flag| match flag {
                    'C' => cap!(class "dots_moved_collides"),
                    _ => cap!(class "dots_moved_plain"),
                })
                .collect();
            pattern.push(ctx!(glyph SENTINEL));

            let deltas = offsets.iter().map(|&x| Offset::horizontal(quantize(x, OFFSET_QUANTUM))).collect();
            Rule { name: label, pattern, action: Action::Position(deltas), filter: None }
        })
        .collect();

    Routine {
        name,
        filter: Filter::new(LookupFlags::IGNORE_BASES | LookupFlags::IGNORE_LIGATURES).with_mark_set("dots_moved"),
        rules,
    }
}
