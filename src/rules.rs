//! Built-in Nastaliq rule set.
//!
//! Features run in [`FEATURE_ORDER`]:
//!
//! - `liga`: exact-pair ligatures (`ligatures.rs`).
//! - `fina`: final-form overrides keyed on the preceding letter (`forms.rs`).
//! - `dotc`: attachment, collision flags and sweep boundaries (`collision.rs`).
//!
//! The dispatch arms live in `offsets.rs`; the caller-invoked override
//! routines in `overrides.rs`. Everything is plain data compiled once by
//! [`crate::Shaper::new`].

#[path = "rules/classes.rs"]
mod classes;
#[path = "rules/collision.rs"]
mod collision;
#[path = "rules/forms.rs"]
mod forms;
#[path = "rules/inventory.rs"]
mod inventory;
#[path = "rules/ligatures.rs"]
mod ligatures;
#[path = "rules/offsets.rs"]
mod offsets;
#[path = "rules/overrides.rs"]
pub(crate) mod overrides;

#[cfg(test)]
#[path = "rules/tests.rs"]
mod tests;

use crate::{ClassRegistry, DefinitionError, Dispatch, Feature, Filter, LookupFlags, Routine, RunArity, SequenceMask};

/// Default global feature order.
pub const FEATURE_ORDER: &[&str] = &["liga", "fina", "dotc"];

/// Name of the zero-width run boundary glyph.
pub const SENTINEL: &str = "SENTINEL";

pub(crate) fn registry() -> Result<ClassRegistry, DefinitionError> {
    classes::registry()
}

pub(crate) fn routines() -> Vec<Routine> {
    let mut all = ligatures::routines();
    all.extend(forms::routines());
    all.extend(collision::routines());
    all.extend(offsets::routines());
    all.extend(overrides::routines());
    all
}

/// Features in [`FEATURE_ORDER`].
pub(crate) fn features() -> Vec<Feature> {
    vec![
        Feature { tag: "liga", routines: vec!["pair_ligatures"], requires: SequenceMask::BASES },
        Feature { tag: "fina", routines: vec!["final_form_overrides"], requires: SequenceMask::BASES },
        Feature {
            tag: "dotc",
            routines: vec!["attach_secondary", "flag_collisions", "mark_sweep_boundaries"],
            requires: SequenceMask::MARKS,
        },
    ]
}

pub(crate) fn dispatch() -> Dispatch {
    Dispatch {
        sentinel: SENTINEL,
        qualifying: "dots_moved",
        filter: Filter::new(LookupFlags::IGNORE_BASES | LookupFlags::IGNORE_LIGATURES).with_mark_set("dots_below"),
        arms: vec![(RunArity::Two, "dots_two"), (RunArity::Three, "dots_three"), (RunArity::Four, "dots_four")],
        flag_tag: "collides",
        follower_tag: "attached",
    }
}
