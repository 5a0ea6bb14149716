//! Class definitions of the built-in rule set.

use super::inventory::{INVENTORY, LIGATURES};
use crate::{ClassExpr, ClassRegistry, DefinitionError, RegistryBuilder};

pub(crate) fn registry() -> Result<ClassRegistry, DefinitionError> {
    let mut b = RegistryBuilder::new(INVENTORY.iter().cloned());

    // Dots
    b.define("dots_below", ClassExpr::Matching(regex!(r"^[sdt]db(\.|$)")))?
        .define(
            "dots_moved",
            ClassExpr::Intersection(vec![ClassExpr::class("dots_below"), ClassExpr::Matching(regex!(r"\.yb(\.|$)"))]),
        )?
        .define(
            "dots_collides",
            ClassExpr::Intersection(vec![
                ClassExpr::class("dots_below"),
                ClassExpr::Matching(regex!(r"\.collides(\.|$)")),
            ]),
        )?
        .define(
            "dots_moved_collides",
            ClassExpr::Intersection(vec![ClassExpr::class("dots_moved"), ClassExpr::class("dots_collides")]),
        )?
        .define("dots_moved_plain", ClassExpr::class("dots_moved").minus(ClassExpr::class("dots_collides")))?;

    // Other marks
    b.define(
        "secondary_marks",
        ClassExpr::Matching(regex!(r"^(sda|dda|tda|toeda|hamza|zabar|zer|pesh|tashdid)(\.|$)")),
    )?
    .define("marks", ClassExpr::Union(vec![ClassExpr::class("dots_below"), ClassExpr::class("secondary_marks")]))?;

    // Letters
    b.define("ligatures", ClassExpr::glyphs(LIGATURES.iter().copied()))?
        .define("letters", ClassExpr::Matching(regex!(r"^[A-Z_]+[imfu]\d+$")).minus(ClassExpr::class("ligatures")))?
        .define("narrow", ClassExpr::NumberInRange { pattern: regex!(r"^BEm(\d+)$"), range: 1..=6 })?
        .define("sweeps", ClassExpr::Matching(regex!(r"^BARI_YE[fu]\d+$")))?;

    // Preceding-letter classes for final-form overrides. `tall_connectors`
    // overlaps `lam_letters` and `kaf_gaf`.
    b.define("lam_letters", ClassExpr::Matching(regex!(r"^LAM[im]2$")))?
        .define("kaf_gaf", ClassExpr::Matching(regex!(r"^(KAF|GAF)[im]\d+$")))?
        .define(
            "tall_connectors",
            ClassExpr::Union(vec![ClassExpr::Matching(regex!(r"^LAM[im]\d+$")), ClassExpr::class("kaf_gaf")]),
        )?
        .define("jim_letters", ClassExpr::Matching(regex!(r"^JIM[im]\d+$")))?
        .define("sin_sad", ClassExpr::Matching(regex!(r"^(SIN|SAD)[im]\d+$")))?;

    b.build()
}
