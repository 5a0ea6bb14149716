use super::offsets::{FOUR, OFFSET_QUANTUM, THREE, TWO, quantize};
use crate::{
    BaselinePositioner, Force, GlyphToken, Offset, Options, Override, Shaper, UnhandledReason, shape, shape_with,
};
use pretty_assertions::assert_eq;

fn names(tokens: &[GlyphToken]) -> Vec<&str> {
    tokens.iter().map(|t| t.name.as_str()).collect()
}

fn shaper() -> Shaper {
    Shaper::new().unwrap()
}

/// Run `dotc` only, the way a full run leaves the sequence before dispatch.
fn mark(shaper: &Shaper, text: &str) -> Vec<GlyphToken> {
    let mut tokens = shaper.tokens(text);
    shaper.run_feature("dotc", &mut tokens).unwrap();
    tokens
}

/// Marks for a flag label (`C` collides, `P` plain), one narrow letter apart,
/// closed by a sentinel.
fn run_for_label(shaper: &Shaper, label: &str) -> Vec<GlyphToken> {
    let mut text = String::from("BEi1");
    for flag in label.chars() {
        text.push_str(if flag == 'C' { " sdb.yb.collides" } else { " sdb.yb" });
        text.push_str(" BEm2");
    }
    text.push_str(" SENTINEL BARI_YEf1");
    shaper.tokens(&text)
}

fn quantized<const N: usize>(raw: [i32; N]) -> Vec<Offset> {
    raw.iter().map(|&x| Offset::horizontal(quantize(x, OFFSET_QUANTUM))).collect()
}

#[test]
fn scenario_two_colliding_dots_under_a_sweep() {
    let shaper = shaper();
    let mut tokens = mark(&shaper, "BEi1 sdb.yb toeda BEm2 tdb.yb BARI_YEf1");
    assert_eq!(
        names(&tokens),
        vec!["BEi1", "sdb.yb.collides", "toeda.attached", "BEm2", "tdb.yb.collides", "SENTINEL", "BARI_YEf1"]
    );

    let metrics = shaper.dispatch(&mut tokens);
    assert_eq!(metrics.dispatched.len(), 1);
    assert_eq!(metrics.dispatched[0].routine, "dots_two");
    assert_eq!(metrics.dispatched[0].pattern, "CC");
    assert!(metrics.unhandled.is_empty());

    assert_eq!(names(&tokens), vec!["BEi1", "sdb.yb.collides", "toeda.attached", "BEm2", "tdb.yb.collides", "BARI_YEf1"]);
    assert_eq!(tokens[1].adjustment, Some(Offset::horizontal(0)));
    assert_eq!(tokens[4].adjustment, Some(Offset::horizontal(-200)));
    // The attached mark moves with its dot.
    assert_eq!(tokens[2].adjustment, tokens[1].adjustment);
}

#[test]
fn attached_mark_follows_a_nonzero_shift() {
    let shaper = shaper();
    let mut tokens = shaper.tokens("BEi1 sdb.yb.collides toeda.attached BEm2 tdb.yb SENTINEL BARI_YEf1");
    let metrics = shaper.dispatch(&mut tokens);

    assert_eq!(metrics.dispatched[0].pattern, "CP");
    assert_eq!(tokens[1].adjustment, Some(Offset::horizontal(120)));
    assert_eq!(tokens[2].adjustment, Some(Offset::horizontal(120)));
    assert_eq!(tokens[4].adjustment, Some(Offset::horizontal(0)));
}

#[test]
fn scenario_single_dot_is_left_alone() {
    let shaper = shaper();
    let mut tokens = mark(&shaper, "BEi1 sdb.yb BARI_YEf1");
    assert_eq!(names(&tokens), vec!["BEi1", "sdb.yb", "SENTINEL", "BARI_YEf1"]);

    let metrics = shaper.dispatch(&mut tokens);
    assert!(metrics.dispatched.is_empty());
    assert!(metrics.unhandled.is_empty());
    assert!(tokens.iter().all(|t| t.adjustment.is_none()));
}

#[test]
fn scenario_four_dots_second_collides() {
    let shaper = shaper();
    let mut tokens = shaper.tokens("BEi1 sdb.yb tdb.yb.collides ddb.yb sdb.yb SENTINEL BARI_YEf1");
    let metrics = shaper.dispatch(&mut tokens);

    assert_eq!(metrics.dispatched.len(), 1);
    assert_eq!(metrics.dispatched[0].routine, "dots_four");
    assert_eq!(metrics.dispatched[0].pattern, "PCPP");
    assert_eq!(metrics.dispatched[0].marks, vec![1, 2, 3, 4]);
    assert_eq!(metrics.dispatched[0].arity.len(), metrics.dispatched[0].marks.len());

    let adjustments: Vec<Option<Offset>> = tokens[1..5].iter().map(|t| t.adjustment).collect();
    let expected = [0, -160, 40, 0].map(|x| Some(Offset::horizontal(x)));
    assert_eq!(adjustments, expected.to_vec());
}

#[test]
fn scenario_ligature_precedes_form_override() {
    // Default order: the lam is gone before `fina` looks for it.
    let out = shape("LAMi1 ALIFf1");
    assert_eq!(out.glyphs.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(), vec!["LAM_ALIFf1"]);

    // Overrides first: the final is rewritten and no longer pairs.
    let shaper = Shaper::with_feature_order(&["fina", "liga", "dotc"]).unwrap();
    let out = shaper.shape(shaper.tokens("LAMi1 ALIFf1"), &BaselinePositioner, &Options::default());
    assert_eq!(out.glyphs.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(), vec!["LAMi1", "ALIFf2"]);
}

#[test]
fn overlapping_preceding_classes_first_rule_wins() {
    let shaper = shaper();
    let mut tokens = shaper.tokens("LAMi2 ALIFf1");
    shaper.run_feature("fina", &mut tokens).unwrap();
    assert_eq!(names(&tokens), vec!["LAMi2", "ALIFf3"]);

    let mut tokens = shaper.tokens("KAFm2 toeda NUNf1");
    shaper.run_feature("fina", &mut tokens).unwrap();
    assert_eq!(names(&tokens), vec!["KAFm2", "toeda", "NUNf2"]);
}

#[test]
fn ligature_keeps_marks_in_between() {
    let shaper = shaper();
    let mut tokens = shaper.tokens("LAMi1 zabar ALIFf1");
    let metrics = shaper.run_feature("liga", &mut tokens).unwrap();
    assert_eq!(metrics.applied(), 1);
    assert_eq!(names(&tokens), vec!["LAM_ALIFf1", "zabar"]);
}

#[test]
fn collision_marking_is_idempotent() {
    let shaper = shaper();
    for text in [
        "BEi1 sdb.yb toeda BEm2 tdb.yb BARI_YEf1",
        "BEi1 sdb.yb BEm3 BEm4 ddb.yb BEm2 tdb.yb hamza BARI_YEu1",
        "BEi1 sdb.yb BEm9 tdb.yb BARI_YEf1",
    ] {
        let once = mark(&shaper, text);
        let mut twice = once.clone();
        let metrics = shaper.run_feature("dotc", &mut twice).unwrap();
        assert_eq!(names(&twice), names(&once), "{text}");
        assert_eq!(metrics.routines[0].name, "attach_secondary");
    }
}

#[test]
fn every_mark_in_a_run_is_flagged() {
    let shaper = shaper();
    let tokens = mark(&shaper, "BEi1 sdb.yb BEm3 BEm4 ddb.yb BEm2 tdb.yb hamza BARI_YEu1");
    assert_eq!(
        names(&tokens),
        vec![
            "BEi1",
            "sdb.yb.collides",
            "BEm3",
            "BEm4",
            "ddb.yb.collides",
            "BEm2",
            "tdb.yb.collides",
            "hamza.attached",
            "SENTINEL",
            "BARI_YEu1",
        ]
    );
}

#[test]
fn wide_letter_separates_dots() {
    let shaper = shaper();
    let tokens = mark(&shaper, "BEi1 sdb.yb BEm9 tdb.yb BARI_YEf1");
    assert_eq!(names(&tokens), vec!["BEi1", "sdb.yb", "BEm9", "tdb.yb", "SENTINEL", "BARI_YEf1"]);
}

#[test]
fn any_number_of_narrow_letters_joins_dots() {
    let shaper = shaper();
    let tokens = mark(&shaper, "BEi1 sdb.yb BEm2 BEm3 BEm4 tdb.yb BARI_YEf1");
    assert_eq!(
        names(&tokens),
        vec!["BEi1", "sdb.yb.collides", "BEm2", "BEm3", "BEm4", "tdb.yb.collides", "SENTINEL", "BARI_YEf1"]
    );

    let tokens = mark(&shaper, "BEi1 sdb.yb BEm2 BEm3 BEm4 BEm9 tdb.yb BARI_YEf1");
    assert!(tokens.iter().all(|t| !t.has_tag("collides")));
}

#[test]
fn adjacent_dots_are_flagged() {
    let shaper = shaper();
    let tokens = mark(&shaper, "BEi1 sdb.yb tdb.yb BARI_YEf1");
    assert_eq!(names(&tokens), vec!["BEi1", "sdb.yb.collides", "tdb.yb.collides", "SENTINEL", "BARI_YEf1"]);
}

#[test]
fn short_runs_are_never_flagged_or_dispatched() {
    let shaper = shaper();
    for text in ["BEi1 BEm2 BARI_YEf1", "BEi1 sdb.yb BEm2 BARI_YEf1", "sdb BEm2 tdb.yb BARI_YEf1"] {
        let mut tokens = mark(&shaper, text);
        assert!(tokens.iter().all(|t| !t.has_tag("collides")), "{text}");
        let metrics = shaper.dispatch(&mut tokens);
        assert!(metrics.dispatched.is_empty(), "{text}");
        assert!(metrics.unhandled.is_empty(), "{text}");
    }
}

#[test]
fn every_listed_pattern_positions_every_mark() {
    let shaper = shaper();
    let tables: Vec<(&str, Vec<Offset>)> = TWO
        .iter()
        .map(|&(label, raw)| (label, quantized(raw)))
        .chain(THREE.iter().map(|&(label, raw)| (label, quantized(raw))))
        .chain(FOUR.iter().map(|&(label, raw)| (label, quantized(raw))))
        .collect();

    for (label, expected) in tables {
        let mut tokens = run_for_label(&shaper, label);
        let metrics = shaper.dispatch(&mut tokens);
        assert_eq!(metrics.dispatched.len(), 1, "{label}");
        assert_eq!(metrics.dispatched[0].pattern, label);

        let adjustments: Vec<Offset> = tokens
            .iter()
            .filter(|t| t.name.starts_with("sdb"))
            .map(|t| t.adjustment.unwrap_or_else(|| panic!("{label}: mark left unset")))
            .collect();
        assert_eq!(adjustments, expected, "{label}");
    }
}

#[test]
fn unanticipated_pattern_is_reported() {
    let shaper = shaper();
    let mut tokens = run_for_label(&shaper, "PPP");
    let metrics = shaper.dispatch(&mut tokens);

    assert!(metrics.dispatched.is_empty());
    assert_eq!(metrics.unhandled.len(), 1);
    assert_eq!(metrics.unhandled[0].reason, UnhandledReason::NoPattern);
    assert_eq!(metrics.unhandled[0].pattern, "PPP");
    assert!(tokens.iter().all(|t| t.adjustment.is_none()));
    assert!(tokens.iter().all(|t| !t.is_sentinel()));
}

#[test]
fn overflowing_run_is_reported() {
    let shaper = shaper();
    let mut tokens = run_for_label(&shaper, "CCCCCC");
    let metrics = shaper.dispatch(&mut tokens);

    assert!(metrics.dispatched.is_empty());
    assert_eq!(metrics.unhandled.len(), 1);
    assert_eq!(metrics.unhandled[0].reason, UnhandledReason::Overflow);
    assert_eq!(metrics.unhandled[0].count, 5);
    assert!(tokens.iter().all(|t| t.adjustment.is_none()));
}

#[test]
fn sentinel_is_inserted_once_and_never_emitted() {
    let shaper = shaper();
    let tokens = mark(&shaper, "BEi1 sdb.yb BARI_YEf1 BEi1 tdb.yb BARI_YEu1");
    assert_eq!(tokens.iter().filter(|t| t.is_sentinel()).count(), 2);

    let out = shape_with(tokens, &BaselinePositioner, &Options::default());
    assert!(out.glyphs.iter().all(|g| g.name != crate::SENTINEL));
    assert_eq!(out.glyphs.len(), 6);
}

#[test]
fn runs_are_counted_per_sentinel() {
    let shaper = shaper();
    let mut tokens = shaper.tokens(
        "BEi1 sdb.yb.collides BEm2 tdb.yb.collides SENTINEL BARI_YEf1 BEi1 sdb.yb BEm2 ddb.yb.collides SENTINEL BARI_YEf1",
    );
    let metrics = shaper.dispatch(&mut tokens);

    // Right to left.
    let patterns: Vec<&str> = metrics.dispatched.iter().map(|d| d.pattern).collect();
    assert_eq!(patterns, vec!["PC", "CC"]);
    assert_eq!(tokens[8].adjustment, Some(Offset::horizontal(-150)));
    assert_eq!(tokens[3].adjustment, Some(Offset::horizontal(-200)));
}

#[test]
fn forcing_round_trips() {
    let shaper = shaper();
    let start = shaper.tokens("sdb.yb.collides.one BEm2 tdb.yb.two");

    for target in [Override::Moved, Override::Collides] {
        let mut tokens = start.clone();
        let len = tokens.len();
        shaper.apply_override(&mut tokens, target, Force::On, 0..len).unwrap();
        shaper.apply_override(&mut tokens, target, Force::Off, 0..len).unwrap();
        shaper.apply_override(&mut tokens, target, Force::On, 0..len).unwrap();
        if target == Override::Collides {
            // `tdb.yb.two` starts plain and ends flagged.
            assert_eq!(names(&tokens), vec!["sdb.yb.collides.one", "BEm2", "tdb.yb.collides.two"]);
        } else {
            assert_eq!(names(&tokens), names(&start));
        }
    }
}

#[test]
fn toggling_twice_is_identity() {
    let shaper = shaper();
    let start = shaper.tokens("sdb.yb.collides.one BEm2 tdb.two ddb.yb");

    for target in [Override::Moved, Override::Collides] {
        let mut tokens = start.clone();
        let len = tokens.len();
        shaper.apply_override(&mut tokens, target, Force::Flip, 0..len).unwrap();
        assert_ne!(names(&tokens), names(&start));
        shaper.apply_override(&mut tokens, target, Force::Flip, 0..len).unwrap();
        assert_eq!(names(&tokens), names(&start));
    }
}

#[test]
fn variants_survive_toggles() {
    let shaper = shaper();
    let mut tokens = shaper.tokens("tdb.yb.collides.two");
    shaper.apply_override(&mut tokens, Override::Moved, Force::Off, 0..1).unwrap();
    assert_eq!(tokens[0].name, "tdb.collides.two");
    shaper.apply_override(&mut tokens, Override::Moved, Force::On, 0..1).unwrap();
    assert_eq!(tokens[0].name, "tdb.yb.collides.two");
}

#[test]
fn concurrent_runs_are_deterministic() {
    let shaper = shaper();
    let text = "BEi1 sdb.yb toeda BEm2 tdb.yb BEm3 ddb.yb BARI_YEf1 LAMi1 ALIFf1";
    let reference = shaper.shape(shaper.tokens(text), &BaselinePositioner, &Options::default()).glyphs;

    let shaper = &shaper;
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(move || shaper.shape(shaper.tokens(text), &BaselinePositioner, &Options::default()).glyphs)
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), reference);
        }
    });
}
