//! Static glyph-name inventory.
//!
//! Every glyph the built-in rule set can produce must be listed here, because
//! pattern classes are evaluated against this list only. That includes every
//! tag combination a retag or toggle can reach.

use once_cell::sync::Lazy;

/// Letter base names with the number of initial, medial, final and isolated
/// variants the font carries.
const LETTERS: &[(&str, [u32; 4])] = &[
    ("ALIF", [0, 0, 3, 1]),
    ("BE", [2, 12, 2, 1]),
    ("JIM", [2, 2, 1, 1]),
    ("DAL", [0, 0, 1, 1]),
    ("RE", [0, 0, 1, 1]),
    ("SIN", [1, 1, 1, 1]),
    ("SAD", [1, 1, 1, 1]),
    ("TOE", [1, 1, 1, 1]),
    ("AIN", [1, 1, 1, 1]),
    ("FE", [1, 1, 1, 1]),
    ("QAF", [1, 1, 1, 1]),
    ("KAF", [2, 2, 1, 1]),
    ("GAF", [2, 2, 1, 1]),
    ("LAM", [2, 2, 1, 1]),
    ("MIM", [1, 1, 1, 1]),
    ("NUN", [0, 0, 2, 1]),
    ("WAW", [0, 0, 1, 1]),
    ("HE", [1, 1, 1, 1]),
    ("CHOTI_YE", [0, 0, 1, 1]),
    ("BARI_YE", [0, 0, 2, 1]),
];

const FORMS: [char; 4] = ['i', 'm', 'f', 'u'];

pub(crate) const LIGATURES: &[&str] = &["LAM_ALIFf1", "LAM_ALIFf2", "KAF_ALIFf1", "GAF_ALIFf1", "LAM_MIMf1"];

/// Single, double and triple dot below.
pub(crate) const DOTS_BELOW: &[&str] = &["sdb", "ddb", "tdb"];

pub(crate) const SECONDARY_MARKS: &[&str] =
    &["sda", "dda", "tda", "toeda", "hamza", "zabar", "zer", "pesh", "tashdid"];

pub(crate) static INVENTORY: Lazy<Vec<String>> = Lazy::new(build);

fn build() -> Vec<String> {
    let mut names = Vec::new();

    for (base, counts) in LETTERS {
        for (form, &count) in FORMS.iter().zip(counts) {
            names.extend((1..=count).map(|n| format!("{base}{form}{n}")));
        }
    }
    names.extend(LIGATURES.iter().map(|s| s.to_string()));

    for dot in DOTS_BELOW {
        for moved in ["", ".yb"] {
            for collides in ["", ".collides"] {
                for variant in ["", ".one", ".two"] {
                    names.push(format!("{dot}{moved}{collides}{variant}"));
                }
            }
        }
    }

    for mark in SECONDARY_MARKS {
        names.push(mark.to_string());
        names.push(format!("{mark}.attached"));
    }

    names.push(super::SENTINEL.to_string());
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_every_dot_state() {
        for name in ["sdb", "tdb.yb", "ddb.yb.collides.two", "sdb.collides.one"] {
            assert!(INVENTORY.iter().any(|n| n == name), "{name} missing");
        }
        assert_eq!(INVENTORY.iter().filter(|n| n.starts_with("tdb")).count(), 12);
    }

    #[test]
    fn letter_forms_are_numbered() {
        assert!(INVENTORY.iter().any(|n| n == "BEm12"));
        assert!(!INVENTORY.iter().any(|n| n == "BEm13"));
        assert!(!INVENTORY.iter().any(|n| n == "ALIFi1"));
    }
}
