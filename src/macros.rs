#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Captured match item: `cap!(glyph "LAMi1")` or `cap!(class "narrow")`.
#[macro_export]
macro_rules! cap {
    (glyph $name:expr) => {
        $crate::MatchItem { element: $crate::Element::Glyph($name), captured: true }
    };
    (class $name:expr) => {
        $crate::MatchItem { element: $crate::Element::Class($name), captured: true }
    };
}

/// Context-only match item, same forms as [`cap!`].
#[macro_export]
macro_rules! ctx {
    (glyph $name:expr) => {
        $crate::MatchItem { element: $crate::Element::Glyph($name), captured: false }
    };
    (class $name:expr) => {
        $crate::MatchItem { element: $crate::Element::Class($name), captured: false }
    };
}

#[macro_export]
macro_rules! rule {
    (
        name: $name:expr,
        pattern: [ $($item:expr),* $(,)? ],
        action: $action:expr
        $(, filter: $filter:expr)?
        $(,)?
    ) => {{
        #[allow(unused_mut, unused_assignments)]
        let mut filter: Option<$crate::Filter> = None;
        $(filter = Some($filter);)?
        $crate::Rule { name: $name, pattern: vec![ $($item),* ], action: $action, filter }
    }};
}
