use qalam::{PositionedGlyph, ShapeResultVerbose, UnhandledReason};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(input: &str, res: &ShapeResultVerbose, color: bool) {
    let palette = ansi::Palette::new(color);
    let input = input.split_whitespace().collect::<Vec<_>>().join(" ");
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Shaping: {}", input), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Features ━━━", ansi::GRAY));
    print_features(res, &palette);

    if !res.details.overrides.is_empty() {
        println!("\n{}", palette.paint("━━━ Overrides ━━━", ansi::GRAY));
        for routine in &res.details.overrides {
            println!("  {} {}", palette.paint(routine.name, ansi::BLUE), palette.dim(format!("{} applied", routine.applied)));
        }
    }

    println!("\n{}", palette.paint("━━━ Dispatch ━━━", ansi::GRAY));
    print_dispatch(res, &palette);

    println!("\n{}", palette.paint("━━━ Glyphs ━━━", ansi::GRAY));
    if res.glyphs.is_empty() {
        println!("{}", palette.dim("  No glyphs produced"));
    }
    for (idx, glyph) in res.glyphs.iter().enumerate() {
        println!("  {} {}", palette.paint(format!("[{}]", idx), ansi::GRAY), fmt_glyph(glyph, &palette));
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    let features: std::time::Duration = res.details.features.iter().map(|f| f.duration).sum();
    println!(
        "  Total: {}  │  Features: {}  │  Dispatch: {}",
        palette.paint(format!("{:?}", res.details.total), ansi::GREEN),
        palette.paint(format!("{:?}", features), ansi::CYAN),
        palette.dim(format!("{:?}", res.details.dispatch.duration)),
    );
    println!();
}

fn print_features(res: &ShapeResultVerbose, palette: &ansi::Palette) {
    for feature in &res.details.features {
        if feature.skipped {
            println!("  {} {}", palette.paint(format!("{}:", feature.tag), ansi::BLUE), palette.dim("skipped"));
            continue;
        }

        let applied = feature.applied();
        println!(
            "  {} {}",
            palette.paint(format!("{}:", feature.tag), ansi::BLUE),
            if applied > 0 {
                palette.paint(format!("✓ {} applied", applied), ansi::GREEN)
            } else {
                palette.dim(format!("✗ {} applied", applied))
            }
        );
        for routine in feature.routines.iter().filter(|r| r.applied > 0) {
            println!("    {} {}", palette.paint(routine.name, ansi::CYAN), palette.dim(format!("×{}", routine.applied)));
        }
    }
}

fn print_dispatch(res: &ShapeResultVerbose, palette: &ansi::Palette) {
    let dispatch = &res.details.dispatch;
    if dispatch.dispatched.is_empty() && dispatch.unhandled.is_empty() {
        println!("{}", palette.dim("  No runs of two or more dots"));
        return;
    }

    for run in &dispatch.dispatched {
        println!(
            "  {} {} {}",
            palette.paint(run.routine, ansi::BLUE),
            palette.bold(palette.paint(run.pattern, ansi::GREEN)),
            palette.dim(format!("marks {:?}", run.marks)),
        );
    }
    for run in &dispatch.unhandled {
        let reason = match run.reason {
            UnhandledReason::Overflow => "too many dots",
            UnhandledReason::NoPattern => "no pattern",
        };
        println!(
            "  {} {} {}",
            palette.paint(reason, ansi::YELLOW),
            palette.bold(&run.pattern),
            palette.dim(format!("before sentinel {}", run.sentinel)),
        );
    }
}

fn fmt_glyph(glyph: &PositionedGlyph, palette: &ansi::Palette) -> String {
    let placement = glyph.placement();
    let adjusted = match glyph.adjustment {
        Some(delta) => palette.paint(format!("Δx {:+}", delta.x), ansi::YELLOW),
        None => String::new(),
    };
    format!(
        "{} {} {} {}",
        palette.bold(palette.paint(&glyph.name, ansi::GREEN)),
        palette.dim(format!("{:?}", glyph.category)),
        palette.paint(format!("({}, {})", placement.x, placement.y), ansi::CYAN),
        adjusted
    )
}
