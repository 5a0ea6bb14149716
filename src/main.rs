mod debug_report;

use qalam::{BaselinePositioner, Force, Options, Override, Shaper, UnhandledReason};
use std::io::{self, IsTerminal, Read};

fn main() {
    env_logger::init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let shaper = match &config.order {
        Some(order) => Shaper::with_feature_order(&order.iter().map(String::as_str).collect::<Vec<_>>()),
        None => Shaper::new(),
    };
    let shaper = match shaper {
        Ok(shaper) => shaper,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let tokens = shaper.tokens(&config.input);
    let res = shaper.shape_verbose(tokens, &BaselinePositioner, &config.options);

    for run in &res.details.dispatch.unhandled {
        match run.reason {
            UnhandledReason::Overflow => {
                log::warn!("{} dots before sentinel {}: no routine for runs this long", run.count, run.sentinel)
            }
            UnhandledReason::NoPattern => {
                log::warn!("dot pattern {} before sentinel {} is not in the table", run.pattern, run.sentinel)
            }
        }
    }

    debug_report::print_run(&config.input, &res, config.color);
}

struct CliConfig {
    input: String,
    order: Option<Vec<String>>,
    options: Options,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut order = None;
    let mut options = Options::default();
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("qalam {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--no-dispatch" => options.dispatch = false,
            "--order" => {
                let value = args.next().ok_or_else(|| "error: --order expects a value".to_string())?;
                order = Some(split_list(&value));
            }
            "--disable" => {
                let value = args.next().ok_or_else(|| "error: --disable expects a value".to_string())?;
                options.disabled_features.extend(split_list(&value));
            }
            "--force" => {
                let value = args.next().ok_or_else(|| "error: --force expects a value".to_string())?;
                options.overrides.push(parse_force(&value)?);
            }
            "--" => {
                let rest = args.by_ref().collect::<Vec<_>>().join(" ");
                set_input(&mut input, rest)?;
                break;
            }
            _ if arg.starts_with("--order=") => order = Some(split_list(arg.trim_start_matches("--order="))),
            _ if arg.starts_with("--disable=") => {
                options.disabled_features.extend(split_list(arg.trim_start_matches("--disable=")))
            }
            _ if arg.starts_with("--force=") => options.overrides.push(parse_force(arg.trim_start_matches("--force="))?),
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args.by_ref()).collect::<Vec<_>>().join(" ");
                set_input(&mut input, rest)?;
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, order, options, color })
}

fn set_input(input: &mut Option<String>, value: String) -> Result<(), String> {
    if value.trim().is_empty() {
        return Ok(());
    }
    if input.is_some() {
        return Err("error: input provided multiple times".to_string());
    }
    *input = Some(value);
    Ok(())
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

fn parse_force(value: &str) -> Result<(Override, Force), String> {
    let (target, state) = value
        .split_once('=')
        .ok_or_else(|| format!("error: invalid --force '{value}' (expected <moved|collides>=<on|off|flip>)"))?;
    let target = match target {
        "moved" => Override::Moved,
        "collides" => Override::Collides,
        _ => return Err(format!("error: unknown --force target '{target}' (expected moved or collides)")),
    };
    let force = match state {
        "on" => Force::On,
        "off" => Force::Off,
        "flip" => Force::Flip,
        _ => return Err(format!("error: unknown --force state '{state}' (expected on, off or flip)")),
    };
    Ok((target, force))
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "qalam {version}

Nastaliq contextual shaping and dot-collision CLI.

Usage:
  qalam [OPTIONS] [--] <glyph...>
  echo 'BEi1 sdb.yb BEm2 tdb.yb BARI_YEf1' | qalam [OPTIONS]

Glyph names are separated by whitespace. When no names are given on the
command line they are read from stdin.

Options:
  --order <tags>             Comma-separated feature order.
                             Default: {default_order}
  --disable <tags>           Comma-separated features to skip. Repeatable.
  --no-dispatch              Skip the dot counting/positioning pass.
  --force <state>=<mode>     Force a dot state before positioning. State is
                             moved or collides, mode is on, off or flip.
                             Repeatable; applied in order.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Set RUST_LOG=qalam=debug to trace features and dispatch.

Exit codes:
  0  Success.
  1  Invalid rule set or feature order.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        default_order = qalam::FEATURE_ORDER.join(",")
    )
}
