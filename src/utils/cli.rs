//! Command-line argument parsing and help for tfm.
//!
//! This module handles the few flags tfm knows: config initialization, help,
//! version, the keybinding list and the start options (`--config`, `--log-level`).
//!
//! When invoked with no args (tfm), tfm opens the current directory.

use crate::app::keymap::DEFAULT_BINDINGS;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::utils::helpers::expand_home;

use std::fs;
use std::path::PathBuf;

/// What a normal run was asked for on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    pub path: Option<String>,
    /// `--config <path>`, read instead of the default location.
    pub config: Option<PathBuf>,
    /// `--log-level <level>`, overrides `[general] log_level`.
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run(StartOptions),
    Version,
    Help,
    Init,
    Keybinds,
    Invalid(String),
}

/// Parses the arguments after the program name.
///
/// Informational flags win as soon as they are seen. Option values may be
/// given as `--config path` or `--config=path`.
pub fn parse_args(args: &[String]) -> CliAction {
    let mut opts = StartOptions::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value.to_string())),
            _ => (arg.as_str(), None),
        };
        match flag {
            "--version" | "-v" => return CliAction::Version,
            "-h" | "--help" => return CliAction::Help,
            "--init" => return CliAction::Init,
            "--keybinds" => return CliAction::Keybinds,
            "--config" | "--log-level" => {
                let Some(value) = inline.or_else(|| iter.next().cloned()) else {
                    return CliAction::Invalid(format!("{flag} needs a value"));
                };
                if value.trim().is_empty() {
                    return CliAction::Invalid(format!("{flag} needs a value"));
                }
                if flag == "--config" {
                    opts.config = Some(expand_home(&value));
                } else {
                    opts.log_level = Some(value);
                }
            }
            a if !a.starts_with('-') && !a.trim().is_empty() => {
                if opts.path.is_some() {
                    return CliAction::Invalid("tfm opens only one path at a time.".to_string());
                }
                opts.path = Some(a.to_string());
            }
            _ => return CliAction::Invalid(format!("Unknown argument: {arg}")),
        }
    }
    CliAction::Run(opts)
}

/// Handles the informational flags itself. Returns the options to start with,
/// or `None` when tfm should exit right away.
pub fn handle_args() -> Option<StartOptions> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(&args) {
        CliAction::Run(opts) => Some(opts),
        CliAction::Version => {
            println!("tfm {}", env!("CARGO_PKG_VERSION"));
            None
        }
        CliAction::Help => {
            print_help();
            None
        }
        CliAction::Init => {
            let path = Config::default_path();
            match Config::generate_default(&path) {
                Ok(()) => println!("Config written to {}", path.display()),
                Err(e) => eprintln!("Error: {e}"),
            }
            None
        }
        CliAction::Keybinds => {
            print!("{}", keybinds_text());
            None
        }
        CliAction::Invalid(msg) => {
            eprintln!("{msg}");
            eprintln!("Usage: tfm [OPTIONS] [PATH]. Try --help for available options");
            None
        }
    }
}

/// Resolves the start directory: `~` expansion, then canonicalized.
/// Anything that is not an existing directory is an error.
pub fn resolve_start(arg: Option<&str>) -> Result<PathBuf> {
    let raw = match arg {
        Some(a) => expand_home(a),
        None => std::env::current_dir()?,
    };
    let path = fs::canonicalize(&raw).map_err(|e| Error::from_io(&raw, e))?;
    if !path.is_dir() {
        return Err(Error::NotADirectory(path));
    }
    Ok(path)
}

fn print_help() {
    println!(
        r#"tfm - a keyboard-driven terminal file browser

USAGE:
  tfm [OPTIONS] [PATH]

PATH:
  Directory to open (defaults to current directory)

OPTIONS:
      --config <PATH>     Read this config file instead of the default
      --log-level <LEVEL> Log level: error, warn, info, debug or trace
      --init              Write the default configuration file
      --keybinds          Display the default keybinds
  -h, --help              Print help information
  -v, --version           Display the installed version of tfm

ENVIRONMENT:
  TFM_CONFIG              Override the default config path
  TFM_LOG                 Log filter, e.g. "debug" or "tfm=trace"
  TFM_COLOR               Color profile: none, ansi, 256 or truecolor
  TFM_INLINE              Force inline images on (1) or off (0)
  TFM_NO_INLINE_IMAGES    Disable inline images
  TFM_INLINE_MAX_BYTES    Largest image file drawn inline
"#
    );
}

/// The default bindings grouped by action, one action per line.
pub fn keybinds_text() -> String {
    let mut actions: Vec<(&str, Vec<&str>)> = Vec::new();
    for &(spec, action) in DEFAULT_BINDINGS {
        match actions.iter_mut().find(|(a, _)| *a == action) {
            Some((_, specs)) => specs.push(spec),
            None => actions.push((action, vec![spec])),
        }
    }

    let mut out = String::from("Key bindings ([keys] in config.toml)\n\n");
    for (action, specs) in actions {
        let specs: Vec<String> = specs.iter().map(|s| format!("\"{s}\"")).collect();
        out.push_str(&format!("  {action:<24}[{}]\n", specs.join(", ")));
    }
    out.push_str(
        "\n  Also bindable: focus-left, focus-right\n  \
         Chords: \"gg\" or \"g g\" is g then g; modifiers as ctrl+x, alt+x\n",
    );
    out
}
