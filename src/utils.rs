//! Miscellaneous utility modules for tfm.
//!
//! - [cli]: argument parsing, `--help`, `--init` and `--keybinds`
//! - [helpers]: `~` expansion, paste destinations, recursive copy, color parsing
//! - [layout]: keyboard-layout normalization of key tokens
//! - [logging]: the tracing file subscriber

pub mod cli;
pub mod helpers;
pub mod layout;
pub mod logging;

pub use helpers::{
    adapt_color, copy_recursive, expand_home, parse_color, resolve_path, unique_dest_path,
};
pub use layout::normalize_token;
