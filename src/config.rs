//! Configuration for tfm.
//!
//! Settings are read from `config.toml` (see [Config::default_path]) into a
//! raw serde struct and converted into [Config]. Every table is optional and
//! falls back to the internal defaults.
//!
//! Submodules:
//! - [general]: hidden files, open-right mode, log level
//! - [display]: preview column and the `[preview]` back-end options
//! - [theme]: the five named styles
//! - [input]: key overrides and custom commands
//! - [load]: file lookup, parsing and `--init`

pub mod display;
pub mod general;
pub mod input;
pub mod load;
pub mod theme;

pub use display::{ColorProfile, Display, PreviewOptions};
pub use general::General;
pub use input::{Commands, Keys};
pub use load::Config;
pub use theme::{TextStyle, Theme};
