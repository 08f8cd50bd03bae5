//! UI layer for tfm.
//!
//! - [layout]: column widths, merging and the [StyleTag] vocabulary
//! - [render]: the pure `render(&AppState) -> Screen` function
//! - [draw]: maps a [Screen] onto a ratatui frame using the theme
//!
//! Only [draw] knows about ratatui. The rest can be tested on plain strings.

pub mod draw;
pub mod layout;
pub mod render;

pub use layout::{Row, Segment, StyleTag};
pub use render::{ImagePlacement, Screen, render};
