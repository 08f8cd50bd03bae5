//! Application logic for tfm.
//!
//! This module holds the navigation engine: the [AppState] owned by the
//! terminal loop, the keymap and chord resolver feeding it, and the panels,
//! tabs and previews it manages.
//!
//! Modules:
//! - [state]: the [AppState] struct and message handling
//! - [handlers]: action handlers (navigation, tabs, view, clipboard, system)
//! - [command]: the `:` command line and custom commands
//! - [keymap]: actions, default bindings and sequence matching
//! - [chord]: multi-key chord resolution with timeouts
//! - [nav]: panels, tabs (cursor + scroll) and the listing cache helpers
//! - [tab]: the left tab list
//! - [preview]: preview resolution and its cache

pub mod chord;
pub mod command;
mod handlers;
pub mod keymap;
pub mod nav;
pub mod preview;
pub mod state;
pub mod tab;

pub use chord::{CHORD_TIMEOUT, ChordOutcome, ChordResolver};
pub use command::expand_template;
pub use keymap::{Action, FileAction, Keymap, NavAction, SystemAction, TabAction, ViewAction};
pub use nav::{CachedListing, DirCache, Panel, Tab};
pub use preview::{Preview, PreviewResolver};
pub use state::{AppState, Clipboard, Focus, Mode, RightMode, Viewport};
pub use tab::TabManager;
