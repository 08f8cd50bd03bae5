//! Key mapping for tfm.
//!
//! Bindings map a token sequence (a chord) to an [Action]. A binding is written
//! as a spec string in the config, e.g. `gg`, `ctrl+d` or `g t`, and split into
//! tokens by [tokens_of]. Matching a sequence against all bindings is done by
//! [Keymap::match_sequence]; deciding what to do with the match is the chord
//! resolver's job.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

/// Represents any action in the app: navigation, tabs, view, file, or system.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Nav(NavAction),
    Tab(TabAction),
    View(ViewAction),
    File(FileAction),
    System(SystemAction),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NavAction {
    Up,
    Down,
    /// Parent directory, or close the last right column.
    Left,
    /// Enter the selected directory.
    Right,
    Top,
    Bottom,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    ToggleHidden,
    ToggleFocus,
    FocusLeft,
    FocusRight,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TabAction {
    New,
    Close,
    Next,
    Prev,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ViewAction {
    TogglePreview,
    ToggleOpenRight,
    CloseRight,
}

/// Clipboard actions
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileAction {
    Copy,
    Paste,
    CopyPath,
    PastePath,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SystemAction {
    Command,
    Quit,
    Help,
}

/// Config names of every action.
#[rustfmt::skip]
const ACTION_NAMES: &[(&str, Action)] = {
    use Action::*;
    &[
        ("up",                     Nav(NavAction::Up)),
        ("down",                   Nav(NavAction::Down)),
        ("left",                   Nav(NavAction::Left)),
        ("right",                  Nav(NavAction::Right)),
        ("top",                    Nav(NavAction::Top)),
        ("bottom",                 Nav(NavAction::Bottom)),
        ("page-up",                Nav(NavAction::PageUp)),
        ("page-down",              Nav(NavAction::PageDown)),
        ("half-page-up",           Nav(NavAction::HalfPageUp)),
        ("half-page-down",         Nav(NavAction::HalfPageDown)),
        ("toggle-hidden",          Nav(NavAction::ToggleHidden)),
        ("toggle-focus",           Nav(NavAction::ToggleFocus)),
        ("focus-left",             Nav(NavAction::FocusLeft)),
        ("focus-right",            Nav(NavAction::FocusRight)),
        ("new-tab",                Tab(TabAction::New)),
        ("close-tab",              Tab(TabAction::Close)),
        ("next-tab",               Tab(TabAction::Next)),
        ("prev-tab",               Tab(TabAction::Prev)),
        ("toggle-preview",         View(ViewAction::TogglePreview)),
        ("toggle-right-open-mode", View(ViewAction::ToggleOpenRight)),
        ("close-right",            View(ViewAction::CloseRight)),
        ("copy",                   File(FileAction::Copy)),
        ("paste",                  File(FileAction::Paste)),
        ("copy-path",              File(FileAction::CopyPath)),
        ("paste-path",             File(FileAction::PastePath)),
        ("command",                System(SystemAction::Command)),
        ("quit",                   System(SystemAction::Quit)),
        ("help",                   System(SystemAction::Help)),
    ]
};

/// Built-in bindings, spec to action name.
#[rustfmt::skip]
pub const DEFAULT_BINDINGS: &[(&str, &str)] = &[
    ("h", "left"),          ("left", "left"),       ("backspace", "left"),
    ("l", "right"),         ("right", "right"),     ("enter", "right"),
    ("j", "down"),          ("down", "down"),
    ("k", "up"),            ("up", "up"),
    ("gg", "top"),          ("G", "bottom"),
    (".", "toggle-hidden"),
    ("pgdown", "page-down"), ("pgup", "page-up"),
    ("ctrl+d", "half-page-down"), ("ctrl+u", "half-page-up"),
    ("t", "new-tab"),       ("]", "next-tab"),      ("[", "prev-tab"),   ("w", "close-tab"),
    ("ctrl+p", "toggle-preview"),
    ("ctrl+o", "toggle-right-open-mode"),
    ("ctrl+x", "close-right"),
    (":", "command"),
    ("tab", "toggle-focus"),
    ("q", "quit"),          ("ctrl+c", "quit"),
    ("yy", "copy"),         ("pp", "paste"),
    ("Y", "copy-path"),     ("P", "paste-path"),
    ("?", "help"),
];

/// Key names that are always one token even though they are plain letters.
const NAMED_KEYS: &[&str] = &[
    "left",
    "right",
    "up",
    "down",
    "enter",
    "backspace",
    "pgdown",
    "pgup",
    "home",
    "end",
    "tab",
];

impl Action {
    pub fn name(self) -> &'static str {
        ACTION_NAMES
            .iter()
            .find(|(_, a)| *a == self)
            .map(|(n, _)| *n)
            .unwrap_or("unknown")
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action: {}", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        ACTION_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, a)| *a)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Splits a binding spec into key tokens.
///
/// - Whitespace separated specs give one token per word: `"g g"`, `"ctrl+x ctrl+e"`
/// - Named keys stay whole: `"enter"`, `"pgdown"`
/// - A run of two or more ASCII letters is split into letters: `"gg"` -> `["g", "g"]`
/// - Anything else is a single token: `"ctrl+d"`, `"G"`, `"."`
pub fn tokens_of(spec: &str) -> Vec<String> {
    if spec.contains(' ') {
        return spec.split_whitespace().map(str::to_string).collect();
    }
    if NAMED_KEYS.contains(&spec) {
        return vec![spec.to_string()];
    }
    if spec.len() > 1 && spec.chars().all(|c| c.is_ascii_alphabetic()) {
        return spec.chars().map(String::from).collect();
    }
    vec![spec.to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub spec: String,
    pub tokens: Vec<String>,
    pub action: Action,
}

/// Result of matching a token sequence against all bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeqMatch {
    /// Action of a binding whose tokens equal the sequence.
    pub exact: Option<Action>,
    /// Some longer binding starts with the sequence.
    pub prefix: bool,
}

/// Stores all bindings, ordered by spec.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<Binding>,
}

impl Keymap {
    /// Builds a keymap from `spec -> action name` pairs.
    ///
    /// Unknown action names are logged and skipped.
    pub fn from_specs<'a, I>(specs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut map: BTreeMap<String, Action> = BTreeMap::new();
        for (spec, name) in specs {
            let spec = spec.trim();
            if spec.is_empty() {
                continue;
            }
            match name.parse::<Action>() {
                Ok(action) => {
                    map.insert(spec.to_string(), action);
                }
                Err(e) => warn!(spec, "{e}, binding ignored"),
            }
        }
        let bindings = map
            .into_iter()
            .map(|(spec, action)| Binding {
                tokens: tokens_of(&spec),
                spec,
                action,
            })
            .collect();
        Keymap { bindings }
    }

    /// Default bindings with `overrides` (spec to action name) laid on top.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let specs = DEFAULT_BINDINGS.iter().copied().chain(
            overrides
                .iter()
                .map(|(spec, name)| (spec.as_str(), name.as_str())),
        );
        Self::from_specs(specs)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Checks `seq` for an exact binding and for longer bindings it is a prefix of.
    pub fn match_sequence(&self, seq: &[String]) -> SeqMatch {
        let mut out = SeqMatch::default();
        if seq.is_empty() {
            return out;
        }
        for b in &self.bindings {
            if b.tokens.len() < seq.len() || !b.tokens.starts_with(seq) {
                continue;
            }
            if b.tokens.len() == seq.len() {
                out.exact.get_or_insert(b.action);
            } else {
                out.prefix = true;
            }
        }
        out
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_specs(DEFAULT_BINDINGS.iter().copied())
    }
}
