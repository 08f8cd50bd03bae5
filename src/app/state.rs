//! Application state and main controller module for tfm.
//!
//! [AppState] owns everything the navigation engine needs:
//! - The left tabs and the right column chain
//! - Focus, right-side mode and the overlay mode (command line, modal)
//! - The chord resolver and keymap
//! - The directory and preview caches plus the in-flight prefetch set
//! - The clipboard and the display-only error
//!
//! The host feeds it one [Message] at a time through [AppState::handle] and
//! gets back at most one [Task] to run in the background. All mutation happens
//! inside `handle`; tasks only compute values that come back as messages.

use crate::app::chord::{CHORD_TIMEOUT, ChordOutcome, ChordResolver};
use crate::app::keymap::Keymap;
use crate::app::nav::{CachedListing, DirCache, Panel, Tab, cached_listing};
use crate::app::preview::{Preview, PreviewResolver};
use crate::app::tab::TabManager;
use crate::config::{ColorProfile, Config};
use crate::core::fm::{Entry, FileMeta};
use crate::core::worker::{Message, Task};
use crate::error::Result;
use crate::utils::layout::normalize_token;

use tracing::{debug, info, warn};

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

pub const HEADER_ROWS: usize = 1;
pub const STATUS_ROWS: usize = 1;

const DEFAULT_WIDTH: usize = 80;
const DEFAULT_HEIGHT: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Left,
    Right,
}

/// What occupies the area right of the left panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RightMode {
    None,
    Preview,
    Panel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    CommandLine { buffer: String },
    /// Help or command output. Any key dismisses it.
    Modal { title: String, lines: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Clipboard {
    #[default]
    Empty,
    Files(Vec<PathBuf>),
    Path(PathBuf),
}

impl Clipboard {
    pub fn kind(&self) -> &'static str {
        match self {
            Clipboard::Empty => "none",
            Clipboard::Files(_) => "files",
            Clipboard::Path(_) => "path",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
    pub y_offset: usize,
}

impl Viewport {
    /// Rows left for the columns once header and status are drawn.
    pub fn body_height(&self) -> usize {
        self.height
            .saturating_sub(HEADER_ROWS + STATUS_ROWS)
            .max(1)
    }
}

/// Main struct which holds the central application state of tfm.
pub struct AppState<'a> {
    pub(super) config: &'a Config,
    pub(super) keymap: Keymap,
    pub(super) chord: ChordResolver,

    pub(super) tabs: TabManager,
    pub(super) right_columns: Vec<Tab>,
    pub(super) focus: Focus,
    pub(super) right_mode: RightMode,
    pub(super) show_preview: bool,
    pub(super) open_right: bool,
    pub(super) right_pct: usize,

    pub(super) viewport: Viewport,
    pub(super) mode: Mode,

    pub(super) dir_cache: DirCache,
    pub(super) previews: PreviewResolver,
    pub(super) preview: Option<(PathBuf, Preview)>,
    /// Size of the selected file, read once per message for the status line.
    pub(super) selected_size: Option<u64>,
    pub(super) in_flight: HashSet<PathBuf>,

    pub(super) clipboard: Clipboard,
    pub(super) error: Option<String>,
    pub(super) quit: bool,

    pub(super) color_profile: ColorProfile,
    pub(super) background_opacity: f64,
    pub(super) blur: bool,
}

impl<'a> AppState<'a> {
    /// Builds the initial state with one tab at `start`.
    pub fn new(config: &'a Config, start: &Path, show_hidden: bool) -> Result<Self> {
        let panel = Panel::open(start, show_hidden)?;
        Ok(Self::with_panel(config, panel))
    }

    pub(crate) fn with_panel(config: &'a Config, panel: Panel) -> Self {
        let show_preview = config.display().preview();
        let mut app = Self {
            config,
            keymap: Keymap::with_overrides(config.keys().overrides()),
            chord: ChordResolver::new(),
            tabs: TabManager::new(Tab::new(panel)),
            right_columns: Vec::new(),
            focus: Focus::Left,
            right_mode: if show_preview {
                RightMode::Preview
            } else {
                RightMode::None
            },
            show_preview,
            open_right: config.general().open_dirs_right(),
            right_pct: config.display().right_pane_width(),
            viewport: Viewport {
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
                y_offset: 0,
            },
            mode: Mode::Normal,
            dir_cache: DirCache::default(),
            previews: PreviewResolver::from_options(config.preview()),
            preview: None,
            selected_size: None,
            in_flight: HashSet::new(),
            clipboard: Clipboard::Empty,
            error: None,
            quit: false,
            color_profile: ColorProfile::detect(config.display().color_profile()),
            background_opacity: config.display().background_opacity(),
            blur: config.display().blur(),
        };
        info!(cwd = %app.tabs.current_tab().panel().cwd().display(), "state initialized");
        app.sync_view();
        app
    }

    // Getters/ accessors

    #[inline]
    pub fn config(&self) -> &Config {
        self.config
    }

    #[inline]
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    #[inline]
    pub fn chord(&self) -> &ChordResolver {
        &self.chord
    }

    #[inline]
    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    #[inline]
    pub fn right_columns(&self) -> &[Tab] {
        &self.right_columns
    }

    #[inline]
    pub fn focus(&self) -> Focus {
        self.focus
    }

    #[inline]
    pub fn right_mode(&self) -> RightMode {
        self.right_mode
    }

    #[inline]
    pub fn show_preview(&self) -> bool {
        self.show_preview
    }

    #[inline]
    pub fn open_right(&self) -> bool {
        self.open_right
    }

    /// Preview column width in percent of the terminal.
    #[inline]
    pub fn right_pct(&self) -> usize {
        self.right_pct
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    #[inline]
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    #[inline]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// `None` for directories and paths that cannot be read.
    #[inline]
    pub fn selected_size(&self) -> Option<u64> {
        self.selected_size
    }

    #[inline]
    pub fn color_profile(&self) -> ColorProfile {
        self.color_profile
    }

    /// Starts from `[display] background_opacity`; `:opacity` changes it.
    #[inline]
    pub fn background_opacity(&self) -> f64 {
        self.background_opacity
    }

    #[inline]
    pub fn blur(&self) -> bool {
        self.blur
    }

    #[inline]
    pub fn is_quitting(&self) -> bool {
        self.quit
    }

    #[inline]
    pub fn dir_cache(&self) -> &DirCache {
        &self.dir_cache
    }

    pub fn is_in_flight(&self, path: &Path) -> bool {
        self.in_flight.contains(path)
    }

    /// Preview of the focused selection, when the preview column is shown.
    pub fn preview(&self) -> Option<(&Path, &Preview)> {
        self.preview.as_ref().map(|(p, v)| (p.as_path(), v))
    }

    /// The tab that receives navigation: the last right column when focus is
    /// on the right chain, otherwise the active left tab.
    pub fn focused_tab(&self) -> &Tab {
        if self.focus == Focus::Right
            && self.right_mode == RightMode::Panel
            && let Some(last) = self.right_columns.last()
        {
            return last;
        }
        self.tabs.current_tab()
    }

    pub(super) fn focused_tab_mut(&mut self) -> &mut Tab {
        if self.focus == Focus::Right && self.right_mode == RightMode::Panel {
            if let Some(last) = self.right_columns.last_mut() {
                return last;
            }
        }
        self.tabs.current_tab_mut()
    }

    /// Applies one message and returns the background work it asks for, if any.
    pub fn handle(&mut self, msg: Message) -> Option<Task> {
        let task = match msg {
            Message::Key(token) => self.handle_key(&token),
            Message::Resize { width, height } => {
                self.viewport.width = width as usize;
                self.viewport.height = height as usize;
                None
            }
            Message::ChordTimeout { generation } => self
                .chord
                .on_timeout(generation, &self.keymap)
                .and_then(|action| self.dispatch(action)),
            Message::DirPrefetched {
                path,
                show_hidden,
                entries,
            } => {
                self.merge_prefetch(path, show_hidden, entries);
                None
            }
            Message::CommandFinished { command, output } => {
                self.on_command_finished(&command, output);
                None
            }
            Message::InteractiveFinished { command, result } => {
                self.on_interactive_finished(&command, result);
                None
            }
            Message::PasteFinished {
                dest,
                pasted,
                error,
            } => {
                self.on_paste_finished(&dest, pasted, error);
                None
            }
        };
        self.sync_view();
        task
    }

    fn handle_key(&mut self, token: &str) -> Option<Task> {
        match self.mode {
            Mode::Modal { .. } => {
                self.mode = Mode::Normal;
                None
            }
            Mode::CommandLine { .. } => self.handle_command_key(token),
            Mode::Normal => {
                let token = normalize_token(token);
                match self.chord.feed(token, &self.keymap) {
                    ChordOutcome::Resolved(action) => {
                        debug!(%action, "resolved");
                        self.dispatch(action)
                    }
                    ChordOutcome::Pending(generation) => Some(Task::ChordTimeout {
                        generation,
                        delay: CHORD_TIMEOUT,
                    }),
                    ChordOutcome::NoMatch => None,
                }
            }
        }
    }

    /// Schedules a background read of the selected directory.
    ///
    /// Nothing is scheduled when the selection is not a directory, its listing
    /// is already cached, or a read for it is still in flight.
    pub fn request_prefetch(&mut self) -> Option<Task> {
        let tab = self.focused_tab();
        let entry = tab.selected_entry()?;
        if !entry.is_dir() {
            return None;
        }
        let show_hidden = tab.panel().show_hidden();
        let path = tab.panel().join(entry);
        if cached_listing(&self.dir_cache, &path, show_hidden).is_some()
            || self.in_flight.contains(&path)
        {
            return None;
        }
        debug!(path = %path.display(), "prefetch scheduled");
        self.in_flight.insert(path.clone());
        Some(Task::Prefetch { path, show_hidden })
    }

    fn merge_prefetch(
        &mut self,
        path: PathBuf,
        show_hidden: bool,
        entries: Result<Vec<Entry>, String>,
    ) {
        self.in_flight.remove(&path);
        match entries {
            Ok(entries) => {
                let stored = self.dir_cache.put(
                    path.clone(),
                    CachedListing {
                        show_hidden,
                        entries: entries.into(),
                    },
                );
                debug!(path = %path.display(), stored, "prefetch merged");
            }
            Err(e) => debug!(path = %path.display(), "prefetch failed: {e}"),
        }
    }

    pub(super) fn set_error(&mut self, err: impl fmt::Display) {
        let msg = err.to_string();
        warn!("{msg}");
        self.error = Some(msg);
    }

    pub(super) fn clear_error(&mut self) {
        self.error = None;
    }

    pub(super) fn show_modal(&mut self, title: impl Into<String>, lines: Vec<String>) {
        self.chord.reset();
        self.mode = Mode::Modal {
            title: title.into(),
            lines,
        };
    }

    /// Keeps every visible cursor on screen and recomputes the preview.
    fn sync_view(&mut self) {
        let height = self.viewport.body_height();
        self.tabs.current_tab_mut().ensure_visible(height);
        for col in &mut self.right_columns {
            col.ensure_visible(height);
        }
        self.viewport.y_offset = self.focused_tab().scroll();
        self.refresh_preview();
        self.selected_size = self.stat_selected();
    }

    fn stat_selected(&self) -> Option<u64> {
        let tab = self.focused_tab();
        let entry = tab.selected_entry().filter(|e| !e.is_dir())?;
        match FileMeta::stat(&tab.panel().join(entry)) {
            Ok(meta) if !meta.is_dir => Some(meta.size),
            _ => None,
        }
    }

    pub(super) fn refresh_preview(&mut self) {
        if !self.show_preview {
            self.preview = None;
            return;
        }
        let tab = self.focused_tab();
        let Some(entry) = tab.selected_entry() else {
            self.preview = None;
            return;
        };
        let path = tab.panel().join(entry);
        let is_dir = entry.is_dir();
        let show_hidden = tab.panel().show_hidden();
        let preview = self
            .previews
            .resolve(&path, is_dir, show_hidden, &mut self.dir_cache);
        self.preview = Some((path, preview));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::keymap::{Action, NavAction};
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn key(app: &mut AppState, token: &str) -> Option<Task> {
        app.handle(Message::Key(token.to_string()))
    }

    fn no_preview_config() -> Result<Config, Box<dyn std::error::Error>> {
        Ok(Config::parse("[display]\npreview = false")?)
    }

    /// alpha/ beta/ (with inner/) and two files.
    fn sandbox() -> Result<TempDir, Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("alpha"))?;
        fs::create_dir_all(dir.path().join("beta/inner"))?;
        fs::write(dir.path().join("beta/notes.txt"), "hi")?;
        fs::write(dir.path().join("file.txt"), "hello")?;
        fs::write(dir.path().join(".secret"), "")?;
        Ok(dir)
    }

    #[test]
    fn starts_at_path_with_preview_mode() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sandbox()?;
        let config = Config::default();
        let app = AppState::new(&config, dir.path(), false)?;

        assert_eq!(app.focused_tab().panel().cwd(), dir.path());
        assert_eq!(app.focused_tab().panel().len(), 3);
        assert_eq!(app.right_mode(), RightMode::Preview);
        assert_eq!(app.focus(), Focus::Left);
        // alpha/ is selected and previewed through the dir cache
        assert!(matches!(app.preview(), Some((_, Preview::Directory(_)))));
        assert!(app.dir_cache().has(&dir.path().join("alpha")));
        Ok(())
    }

    #[test]
    fn movement_is_clamped_and_gg_goes_top() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sandbox()?;
        let config = no_preview_config()?;
        let mut app = AppState::new(&config, dir.path(), false)?;

        for _ in 0..10 {
            key(&mut app, "j");
        }
        assert_eq!(app.focused_tab().selected(), 2);

        let pending = key(&mut app, "g");
        assert!(matches!(pending, Some(Task::ChordTimeout { .. })));
        key(&mut app, "g");
        assert_eq!(app.focused_tab().selected(), 0);

        key(&mut app, "G");
        assert_eq!(app.focused_tab().selected(), 2);
        Ok(())
    }

    #[test]
    fn cyrillic_layout_keys_navigate() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sandbox()?;
        let config = no_preview_config()?;
        let mut app = AppState::new(&config, dir.path(), false)?;

        key(&mut app, "о");
        assert_eq!(app.focused_tab().selected(), 1);
        key(&mut app, "л");
        assert_eq!(app.focused_tab().selected(), 0);
        Ok(())
    }

    #[test]
    fn enter_and_up_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sandbox()?;
        let config = no_preview_config()?;
        let mut app = AppState::new(&config, dir.path(), false)?;

        key(&mut app, "j");
        key(&mut app, "l");
        assert_eq!(app.focused_tab().panel().cwd(), dir.path().join("beta"));
        assert_eq!(app.focused_tab().selected(), 0);

        key(&mut app, "h");
        assert_eq!(app.focused_tab().panel().cwd(), dir.path());
        Ok(())
    }

    #[test]
    fn up_at_root_is_a_no_op() -> Result<(), Box<dyn std::error::Error>> {
        let config = no_preview_config()?;
        let mut app = AppState::new(&config, Path::new("/"), false)?;
        key(&mut app, "h");
        assert_eq!(app.focused_tab().panel().cwd(), Path::new("/"));
        assert!(app.error().is_none());
        Ok(())
    }

    #[test]
    fn vanished_directory_sets_error_and_keeps_state() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sandbox()?;
        let config = no_preview_config()?;
        let mut app = AppState::new(&config, dir.path(), false)?;

        fs::remove_dir(dir.path().join("alpha"))?;
        key(&mut app, "l");
        assert!(app.error().is_some_and(|e| e.contains("alpha")));
        assert_eq!(app.focused_tab().panel().cwd(), dir.path());

        // further input still works and clears the error on success
        key(&mut app, "j");
        key(&mut app, "l");
        assert!(app.error().is_none());
        assert_eq!(app.focused_tab().panel().cwd(), dir.path().join("beta"));
        Ok(())
    }

    #[test]
    fn toggle_hidden_rereads_and_resets_cursor() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sandbox()?;
        let config = no_preview_config()?;
        let mut app = AppState::new(&config, dir.path(), false)?;

        key(&mut app, "j");
        key(&mut app, ".");
        assert_eq!(app.focused_tab().panel().len(), 4);
        assert!(app.focused_tab().panel().show_hidden());
        assert_eq!(app.focused_tab().selected(), 0);
        Ok(())
    }

    #[test]
    fn prefetch_is_deduplicated_until_merged() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sandbox()?;
        let config = no_preview_config()?;
        let mut app = AppState::new(&config, dir.path(), false)?;
        let alpha = dir.path().join("alpha");

        let first = app.request_prefetch();
        assert_eq!(
            first,
            Some(Task::Prefetch {
                path: alpha.clone(),
                show_hidden: false
            })
        );
        assert!(app.is_in_flight(&alpha));
        assert_eq!(app.request_prefetch(), None);

        // a failed read still clears the marker
        app.handle(Message::DirPrefetched {
            path: alpha.clone(),
            show_hidden: false,
            entries: Err("boom".into()),
        });
        assert!(!app.is_in_flight(&alpha));
        assert!(!app.dir_cache().has(&alpha));

        assert!(app.request_prefetch().is_some());
        app.handle(Message::DirPrefetched {
            path: alpha.clone(),
            show_hidden: false,
            entries: Ok(Vec::new()),
        });
        assert!(app.dir_cache().has(&alpha));
        assert_eq!(app.request_prefetch(), None);
        Ok(())
    }

    #[test]
    fn prefetch_result_never_overwrites_cached_listing() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sandbox()?;
        let config = no_preview_config()?;
        let mut app = AppState::new(&config, dir.path(), false)?;
        let beta = dir.path().join("beta");

        app.handle(Message::DirPrefetched {
            path: beta.clone(),
            show_hidden: false,
            entries: Ok(Vec::new()),
        });
        app.handle(Message::DirPrefetched {
            path: beta.clone(),
            show_hidden: false,
            entries: Ok(vec![Entry::new("late", false)]),
        });
        let cached = cached_listing(app.dir_cache(), &beta, false).map(|e| e.len());
        assert_eq!(cached, Some(0));

        // entering beta now uses the cached (empty) listing
        key(&mut app, "j");
        key(&mut app, "l");
        assert!(app.focused_tab().panel().is_empty());
        Ok(())
    }

    #[test]
    fn preview_listing_suppresses_prefetch() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sandbox()?;
        let config = Config::default();
        let mut app = AppState::new(&config, dir.path(), false)?;
        let beta = dir.path().join("beta");
        assert!(!app.dir_cache().has(&beta));

        // the preview reads beta right away, so no background read is needed
        assert_eq!(key(&mut app, "j"), None);
        assert!(app.dir_cache().has(&beta));
        assert!(!app.is_in_flight(&beta));
        assert!(matches!(app.preview(), Some((p, Preview::Directory(_))) if p == beta.as_path()));
        Ok(())
    }

    #[test]
    fn selected_size_follows_cursor() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sandbox()?;
        let config = no_preview_config()?;
        let mut app = AppState::new(&config, dir.path(), false)?;

        assert_eq!(app.selected_size(), None);
        key(&mut app, "G");
        assert_eq!(app.selected_size(), Some(5));

        fs::write(dir.path().join("file.txt"), "hello world")?;
        key(&mut app, "G");
        assert_eq!(app.selected_size(), Some(11));
        Ok(())
    }

    #[test]
    fn navigation_keys_request_prefetch() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sandbox()?;
        let config = no_preview_config()?;
        let mut app = AppState::new(&config, dir.path(), false)?;

        let task = key(&mut app, "j");
        assert_eq!(
            task,
            Some(Task::Prefetch {
                path: dir.path().join("beta"),
                show_hidden: false
            })
        );
        // file selected: nothing to prefetch
        assert_eq!(key(&mut app, "j"), None);
        Ok(())
    }

    #[test]
    fn chord_timeout_resolves_exact_binding() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sandbox()?;
        let config = Config::parse("[display]\npreview = false\n[keys]\n\"g\" = \"bottom\"")?;
        let mut app = AppState::new(&config, dir.path(), false)?;

        let Some(Task::ChordTimeout { generation, .. }) = key(&mut app, "g") else {
            panic!("expected a chord timer");
        };
        assert_eq!(app.focused_tab().selected(), 0);
        app.handle(Message::ChordTimeout { generation });
        assert_eq!(app.focused_tab().selected(), 2);

        // a stale timer does nothing
        key(&mut app, "k");
        app.handle(Message::ChordTimeout { generation });
        assert_eq!(app.focused_tab().selected(), 1);
        Ok(())
    }

    #[test]
    fn resize_keeps_selection_visible() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        for i in 0..30 {
            fs::write(dir.path().join(format!("f{i:02}")), "")?;
        }
        let config = no_preview_config()?;
        let mut app = AppState::new(&config, dir.path(), false)?;

        key(&mut app, "G");
        assert_eq!(app.viewport().y_offset, 30 - app.viewport().body_height());
        app.handle(Message::Resize {
            width: 80,
            height: 12,
        });
        assert_eq!(app.viewport().body_height(), 10);
        assert_eq!(app.viewport().y_offset, 20);
        Ok(())
    }

    #[test]
    fn dispatch_is_exhaustive_over_names() -> Result<(), Box<dyn std::error::Error>> {
        let dir = sandbox()?;
        let config = no_preview_config()?;
        let mut app = AppState::new(&config, dir.path(), false)?;
        assert_eq!(app.dispatch(Action::Nav(NavAction::Bottom)), None);
        assert_eq!(app.focused_tab().selected(), 2);
        Ok(())
    }
}
