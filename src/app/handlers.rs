//! Action handler methods for tfm.
//!
//! This module implements the [AppState] methods that apply a resolved
//! [Action]. [AppState::dispatch] is the single exhaustive entry point; each
//! action group has its own handler below it.

use crate::app::keymap::{Action, FileAction, NavAction, SystemAction, TabAction, ViewAction};
use crate::app::nav::{Panel, Tab, cached_listing};
use crate::app::state::{AppState, Clipboard, Focus, Mode, RightMode};
use crate::core::worker::Task;
use crate::error::Error;

use tracing::{debug, info};

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

impl<'a> AppState<'a> {
    /// Applies `action`. Navigation also returns a prefetch of the new selection.
    pub(super) fn dispatch(&mut self, action: Action) -> Option<Task> {
        match action {
            Action::Nav(a) => {
                self.handle_nav_action(a);
                // a directory preview fills the cache first
                self.refresh_preview();
                self.request_prefetch()
            }
            Action::Tab(a) => {
                self.handle_tab_action(a);
                None
            }
            Action::View(a) => {
                self.handle_view_action(a);
                None
            }
            Action::File(a) => self.handle_file_action(a),
            Action::System(a) => {
                self.handle_sys_action(a);
                None
            }
        }
    }

    pub(super) fn handle_nav_action(&mut self, action: NavAction) {
        let body = self.viewport.body_height() as isize;
        match action {
            NavAction::Up => self.focused_tab_mut().move_by(-1),
            NavAction::Down => self.focused_tab_mut().move_by(1),
            NavAction::PageUp => self.focused_tab_mut().move_by(-body),
            NavAction::PageDown => self.focused_tab_mut().move_by(body),
            NavAction::HalfPageUp => self.focused_tab_mut().move_by(-(body / 2).max(1)),
            NavAction::HalfPageDown => self.focused_tab_mut().move_by((body / 2).max(1)),
            NavAction::Top => self.focused_tab_mut().select(0),
            NavAction::Bottom => self.focused_tab_mut().select_last(),
            NavAction::Left => self.go_up(),
            NavAction::Right => self.enter(),
            NavAction::ToggleHidden => self.toggle_hidden(),
            NavAction::ToggleFocus => {
                self.focus = match (self.has_right_panels(), self.focus) {
                    (true, Focus::Left) => Focus::Right,
                    _ => Focus::Left,
                };
            }
            NavAction::FocusLeft => self.focus = Focus::Left,
            NavAction::FocusRight => {
                if self.has_right_panels() {
                    self.focus = Focus::Right;
                }
            }
        }
    }

    pub(super) fn handle_tab_action(&mut self, action: TabAction) {
        match action {
            TabAction::New => {
                let panel = self.tabs.current_tab().panel();
                match Panel::open(panel.cwd(), panel.show_hidden()) {
                    Ok(panel) => {
                        let idx = self.tabs.add_tab(panel);
                        self.focus = Focus::Left;
                        debug!(tab = idx, "tab opened");
                    }
                    Err(e) => self.set_error(e),
                }
            }
            TabAction::Close => {
                if self.tabs.close_current() {
                    debug!(tabs = self.tabs.len(), "tab closed");
                }
            }
            TabAction::Next => self.tabs.switch(1),
            TabAction::Prev => self.tabs.switch(-1),
        }
    }

    pub(super) fn handle_view_action(&mut self, action: ViewAction) {
        match action {
            ViewAction::TogglePreview => self.set_preview(!self.show_preview),
            ViewAction::ToggleOpenRight => self.open_right = !self.open_right,
            ViewAction::CloseRight => {
                self.right_columns.clear();
                self.focus = Focus::Left;
                self.right_mode = self.resting_mode();
            }
        }
    }

    pub(super) fn handle_file_action(&mut self, action: FileAction) -> Option<Task> {
        match action {
            FileAction::Copy => {
                if let Some(path) = self.focused_tab().selected_path() {
                    debug!(path = %path.display(), "copied");
                    self.clipboard = Clipboard::Files(vec![path]);
                }
                None
            }
            FileAction::CopyPath => {
                let tab = self.focused_tab();
                let path = tab
                    .selected_path()
                    .unwrap_or_else(|| tab.panel().cwd().to_path_buf());
                self.clipboard = Clipboard::Path(path);
                None
            }
            FileAction::Paste => match &self.clipboard {
                Clipboard::Files(sources) if !sources.is_empty() => Some(Task::Paste {
                    sources: sources.clone(),
                    dest: self.focused_tab().panel().cwd().to_path_buf(),
                }),
                _ => None,
            },
            FileAction::PastePath => {
                if let Clipboard::Path(path) = &self.clipboard {
                    let path = path.clone();
                    self.paste_path(&path);
                }
                None
            }
        }
    }

    pub(super) fn handle_sys_action(&mut self, action: SystemAction) {
        match action {
            SystemAction::Command => {
                self.chord.reset();
                self.mode = Mode::CommandLine {
                    buffer: String::new(),
                };
            }
            SystemAction::Quit => {
                info!("quit requested");
                self.quit = true;
            }
            SystemAction::Help => self.show_help(),
        }
    }

    /// True while the right chain is shown and has at least one column.
    pub(super) fn has_right_panels(&self) -> bool {
        self.right_mode == RightMode::Panel && !self.right_columns.is_empty()
    }

    /// Right-side mode once no column is open.
    fn resting_mode(&self) -> RightMode {
        if self.show_preview {
            RightMode::Preview
        } else {
            RightMode::None
        }
    }

    pub(super) fn set_preview(&mut self, on: bool) {
        self.show_preview = on;
        if on {
            self.right_mode = RightMode::Preview;
            self.focus = Focus::Left;
        } else if self.right_mode == RightMode::Preview {
            self.right_mode = RightMode::None;
            self.focus = Focus::Left;
        }
    }

    /// Moves the focused panel to `dir`, selecting `select` if it is listed.
    /// On failure the panel is untouched and the error is shown.
    pub(super) fn chdir_focused(&mut self, dir: &Path, select: Option<&OsStr>) -> bool {
        let tab = self.focused_tab_mut();
        match tab.panel_mut().chdir(dir) {
            Ok(()) => {
                let idx = select
                    .and_then(|name| tab.panel().position_of(name))
                    .unwrap_or(0);
                tab.reset_cursor();
                tab.select(idx);
                self.clear_error();
                true
            }
            Err(e) => {
                self.set_error(e);
                false
            }
        }
    }

    fn enter(&mut self) {
        let tab = self.focused_tab();
        let Some(entry) = tab.selected_entry() else {
            return;
        };
        if !entry.is_dir() {
            return;
        }
        let path = tab.panel().join(entry);
        let show_hidden = tab.panel().show_hidden();

        if self.open_right {
            if self.open_right_panel(path) {
                self.focus = Focus::Right;
            }
            return;
        }

        if let Some(entries) = cached_listing(&self.dir_cache, &path, show_hidden) {
            debug!(path = %path.display(), "enter from cache");
            let tab = self.focused_tab_mut();
            tab.panel_mut().set_listing(path, entries);
            tab.reset_cursor();
            self.clear_error();
        } else {
            self.chdir_focused(&path, None);
        }
    }

    /// Pushes a new right column for `path`, read with the configured hidden flag.
    fn open_right_panel(&mut self, path: PathBuf) -> bool {
        let show_hidden = self.config.general().show_hidden();
        let panel = match cached_listing(&self.dir_cache, &path, show_hidden) {
            Some(entries) => Panel::with_entries(path, show_hidden, entries),
            None => match Panel::open(&path, show_hidden) {
                Ok(panel) => panel,
                Err(e) => {
                    self.set_error(e);
                    return false;
                }
            },
        };
        self.right_columns.push(Tab::new(panel));
        self.right_mode = RightMode::Panel;
        self.clear_error();
        true
    }

    fn go_up(&mut self) {
        if self.focus == Focus::Right && self.has_right_panels() {
            self.right_columns.pop();
            if self.right_columns.is_empty() {
                self.focus = Focus::Left;
                self.right_mode = self.resting_mode();
            }
            return;
        }

        let cwd = self.focused_tab().panel().cwd().to_path_buf();
        let Some(parent) = cwd.parent() else {
            return;
        };
        if parent == cwd {
            return;
        }
        self.chdir_focused(parent, cwd.file_name());
    }

    fn toggle_hidden(&mut self) {
        let tab = self.focused_tab_mut();
        let show_hidden = !tab.panel().show_hidden();
        match tab.panel_mut().set_show_hidden(show_hidden) {
            Ok(()) => {
                tab.reset_cursor();
                self.clear_error();
            }
            Err(e) => self.set_error(e),
        }
    }

    /// Directory: go there. File: go to its parent and select it.
    fn paste_path(&mut self, path: &Path) {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) => {
                self.set_error(Error::from_io(path, e));
                return;
            }
        };
        if meta.is_dir() {
            self.chdir_focused(path, None);
            return;
        }
        if let Some(parent) = path.parent() {
            self.chdir_focused(parent, path.file_name());
        }
    }

    pub(super) fn on_paste_finished(&mut self, dest: &Path, pasted: usize, error: Option<String>) {
        info!(dest = %dest.display(), pasted, "paste finished");
        let tab = self.focused_tab_mut();
        if tab.panel().cwd() == dest {
            let refreshed = tab.panel_mut().refresh();
            tab.clamp_selection();
            if let Err(e) = refreshed {
                self.set_error(e);
                return;
            }
        }
        match error {
            Some(e) => self.set_error(Error::Command(format!("paste: {e}"))),
            None => self.clear_error(),
        }
    }
}
