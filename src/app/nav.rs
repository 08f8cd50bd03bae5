//! Panel and cursor state for tfm.
//!
//! A [Panel] is one directory view: its path, its sorted listing and the
//! hidden-file flag it was read with. A [Tab] owns a panel plus the cursor and
//! scroll offset into it. Tabs are used both for the left tabs and for the
//! right column chain.

use crate::core::cache::FifoCache;
use crate::core::fm::{Entry, list_dir, max_dir_name_width};
use crate::error::{Error, Result};

use tracing::debug;

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A listing as kept in the directory cache, tagged with the hidden flag it
/// was read with.
#[derive(Debug, Clone)]
pub struct CachedListing {
    pub show_hidden: bool,
    pub entries: Arc<[Entry]>,
}

pub type DirCache = FifoCache<CachedListing>;

/// Cached listing of `dir`, only if it was read with the same hidden flag.
pub fn cached_listing(cache: &DirCache, dir: &Path, show_hidden: bool) -> Option<Arc<[Entry]>> {
    cache
        .get(dir)
        .filter(|c| c.show_hidden == show_hidden)
        .map(|c| Arc::clone(&c.entries))
}

/// Reads `dir` through the cache: a matching cached listing is returned as is,
/// otherwise the directory is read and the result offered to the cache.
pub fn load_listing(cache: &mut DirCache, dir: &Path, show_hidden: bool) -> Result<Arc<[Entry]>> {
    if let Some(entries) = cached_listing(cache, dir, show_hidden) {
        debug!(path = %dir.display(), "listing cache hit");
        return Ok(entries);
    }
    let entries: Arc<[Entry]> = list_dir(dir, show_hidden)
        .map_err(|e| Error::from_io(dir, e))?
        .into();
    cache.put(
        dir.to_path_buf(),
        CachedListing {
            show_hidden,
            entries: Arc::clone(&entries),
        },
    );
    Ok(entries)
}

/// One directory view.
#[derive(Debug, Clone)]
pub struct Panel {
    cwd: PathBuf,
    entries: Arc<[Entry]>,
    show_hidden: bool,
    max_dir_name_width: usize,
}

impl Panel {
    /// Reads `path` and builds a panel for it.
    pub fn open(path: &Path, show_hidden: bool) -> Result<Self> {
        let entries = list_dir(path, show_hidden).map_err(|e| Error::from_io(path, e))?;
        Ok(Self::with_entries(path.to_path_buf(), show_hidden, entries.into()))
    }

    /// Builds a panel from a listing that was already read, e.g. from the cache.
    pub fn with_entries(cwd: PathBuf, show_hidden: bool, entries: Arc<[Entry]>) -> Self {
        let max_dir_name_width = max_dir_name_width(&entries);
        Self {
            cwd,
            entries,
            show_hidden,
            max_dir_name_width,
        }
    }

    #[inline]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[inline]
    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    #[inline]
    pub fn max_dir_name_width(&self) -> usize {
        self.max_dir_name_width
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn join(&self, entry: &Entry) -> PathBuf {
        self.cwd.join(entry.name())
    }

    pub fn position_of(&self, name: &std::ffi::OsStr) -> Option<usize> {
        self.entries.iter().position(|e| e.name() == name)
    }

    /// Re-reads the current directory. On error the old listing is kept.
    pub fn refresh(&mut self) -> Result<()> {
        let entries =
            list_dir(&self.cwd, self.show_hidden).map_err(|e| Error::from_io(&self.cwd, e))?;
        self.set_entries(entries.into());
        Ok(())
    }

    /// Switches to `dir`. The panel only changes if the read succeeds.
    pub fn chdir(&mut self, dir: &Path) -> Result<()> {
        let entries = list_dir(dir, self.show_hidden).map_err(|e| Error::from_io(dir, e))?;
        self.cwd = dir.to_path_buf();
        self.set_entries(entries.into());
        Ok(())
    }

    /// Switches to `dir` using a listing that was read elsewhere.
    pub fn set_listing(&mut self, dir: PathBuf, entries: Arc<[Entry]>) {
        self.cwd = dir;
        self.set_entries(entries);
    }

    /// Re-reads the directory with `show_hidden`. The flag only changes if the read succeeds.
    pub fn set_show_hidden(&mut self, show_hidden: bool) -> Result<()> {
        let entries =
            list_dir(&self.cwd, show_hidden).map_err(|e| Error::from_io(&self.cwd, e))?;
        self.show_hidden = show_hidden;
        self.set_entries(entries.into());
        Ok(())
    }

    fn set_entries(&mut self, entries: Arc<[Entry]>) {
        self.max_dir_name_width = max_dir_name_width(&entries);
        self.entries = entries;
    }
}

/// A panel plus cursor state.
///
/// Invariant: `selected < panel.len()` when the panel has entries, 0 otherwise.
#[derive(Debug, Clone)]
pub struct Tab {
    panel: Panel,
    selected: usize,
    scroll: usize,
}

impl Tab {
    pub fn new(panel: Panel) -> Self {
        Self {
            panel,
            selected: 0,
            scroll: 0,
        }
    }

    #[inline]
    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    #[inline]
    pub fn panel_mut(&mut self) -> &mut Panel {
        &mut self.panel
    }

    #[inline]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[inline]
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.panel.entries().get(self.selected)
    }

    pub fn selected_path(&self) -> Option<PathBuf> {
        self.selected_entry().map(|e| self.panel.join(e))
    }

    /// Selects `idx` clamped to the listing.
    pub fn select(&mut self, idx: usize) {
        let len = self.panel.len();
        self.selected = if len == 0 { 0 } else { idx.min(len - 1) };
    }

    /// Moves the cursor by `delta`, clamped at both ends.
    pub fn move_by(&mut self, delta: isize) {
        let target = self.selected.saturating_add_signed(delta);
        self.select(target);
    }

    pub fn select_last(&mut self) {
        self.select(usize::MAX);
    }

    /// Cursor and scroll back to the top, e.g. after a directory change.
    pub fn reset_cursor(&mut self) {
        self.selected = 0;
        self.scroll = 0;
    }

    /// Re-clamps the cursor after the listing changed under it.
    pub fn clamp_selection(&mut self) {
        self.select(self.selected);
    }

    /// Adjusts the scroll offset so the cursor is inside a window of `height` rows.
    pub fn ensure_visible(&mut self, height: usize) {
        let height = height.max(1);
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + height {
            self.scroll = self.selected + 1 - height;
        }
        let max_scroll = self.panel.len().saturating_sub(height);
        self.scroll = self.scroll.min(max_scroll);
    }
}
