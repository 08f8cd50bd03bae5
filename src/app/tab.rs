//! Left-side tabs.
//!
//! [TabManager] always holds at least one tab; closing the last one is a no-op.

use crate::app::nav::{Panel, Tab};

#[derive(Debug)]
pub struct TabManager {
    tabs: Vec<Tab>,
    current: usize,
}

impl TabManager {
    pub fn new(first: Tab) -> Self {
        Self {
            tabs: vec![first],
            current: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    #[inline]
    pub fn active_index(&self) -> usize {
        self.current
    }

    pub fn current_tab(&self) -> &Tab {
        &self.tabs[self.current]
    }

    pub fn current_tab_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.current]
    }

    /// Appends a tab for `panel` and makes it active. Returns its index.
    pub fn add_tab(&mut self, panel: Panel) -> usize {
        self.tabs.push(Tab::new(panel));
        self.current = self.tabs.len() - 1;
        self.current
    }

    /// Closes the active tab unless it is the only one.
    pub fn close_current(&mut self) -> bool {
        if self.tabs.len() <= 1 {
            return false;
        }
        self.tabs.remove(self.current);
        if self.current >= self.tabs.len() {
            self.current = self.tabs.len() - 1;
        }
        true
    }

    /// Cycles the active tab by `dir`, wrapping at both ends.
    pub fn switch(&mut self, dir: isize) {
        let n = self.tabs.len() as isize;
        if n == 0 {
            return;
        }
        self.current = (self.current as isize + dir).rem_euclid(n) as usize;
    }
}
