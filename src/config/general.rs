//! The general configuration settings for tfm.
//!
//! This module defines the [General] struct for the `[general]` table of
//! `config.toml`: the hidden-file default, where entered directories open and
//! the log level.

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct General {
    show_hidden: bool,
    open_dirs_right: bool,
    log_level: String,
}

impl Default for General {
    fn default() -> Self {
        General {
            show_hidden: false,
            open_dirs_right: false,
            log_level: "info".to_string(),
        }
    }
}

impl General {
    #[inline]
    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    /// Entering a directory opens it as a new right column instead of
    /// replacing the focused panel.
    #[inline]
    pub fn open_dirs_right(&self) -> bool {
        self.open_dirs_right
    }

    #[inline]
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}
