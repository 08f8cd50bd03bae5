//! Input configuration options for tfm
//!
//! `[keys]` maps a key spec to an action name and is laid over the built-in
//! keymap. `[commands]` maps an Ex command name to a shell template.
//!
//! ```toml
//! [keys]
//! "g h" = "help"
//! "x" = "close-right"
//!
//! [commands]
//! edit = "!nvim {path}"
//! count = "wc -l"
//! ```

use serde::Deserialize;

use std::collections::BTreeMap;

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(transparent)]
pub struct Keys(BTreeMap<String, String>);

impl Keys {
    pub fn overrides(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(transparent)]
pub struct Commands(BTreeMap<String, String>);

impl Commands {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
