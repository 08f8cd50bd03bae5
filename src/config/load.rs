//! The main config loading module for tfm.
//!
//! Handles loading and deserializing settings from `config.toml`.
//!
//! Provides and manages the main [Config] struct, as well as the internal [RawConfig] used for parsing.
//!
//! Also writes the commented default config for `tfm --init`.

use crate::config::{Commands, Display, General, Keys, PreviewOptions, Theme};
use crate::error::{Error, Result};

use serde::Deserialize;

use std::path::{Path, PathBuf};
use std::{fs, io};

/// Raw configuration as read from the toml file.
/// It is then converted into the main [Config] struct.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub(crate) struct RawConfig {
    general: General,
    display: Display,
    preview: PreviewOptions,
    theme: Theme,
    keys: Keys,
    commands: Commands,
}

/// Main configuration struct for tfm
#[derive(Debug, Clone, Default)]
pub struct Config {
    general: General,
    display: Display,
    preview: PreviewOptions,
    theme: Theme,
    keys: Keys,
    commands: Commands,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            general: raw.general,
            display: raw.display,
            preview: raw.preview,
            theme: raw.theme,
            keys: raw.keys,
            commands: raw.commands,
        }
    }
}

impl Config {
    /// Load configuration from `explicit`, or from [Config::default_path].
    ///
    /// A missing default file gives the internal defaults. Anything else that
    /// fails also gives the defaults, with the error handed back so the caller
    /// can report it once logging is up.
    pub fn load(explicit: Option<&Path>) -> (Self, Option<Error>) {
        let path = explicit.map_or_else(Self::default_path, Path::to_path_buf);
        if explicit.is_none() && !path.exists() {
            return (Self::default(), None);
        }
        match Self::from_file(&path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str::<RawConfig>(content)
            .map(Config::from)
            .map_err(|e| Error::Config(e.to_string()))
    }

    // Getters

    #[inline]
    pub fn general(&self) -> &General {
        &self.general
    }

    #[inline]
    pub fn display(&self) -> &Display {
        &self.display
    }

    #[inline]
    pub fn preview(&self) -> &PreviewOptions {
        &self.preview
    }

    #[inline]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    #[inline]
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    #[inline]
    pub fn commands(&self) -> &Commands {
        &self.commands
    }

    /// Determine the default configuration file path.
    /// Checks the TFM_CONFIG environment variable first,
    /// Checks for XDG_CONFIG_HOME after,
    /// then defaults to ~/.config/tfm/config.toml,
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("TFM_CONFIG") {
            return PathBuf::from(path);
        }

        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("tfm/config.toml");
        }

        if let Some(home) = dirs::home_dir() {
            return home.join(".config/tfm/config.toml");
        }
        PathBuf::from("config.toml")
    }

    /// Generate a default configuration file at the specified path.
    /// If the file already exists, returns an error.
    pub fn generate_default(path: &Path) -> io::Result<()> {
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {:?}", path),
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_TOML)
    }
}

pub(crate) const DEFAULT_TOML: &str = r##"# config.toml - default configuration for tfm

# Note:
# Commented values are the internal defaults of tfm
# Colors: names ("cyan"), hex ("#RRGGBB", "#RGB") or palette indexes ("12").

[general]
# show_hidden = false
# open_dirs_right = false
# log_level = "info"        # overridden by the TFM_LOG environment variable

[display]
# preview = true
# right_pane_width = 40     # percent, 10..80
# color_profile = "auto"    # auto, none, ansi, 256, truecolor
# background_opacity = 1.0  # below 1.0 no backgrounds are drawn; 0..1 or 0..100
# blur = false

[preview]
# inline_images = true
# inline_max_bytes = 1572864
# sample_bytes = 8192

# [theme.header]
# fg = "12"
# bold = true

# [theme.status]
# faint = true

# [theme.dir]
# fg = "12"

# [theme.selected]
# bold = true
# reverse = true

# [theme.normal]
# fg = "default"

# Key spec = action name, laid over the built-in bindings.
# Run `tfm --keybinds` for the list.
[keys]
# "g h" = "help"
# "ctrl+n" = "new-tab"

# Custom commands for the ':' prompt.
# {cwd}, {file} and {path} are replaced with shell quoted values.
# A leading '!' runs the command in the terminal.
[commands]
# edit = "!nvim {path}"
# count = "wc -l {file}"
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_toml_parses_to_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::parse(DEFAULT_TOML)?;
        assert!(!config.general().show_hidden());
        assert!(config.display().preview());
        assert_eq!(config.display().right_pane_width(), 40);
        assert!(config.keys().overrides().is_empty());
        Ok(())
    }

    #[test]
    fn parse_sections() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::parse(
            r#"
            [general]
            show_hidden = true
            open_dirs_right = true

            [keys]
            "g h" = "help"

            [commands]
            count = "wc -l {file}"
            "#,
        )?;
        assert!(config.general().show_hidden());
        assert!(config.general().open_dirs_right());
        assert_eq!(config.general().log_level(), "info");
        assert_eq!(
            config.keys().overrides().get("g h").map(String::as_str),
            Some("help")
        );
        assert_eq!(config.commands().get("count"), Some("wc -l {file}"));
        Ok(())
    }

    #[test]
    fn parse_error_is_config_error() {
        let err = Config::parse("[general\nshow_hidden = yes");
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn broken_file_loads_defaults_and_returns_the_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general]\nshow_hidden = true\n[display\n")?;

        let (config, err) = Config::load(Some(&path));
        assert!(matches!(err, Some(Error::Config(_))));
        assert!(!config.general().show_hidden());

        let (_, missing) = Config::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(missing, Some(Error::NotFound(_))));

        fs::write(&path, "[general]\nshow_hidden = true\n")?;
        let (config, err) = Config::load(Some(&path));
        assert!(err.is_none());
        assert!(config.general().show_hidden());
        Ok(())
    }

    #[test]
    fn generate_default_refuses_to_overwrite() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/config.toml");
        Config::generate_default(&path)?;
        assert!(Config::from_file(&path).is_ok());

        let err = Config::generate_default(&path);
        assert!(matches!(err, Err(e) if e.kind() == io::ErrorKind::AlreadyExists));
        Ok(())
    }
}
