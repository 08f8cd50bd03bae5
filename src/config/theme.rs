//! Theme configuration options for tfm
//!
//! The renderer only knows five named styles (header, status, directory,
//! selected, normal). Each is a [TextStyle] read from `[theme.<name>]` and
//! turned into a ratatui [Style] by the draw adapter.
//!
//! # Examples
//! ```toml
//! [theme.header]
//! fg = "#88c0d0"
//! bold = true
//!
//! [theme.selected]
//! bg = "236"
//! reverse = false
//! ```

use crate::config::display::ColorProfile;
use crate::utils::{adapt_color, parse_color};

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

/// Colors and attributes of one named style.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TextStyle {
    #[serde(deserialize_with = "deserialize_color_field")]
    fg: Color,
    #[serde(deserialize_with = "deserialize_color_field")]
    bg: Color,
    bold: bool,
    faint: bool,
    reverse: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            fg: Color::Reset,
            bg: Color::Reset,
            bold: false,
            faint: false,
            reverse: false,
        }
    }
}

impl TextStyle {
    pub fn to_style(&self) -> Style {
        let mut style = Style::default().fg(self.fg).bg(self.bg);
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.faint {
            style = style.add_modifier(Modifier::DIM);
        }
        if self.reverse {
            style = style.add_modifier(Modifier::REVERSED);
        }
        style
    }

    /// The style as drawn: colors fitted to `profile`, no background when `transparent`.
    pub fn to_style_with(&self, profile: ColorProfile, transparent: bool) -> Style {
        let mut style = self.to_style();
        style.fg = Some(adapt_color(self.fg, profile));
        style.bg = if transparent {
            None
        } else {
            Some(adapt_color(self.bg, profile))
        };
        style
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Theme {
    header: TextStyle,
    status: TextStyle,
    dir: TextStyle,
    selected: TextStyle,
    normal: TextStyle,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            header: TextStyle {
                fg: Color::Indexed(12),
                bold: true,
                ..TextStyle::default()
            },
            status: TextStyle {
                faint: true,
                ..TextStyle::default()
            },
            dir: TextStyle {
                fg: Color::Indexed(12),
                ..TextStyle::default()
            },
            selected: TextStyle {
                bold: true,
                reverse: true,
                ..TextStyle::default()
            },
            normal: TextStyle::default(),
        }
    }
}

impl Theme {
    #[inline]
    pub fn header(&self) -> &TextStyle {
        &self.header
    }

    #[inline]
    pub fn status(&self) -> &TextStyle {
        &self.status
    }

    #[inline]
    pub fn dir(&self) -> &TextStyle {
        &self.dir
    }

    #[inline]
    pub fn selected(&self) -> &TextStyle {
        &self.selected
    }

    #[inline]
    pub fn normal(&self) -> &TextStyle {
        &self.normal
    }
}

fn deserialize_color_field<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(parse_color(&s))
}
