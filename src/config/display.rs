//! Display and preview configuration options for tfm.
//!
//! [Display] covers the `[display]` table (preview column, its width, the
//! color profile and background transparency), [PreviewOptions] the
//! `[preview]` table used by the preview resolver.

use crate::core::image::DEFAULT_INLINE_MAX_BYTES;
use crate::core::sample::DEFAULT_SAMPLE_BYTES;

use serde::Deserialize;

pub const MIN_RIGHT_PANE_PCT: usize = 10;
pub const MAX_RIGHT_PANE_PCT: usize = 80;

/// How many colors tfm may use when drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorProfile {
    /// No colors, only bold/faint/reverse.
    Ascii,
    /// The 16 basic terminal colors.
    Ansi,
    Ansi256,
    TrueColor,
}

impl ColorProfile {
    /// Parses a profile name. `auto` and unknown names give `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" | "off" | "mono" | "ascii" => Some(ColorProfile::Ascii),
            "ansi" => Some(ColorProfile::Ansi),
            "256" | "ansi256" => Some(ColorProfile::Ansi256),
            "truecolor" | "24bit" => Some(ColorProfile::TrueColor),
            _ => None,
        }
    }

    /// Resolves the profile: the configured name first, then `TFM_COLOR`,
    /// then a guess from `TERM` and `COLORTERM`.
    pub fn detect_with<F>(configured: &str, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(profile) = Self::parse(configured) {
            return profile;
        }
        if let Some(profile) = var("TFM_COLOR").as_deref().and_then(Self::parse) {
            return profile;
        }
        let term = var("TERM").unwrap_or_default().to_ascii_lowercase();
        let colorterm = var("COLORTERM").unwrap_or_default().to_ascii_lowercase();
        if term.contains("kitty") || colorterm.contains("truecolor") || colorterm.contains("24bit") {
            ColorProfile::TrueColor
        } else if term.contains("256color") {
            ColorProfile::Ansi256
        } else {
            ColorProfile::Ansi
        }
    }

    pub fn detect(configured: &str) -> Self {
        Self::detect_with(configured, |name| std::env::var(name).ok())
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorProfile::Ascii => "ascii",
            ColorProfile::Ansi => "ansi",
            ColorProfile::Ansi256 => "ansi256",
            ColorProfile::TrueColor => "truecolor",
        }
    }
}

/// Maps an opacity given as a fraction or a percentage into `0.0..=1.0`.
pub fn normalize_opacity(value: f64) -> f64 {
    let value = if value > 1.0 && value <= 100.0 {
        value / 100.0
    } else {
        value
    };
    value.clamp(0.0, 1.0)
}

/// Display configuration options
/// # Examples
/// ```toml
/// [display]
/// preview = true
/// right_pane_width = 40
/// color_profile = "auto"
/// background_opacity = 1.0
/// blur = false
/// ```
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Display {
    preview: bool,
    right_pane_width: usize,
    color_profile: String,
    background_opacity: f64,
    blur: bool,
}

impl Default for Display {
    fn default() -> Self {
        Display {
            preview: true,
            right_pane_width: 40,
            color_profile: "auto".to_string(),
            background_opacity: 1.0,
            blur: false,
        }
    }
}

impl Display {
    #[inline]
    pub fn preview(&self) -> bool {
        self.preview
    }

    /// Width of the preview column in percent of the terminal, clamped to 10..=80.
    #[inline]
    pub fn right_pane_width(&self) -> usize {
        self.right_pane_width
            .clamp(MIN_RIGHT_PANE_PCT, MAX_RIGHT_PANE_PCT)
    }

    /// `auto`, `none`, `ansi`, `256` or `truecolor`.
    #[inline]
    pub fn color_profile(&self) -> &str {
        &self.color_profile
    }

    /// Below 1.0 no background colors are drawn, so terminal transparency shows through.
    #[inline]
    pub fn background_opacity(&self) -> f64 {
        normalize_opacity(self.background_opacity)
    }

    /// Only recorded; blur is up to the terminal or compositor.
    #[inline]
    pub fn blur(&self) -> bool {
        self.blur
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PreviewOptions {
    inline_images: bool,
    inline_max_bytes: u64,
    sample_bytes: usize,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        PreviewOptions {
            inline_images: true,
            inline_max_bytes: DEFAULT_INLINE_MAX_BYTES,
            sample_bytes: DEFAULT_SAMPLE_BYTES,
        }
    }
}

impl PreviewOptions {
    #[inline]
    pub fn inline_images(&self) -> bool {
        self.inline_images
    }

    #[inline]
    pub fn inline_max_bytes(&self) -> u64 {
        self.inline_max_bytes
    }

    #[inline]
    pub fn sample_bytes(&self) -> usize {
        self.sample_bytes
    }
}
