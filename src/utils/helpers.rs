//! Helpers for tfm.
//!
//! Path utilities shared by the command line, the clipboard and the paste worker:
//! - Expanding a leading `~` to the home directory
//! - Picking a free "name copy N.ext" destination for pastes
//! - Copying files and directories recursively
//! - Parsing theme colors and fitting them to the terminal's color profile

use crate::config::display::ColorProfile;

use ratatui::style::Color;

use std::path::{Path, PathBuf};
use std::{fs, io};

// Give up probing "copy N" names after this many attempts
const MAX_COPY_SUFFIX: usize = 1000;

// xterm defaults for the 16 basic colors, in palette order
const ANSI_PALETTE: [(Color, (u8, u8, u8)); 16] = [
    (Color::Black, (0, 0, 0)),
    (Color::Red, (128, 0, 0)),
    (Color::Green, (0, 128, 0)),
    (Color::Yellow, (128, 128, 0)),
    (Color::Blue, (0, 0, 128)),
    (Color::Magenta, (128, 0, 128)),
    (Color::Cyan, (0, 128, 128)),
    (Color::Gray, (192, 192, 192)),
    (Color::DarkGray, (128, 128, 128)),
    (Color::LightRed, (255, 0, 0)),
    (Color::LightGreen, (0, 255, 0)),
    (Color::LightYellow, (255, 255, 0)),
    (Color::LightBlue, (0, 0, 255)),
    (Color::LightMagenta, (255, 0, 255)),
    (Color::LightCyan, (0, 255, 255)),
    (Color::White, (255, 255, 255)),
];

/// Expands a leading `~` or `~/` to the user's home directory.
///
/// Anything else, including `~user`, is returned as is.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(home) = dirs::home_dir() {
        if path == "~" {
            return home;
        }
        if let Some(rest) = path.strip_prefix("~/") {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolves `input` for `:cd`: `~` expansion, then relative to `base`.
pub fn resolve_path(base: &Path, input: &str) -> PathBuf {
    let expanded = expand_home(input);
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// Splits `name` into stem and extension at the last dot.
/// A leading dot is part of the stem, so `.bashrc` has no extension.
fn split_ext(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    }
}

/// Finds a free destination for `name` inside `dir`.
///
/// Example: "notes.txt" -> "notes copy 1.txt" -> "notes copy 2.txt"
pub fn unique_dest_path(dir: &Path, name: &str) -> PathBuf {
    let direct = dir.join(name);
    if !direct.exists() {
        return direct;
    }
    let (stem, ext) = split_ext(name);
    for i in 1..MAX_COPY_SUFFIX {
        let candidate = dir.join(format!("{stem} copy {i}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }
    dir.join(format!("{stem} copy{ext}"))
}

/// Recursively copies files and directories from `src` to `dest`.
///
/// Symlinks are recreated as links and never followed, so a link back up the
/// tree cannot make the copy recurse into itself.
pub fn copy_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    let file_type = fs::symlink_metadata(src)?.file_type();
    if file_type.is_symlink() {
        copy_symlink(src, dest)
    } else if file_type.is_dir() {
        fs::create_dir_all(dest)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_recursive(&entry.path(), &dest.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        fs::copy(src, dest).map(|_| ())
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    let target = fs::read_link(src)?;
    std::os::unix::fs::symlink(target, dest)
}

// no portable way to recreate the link; copy what it points at when that is a file
#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    if fs::metadata(src)?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "cannot copy a directory symlink on this platform",
        ));
    }
    fs::copy(src, dest).map(|_| ())
}

fn hex_rgb(hex: &str) -> Option<Color> {
    let rgb = u32::from_str_radix(hex, 16).ok()?;
    Some(Color::Rgb(
        ((rgb >> 16) & 0xFF) as u8,
        ((rgb >> 8) & 0xFF) as u8,
        (rgb & 0xFF) as u8,
    ))
}

/// Fits `color` to what the terminal can show under `profile`.
///
/// Colors the profile already supports pass through. Ascii drops every color.
pub fn adapt_color(color: Color, profile: ColorProfile) -> Color {
    match (profile, color) {
        (_, Color::Reset) | (ColorProfile::Ascii, _) => Color::Reset,
        (ColorProfile::TrueColor, c) => c,
        (ColorProfile::Ansi256, Color::Rgb(r, g, b)) => Color::Indexed(cube_index(r, g, b)),
        (ColorProfile::Ansi256, c) => c,
        (ColorProfile::Ansi, Color::Rgb(r, g, b)) => nearest_ansi((r, g, b)),
        (ColorProfile::Ansi, Color::Indexed(i)) if i < 16 => ANSI_PALETTE[i as usize].0,
        (ColorProfile::Ansi, Color::Indexed(i)) => nearest_ansi(indexed_rgb(i)),
        (ColorProfile::Ansi, c) => c,
    }
}

/// Index into the 6x6x6 cube of the 256-color palette.
fn cube_index(r: u8, g: u8, b: u8) -> u8 {
    let level = |v: u8| -> u8 {
        if v < 48 {
            0
        } else if v < 115 {
            1
        } else {
            (v - 35) / 40
        }
    };
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

fn indexed_rgb(i: u8) -> (u8, u8, u8) {
    match i {
        0..=15 => ANSI_PALETTE[i as usize].1,
        16..=231 => {
            let i = i - 16;
            let level = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            (level(i / 36), level((i / 6) % 6), level(i % 6))
        }
        _ => {
            let gray = 8 + (i - 232) * 10;
            (gray, gray, gray)
        }
    }
}

fn nearest_ansi((r, g, b): (u8, u8, u8)) -> Color {
    let dist = |(pr, pg, pb): (u8, u8, u8)| {
        let d = |a: u8, b: u8| (i32::from(a) - i32::from(b)).pow(2);
        d(r, pr) + d(g, pg) + d(b, pb)
    };
    ANSI_PALETTE
        .iter()
        .min_by_key(|(_, rgb)| dist(*rgb))
        .map_or(Color::Reset, |(color, _)| *color)
}

/// Parses a theme color.
///
/// Accepts terminal color names, `#RGB`, `#RRGGBB`, `#RRGGBBAA` (alpha is
/// dropped) and ANSI palette indexes such as `"12"`. Anything else is
/// [Color::Reset].
pub fn parse_color(s: &str) -> Color {
    let s = s.trim();
    match s.to_lowercase().as_str() {
        "" | "default" | "reset" => Color::Reset,
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "white" => Color::White,
        _ => {
            if let Some(color) = s.strip_prefix('#') {
                let parsed = match color.len() {
                    3 => {
                        let expanded: String = color.chars().flat_map(|c| [c, c]).collect();
                        hex_rgb(&expanded)
                    }
                    6 => hex_rgb(color),
                    8 if color.is_ascii() => hex_rgb(&color[..6]),
                    _ => None,
                };
                return parsed.unwrap_or(Color::Reset);
            }
            s.parse::<u8>().map(Color::Indexed).unwrap_or(Color::Reset)
        }
    }
}
