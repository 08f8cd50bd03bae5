//! Display-cell aware text fitting and file attribute formatting for tfm.
//!
//! Every string that reaches the screen goes through this module: [trim_to_width]
//! and [pad_to_width] work in terminal cells, not bytes or chars, so wide glyphs
//! and multi-byte names keep the columns aligned.
//!
//! Also formats sizes, times and permission bits for the status line and the
//! info preview.

use chrono::{DateTime, Local};
use humansize::{DECIMAL, format_size};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use std::fs::Metadata;
use std::time::SystemTime;

pub const ELLIPSIS: char = '…';

// Tab stops used when expanding tabs inside preview lines
const TAB_WIDTH: usize = 4;

#[inline]
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Takes chars from the front of `text` while they fit in `width` cells.
fn take_cells(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out
}

/// Cuts `text` down to `width` display cells.
///
/// Text that already fits is returned unchanged. For a width of 0 or 1 there is
/// no room for an ellipsis, so the leading cells are returned as they are.
/// Otherwise the text is cut to `width - 1` cells and `…` is appended.
pub fn trim_to_width(text: &str, width: usize) -> String {
    if display_width(text) <= width {
        return text.to_string();
    }
    if width <= 1 {
        return take_cells(text, width);
    }
    let mut out = take_cells(text, width - 1);
    out.push(ELLIPSIS);
    out
}

/// Right-pads `text` with spaces up to `width` cells. Longer text is left as is.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let w = display_width(text);
    if w >= width {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + width - w);
    out.push_str(text);
    out.extend(std::iter::repeat_n(' ', width - w));
    out
}

/// Trims and pads so the result is exactly `width` cells wide.
pub fn fit_to_width(text: &str, width: usize) -> String {
    let trimmed = trim_to_width(text, width);
    // a wide glyph may leave the trimmed text one cell short
    pad_to_width(&trimmed, width)
}

/// Expands tabs to the next tab stop and drops control characters.
pub fn sanitize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut col = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let n = TAB_WIDTH - (col % TAB_WIDTH);
            out.extend(std::iter::repeat_n(' ', n));
            col += n;
            continue;
        }
        if ch.is_control() {
            continue;
        }
        out.push(ch);
        col += ch.width().unwrap_or(0);
    }
    out
}

/// Formats the file attributes in a unix-like format, e.g. `drwxr-xr-x`.
///
/// On Windows the string holds the type and attribute flags instead
/// (`d`, `l`, `h` hidden, `s` system, `a` archive, `r` read-only).
pub fn format_attributes(meta: &Metadata) -> String {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let file_type = meta.file_type();
        let first = if file_type.is_dir() {
            'd'
        } else if file_type.is_symlink() {
            'l'
        } else {
            '-'
        };
        let mode = meta.permissions().mode();
        let mut chars = [first, '-', '-', '-', '-', '-', '-', '-', '-', '-'];
        for (i, shift) in [6u32, 3, 0].into_iter().enumerate() {
            let base = 1 + i * 3;
            if (mode >> (shift + 2)) & 1 != 0 {
                chars[base] = 'r';
            }
            if (mode >> (shift + 1)) & 1 != 0 {
                chars[base + 1] = 'w';
            }
            if (mode >> shift) & 1 != 0 {
                chars[base + 2] = 'x';
            }
        }
        chars.iter().collect()
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        let attr = meta.file_attributes();
        let mut out = String::with_capacity(5);
        out.push(if attr & 0x10 != 0 {
            'd'
        } else if attr & 0x400 != 0 {
            'l'
        } else {
            '-'
        });
        out.push(if attr & 0x02 != 0 { 'h' } else { '-' });
        out.push(if attr & 0x04 != 0 { 's' } else { '-' });
        out.push(if attr & 0x20 != 0 { 'a' } else { '-' });
        out.push(if attr & 0x01 != 0 { 'r' } else { '-' });
        out
    }
}

/// Human readable size, or "-" for directories.
pub fn format_file_size(size: u64, is_dir: bool) -> String {
    if is_dir {
        "-".to_string()
    } else {
        format_size(size, DECIMAL)
    }
}

/// Local modification time, or "-" if unknown.
pub fn format_file_time(modified: Option<SystemTime>) -> String {
    modified
        .map(|mtime| {
            let dt: DateTime<Local> = DateTime::from(mtime);
            dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
        })
        .unwrap_or_else(|| "-".to_string())
}
