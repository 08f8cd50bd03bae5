//! Column layout for tfm.
//!
//! Splits the terminal width between the same-row columns (left panel, right
//! column chain, preview) and interleaves their lines into rows. Everything
//! here works in display cells and deals only in tagged text; colors are the
//! draw adapter's business.

use crate::core::formatter::{display_width, fit_to_width, trim_to_width};

pub const MIN_COLUMN_WIDTH: usize = 10;
pub const SEPARATOR: &str = " ";

/// Named style of a piece of text. Mapped to a theme style when drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTag {
    Header,
    Status,
    Directory,
    Selected,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub tag: StyleTag,
}

impl Segment {
    pub fn new(text: impl Into<String>, tag: StyleTag) -> Self {
        Self {
            text: text.into(),
            tag,
        }
    }
}

/// One screen row as styled segments.
pub type Row = Vec<Segment>;

/// A row holding a single segment exactly `width` cells wide.
pub fn fitted_row(text: &str, width: usize, tag: StyleTag) -> Row {
    vec![Segment::new(fit_to_width(text, width), tag)]
}

pub fn blank_row(width: usize) -> Row {
    vec![Segment::new(" ".repeat(width), StyleTag::Normal)]
}

#[inline]
pub fn row_width(row: &[Segment]) -> usize {
    row.iter().map(|s| display_width(&s.text)).sum()
}

/// Width a column would like: its widest directory name plus two, at least the minimum.
#[inline]
pub fn desired_width(max_dir_name_width: usize) -> usize {
    (max_dir_name_width + 2).max(MIN_COLUMN_WIDTH)
}

/// Splits `total` cells between columns with the given desired widths.
///
/// Walking left to right each column gets its desired width, capped so every
/// column still to be placed can have the minimum, and never less than the
/// minimum itself. The last column takes whatever is left. When `total` cannot
/// hold the minimum for every column the widths sum to more than `total`; the
/// merged rows are clipped afterwards.
pub fn compute_column_widths(desired: &[usize], total: usize, separator: usize) -> Vec<usize> {
    let n = desired.len();
    if n == 0 {
        return Vec::new();
    }
    let mut remaining = total as isize - (separator * (n - 1)) as isize;
    let mut widths = Vec::with_capacity(n);
    for (i, want) in desired.iter().enumerate() {
        let min_for_rest = ((n - i - 1) * MIN_COLUMN_WIDTH) as isize;
        let cap = remaining - min_for_rest;
        let w = (*want as isize).min(cap).max(MIN_COLUMN_WIDTH as isize);
        widths.push(w as usize);
        remaining -= w;
    }
    if remaining > 0
        && let Some(last) = widths.last_mut()
    {
        *last += remaining as usize;
    }
    widths
}

/// Interleaves columns row by row.
///
/// Every cell is fitted to its column width and joined with `separator`;
/// columns shorter than the tallest one get blank cells.
pub fn merge_columns(columns: &[Vec<Row>], widths: &[usize], separator: &str) -> Vec<Row> {
    let height = columns.iter().map(Vec::len).max().unwrap_or(0);
    (0..height)
        .map(|i| {
            let mut row = Row::new();
            for (j, (col, &w)) in columns.iter().zip(widths).enumerate() {
                if j > 0 {
                    row.push(Segment::new(separator, StyleTag::Normal));
                }
                match col.get(i) {
                    Some(cell) => row.extend(fit_row(cell, w)),
                    None => row.push(Segment::new(" ".repeat(w), StyleTag::Normal)),
                }
            }
            row
        })
        .collect()
}

/// Trims a styled row to `width` cells and pads it with spaces to exactly `width`.
pub fn fit_row(row: &[Segment], width: usize) -> Row {
    let mut out = Row::with_capacity(row.len() + 1);
    let mut used = 0;
    for seg in row {
        if used >= width {
            break;
        }
        let room = width - used;
        let w = display_width(&seg.text);
        if w <= room {
            used += w;
            out.push(seg.clone());
            continue;
        }
        let text = trim_to_width(&seg.text, room);
        used += display_width(&text);
        out.push(Segment::new(text, seg.tag));
        break;
    }
    if used < width {
        let tag = out.last().map(|s| s.tag).unwrap_or(StyleTag::Normal);
        out.push(Segment::new(" ".repeat(width - used), tag));
    }
    out
}
