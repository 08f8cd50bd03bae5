//! Pure renderer for tfm.
//!
//! [render] turns an [AppState] into a [Screen]: exactly `height` rows of
//! exactly `width` display cells, each row a list of tagged segments. It never
//! touches the terminal. Inline images are not part of the text; the area they
//! cover is left blank and an [ImagePlacement] tells the host where to write
//! the escape sequence after drawing.

use crate::app::{AppState, Focus, Mode, Preview, RightMode, Tab};
use crate::core::fm::Entry;
use crate::core::formatter::{display_width, format_file_size, sanitize_line};
use crate::core::sample::PreviewResult;
use crate::ui::layout::{
    MIN_COLUMN_WIDTH, Row, SEPARATOR, Segment, StyleTag, blank_row, compute_column_widths,
    desired_width, fit_row, fitted_row, merge_columns,
};

use std::path::Path;

/// Key hints shown at the end of the status row.
const HINTS: &str = "[j/k] move  [h] up  [l/Enter] open  [.] hidden  [yy] copy  [pp] paste  [Y] copy-path  [P] paste-path  [:] cmd  [?] help  [q] quit";

/// Where the host should draw an inline image after the text is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePlacement {
    pub x: usize,
    pub y: usize,
    pub cols: usize,
    pub rows: usize,
    pub sequence: String,
}

/// One rendered frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub width: usize,
    pub height: usize,
    pub rows: Vec<Row>,
    pub images: Vec<ImagePlacement>,
}

impl Screen {
    /// Plain text of row `y`, for tests and debugging.
    pub fn line(&self, y: usize) -> String {
        self.rows
            .get(y)
            .map(|r| r.iter().map(|s| s.text.as_str()).collect())
            .unwrap_or_default()
    }
}

pub fn render(app: &AppState) -> Screen {
    let vp = app.viewport();
    let (width, height) = (vp.width, vp.height);
    let body_height = height.saturating_sub(2);

    let mut images = Vec::new();
    let mut rows = Vec::with_capacity(height);
    rows.push(fitted_row(&header_text(app), width, StyleTag::Header));

    let body = match app.mode() {
        Mode::Modal { title, lines } => modal_rows(title, lines, width),
        _ => column_rows(app, width, body_height, &mut images),
    };
    rows.extend(body.iter().take(body_height).map(|r| fit_row(r, width)));
    while rows.len() < body_height + 1 {
        rows.push(blank_row(width));
    }
    rows.push(fitted_row(&status_text(app), width, StyleTag::Status));

    // a terminal too small for header and status keeps the status row
    if rows.len() > height {
        rows.drain(..rows.len() - height);
        images.clear();
    }

    Screen {
        width,
        height,
        rows,
        images,
    }
}

fn header_text(app: &AppState) -> String {
    let tabs = app.tabs();
    format!(
        "tfm | tab {}/{} | {}",
        tabs.active_index() + 1,
        tabs.len(),
        app.focused_tab().panel().cwd().display()
    )
}

fn status_text(app: &AppState) -> String {
    if let Mode::CommandLine { buffer } = app.mode() {
        return format!(":{buffer}");
    }

    let tab = app.focused_tab();
    let panel = tab.panel();
    let n = panel.len();
    let sel = if n > 0 { tab.selected() + 1 } else { 0 };
    let vp = app.viewport();
    let bottom = (vp.y_offset + vp.body_height()).min(n);
    let pct = if n > 0 { bottom * 100 / n } else { 0 };
    let focus = if app.focus() == Focus::Right && app.right_mode() == RightMode::Panel {
        "R"
    } else {
        "L"
    };

    let mut status = format!(
        "[{sel}/{n}] {pct:>3}%  F:{focus} RO:{} PV:{} CB:{}  {HINTS}",
        on_off(app.open_right()),
        on_off(app.show_preview()),
        app.clipboard().kind(),
    );
    if let Some(entry) = tab.selected_entry() {
        let name = entry.name_str();
        status = match app.selected_size() {
            Some(size) => format!("{name} | {} | {status}", format_file_size(size, false)),
            None => format!("{name} | {status}"),
        };
    }
    if let Some(err) = app.error() {
        status = format!("ERR: {err} | {status}");
    }
    status
}

#[inline]
fn on_off(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}

fn modal_rows(title: &str, lines: &[String], width: usize) -> Vec<Row> {
    let mut rows = Vec::with_capacity(lines.len() + 1);
    if !title.is_empty() {
        rows.push(fitted_row(title, width, StyleTag::Status));
    }
    rows.extend(
        lines
            .iter()
            .map(|l| fitted_row(&sanitize_line(l), width, StyleTag::Normal)),
    );
    rows
}

fn entry_row(entry: &Entry, selected: bool) -> Row {
    let tag = if selected {
        StyleTag::Selected
    } else if entry.is_dir() {
        StyleTag::Directory
    } else {
        StyleTag::Normal
    };
    vec![Segment::new(entry.display_name(), tag)]
}

/// The visible window of a tab. Only the focused column shows its cursor.
fn panel_rows(tab: &Tab, height: usize, focused: bool) -> Vec<Row> {
    tab.panel()
        .entries()
        .iter()
        .enumerate()
        .skip(tab.scroll())
        .take(height)
        .map(|(i, e)| entry_row(e, focused && i == tab.selected()))
        .collect()
}

/// Widths of the panel columns plus the preview column, if shown.
fn column_widths(app: &AppState, panels: &[&Tab], width: usize) -> (Vec<usize>, Option<usize>) {
    let desired: Vec<usize> = panels
        .iter()
        .map(|t| desired_width(t.panel().max_dir_name_width()))
        .collect();
    let sep = display_width(SEPARATOR);

    if !app.show_preview() {
        if panels.len() == 1 {
            return (vec![width], None);
        }
        return (compute_column_widths(&desired, width, sep), None);
    }

    let preview = (width * app.right_pct() / 100)
        .max(MIN_COLUMN_WIDTH)
        .min(width.saturating_sub(MIN_COLUMN_WIDTH));
    let rest = width.saturating_sub(preview + sep);
    if panels.len() == 1 {
        return (vec![rest], Some(preview));
    }
    let avail = rest.max(MIN_COLUMN_WIDTH);
    (compute_column_widths(&desired, avail, sep), Some(preview))
}

fn column_rows(
    app: &AppState,
    width: usize,
    height: usize,
    images: &mut Vec<ImagePlacement>,
) -> Vec<Row> {
    let mut panels: Vec<&Tab> = vec![app.tabs().current_tab()];
    if app.right_mode() == RightMode::Panel {
        panels.extend(app.right_columns());
    }
    let focused_idx = match app.focus() {
        Focus::Right if panels.len() > 1 => panels.len() - 1,
        _ => 0,
    };

    let (mut widths, preview_width) = column_widths(app, &panels, width);
    let mut columns: Vec<Vec<Row>> = panels
        .iter()
        .enumerate()
        .map(|(i, t)| panel_rows(t, height, i == focused_idx))
        .collect();

    if let Some(pw) = preview_width {
        let sep = display_width(SEPARATOR);
        let x = widths.iter().map(|w| w + sep).sum::<usize>();
        let (rows, image) = preview_rows(app.preview(), pw, height);
        if let Some(mut placement) = image {
            placement.x = x;
            images.push(placement);
        }
        columns.push(rows);
        widths.push(pw);
    }

    let mut rows = merge_columns(&columns, &widths, SEPARATOR);
    rows.truncate(height);
    rows
}

/// Preview column: the selected path, then the body.
fn preview_rows(
    preview: Option<(&Path, &Preview)>,
    width: usize,
    height: usize,
) -> (Vec<Row>, Option<ImagePlacement>) {
    let Some((path, preview)) = preview else {
        return (Vec::new(), None);
    };
    if height == 0 {
        return (Vec::new(), None);
    }
    let mut rows = vec![vec![Segment::new(
        path.to_string_lossy().into_owned(),
        StyleTag::Status,
    )]];
    let body = height - 1;
    let mut image = None;

    match preview {
        Preview::Directory(entries) => {
            rows.extend(entries.iter().take(body).map(|e| entry_row(e, false)));
        }
        Preview::File(result) => {
            if let Some(placement) = inline_placement(result, width, body) {
                rows.extend((0..body).map(|_| blank_row(width)));
                image = Some(placement);
            } else {
                rows.extend(
                    result
                        .lines()
                        .take(body)
                        .map(|l| vec![Segment::new(sanitize_line(l), StyleTag::Normal)]),
                );
            }
        }
        Preview::Error(msg) => {
            rows.push(vec![Segment::new(msg.clone(), StyleTag::Normal)]);
        }
    }
    (rows, image)
}

fn inline_placement(result: &PreviewResult, cols: usize, rows: usize) -> Option<ImagePlacement> {
    let img = result.inline.as_ref()?;
    if cols == 0 || rows == 0 {
        return None;
    }
    Some(ImagePlacement {
        x: 0,
        // below the header and the path line
        y: 2,
        cols,
        rows,
        sequence: img.escape_sequence(cols, rows),
    })
}
