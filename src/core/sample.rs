//! Byte-budgeted content sampling for file previews.
//!
//! [sample_file] turns a path into a [PreviewResult]: an ASCII-art thumbnail for
//! decodable images, a text snippet when the first bytes look like text, and a
//! metadata summary otherwise.

use crate::core::fm::FileMeta;
use crate::core::formatter::format_file_time;
use crate::core::image::{InlineImage, ascii_preview};

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub const DEFAULT_SAMPLE_BYTES: usize = 8192;
pub const MAX_TEXT_LINES: usize = 256;

// share of printable bytes needed to call a sample text
const TEXT_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Text,
    Info,
    Image,
}

/// What the preview column shows for a file. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewResult {
    pub kind: PreviewKind,
    pub content: String,
    pub mime: String,
    /// Set when the image should be drawn by the terminal instead of as text.
    pub inline: Option<InlineImage>,
}

impl PreviewResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: PreviewKind::Text,
            content: content.into(),
            mime: "text/plain".to_string(),
            inline: None,
        }
    }

    pub fn info(content: impl Into<String>, mime: &str) -> Self {
        Self {
            kind: PreviewKind::Info,
            content: content.into(),
            mime: mime.to_string(),
            inline: None,
        }
    }

    pub fn inline_image(image: InlineImage, mime: String) -> Self {
        Self {
            kind: PreviewKind::Image,
            content: String::new(),
            mime,
            inline: Some(image),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }
}

/// No NUL byte and at least 85% printable ASCII or common whitespace.
/// An empty sample counts as text.
pub fn is_text(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return true;
    }
    if sample.contains(&0) {
        return false;
    }
    let printable = sample
        .iter()
        .filter(|&&c| matches!(c, b'\n' | b'\r' | b'\t' | 0x0c | 0x0b | 0x20..=0x7e))
        .count();
    printable as f64 >= TEXT_THRESHOLD * sample.len() as f64
}

/// Normalizes CRLF and CR to LF and keeps at most [MAX_TEXT_LINES] lines,
/// appending a `…` line when something was cut.
pub fn normalize_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = unified.split('\n');
    let kept: Vec<&str> = lines.by_ref().take(MAX_TEXT_LINES).collect();
    let mut out = kept.join("\n");
    if lines.next().is_some() {
        out.push_str("\n…");
    }
    out
}

/// Lossy UTF-8 decode of a sample that may end mid-character. An incomplete
/// sequence at the cut is dropped instead of becoming U+FFFD.
fn decode_sample(sample: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(sample) {
        Ok(text) => Cow::Borrowed(text),
        Err(e) if e.error_len().is_none() => String::from_utf8_lossy(&sample[..e.valid_up_to()]),
        Err(_) => String::from_utf8_lossy(sample),
    }
}

fn read_budget(path: &Path, max_bytes: usize) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(max_bytes.min(64 * 1024));
    file.take(max_bytes as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Summary used when a file is neither an image nor text.
pub fn info_text(meta: &FileMeta) -> String {
    format!(
        "{} ({} bytes)\nmode: {}\nmodified: {}",
        meta.name,
        meta.size,
        meta.mode,
        format_file_time(meta.modified)
    )
}

/// Samples at most `max_bytes` of `path`. A zero budget uses [DEFAULT_SAMPLE_BYTES].
pub fn sample_file(path: &Path, max_bytes: usize) -> io::Result<PreviewResult> {
    let max_bytes = if max_bytes == 0 {
        DEFAULT_SAMPLE_BYTES
    } else {
        max_bytes
    };
    let meta = FileMeta::stat(path)?;
    if meta.is_dir {
        return Ok(PreviewResult::info("directory", "inode/directory"));
    }

    if let Some((art, mime)) = ascii_preview(path) {
        return Ok(PreviewResult {
            kind: PreviewKind::Image,
            content: art,
            mime,
            inline: None,
        });
    }

    let sample = read_budget(path, max_bytes)?;
    if is_text(&sample) {
        return Ok(PreviewResult::text(normalize_text(&decode_sample(&sample))));
    }

    Ok(PreviewResult::info(
        info_text(&meta),
        "application/octet-stream",
    ))
}
