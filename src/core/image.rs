//! Image preview back-ends: ASCII-art thumbnails and OSC 1337 inline images.
//!
//! Decoding goes through the `image` crate. Inline images are only offered when
//! the terminal looks like iTerm2 or WezTerm, detected from the environment.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{GenericImageView, ImageFormat, ImageReader};

use std::fs;
use std::io;
use std::path::Path;

/// Extensions that are considered images for inline rendering.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff", "tif"];

/// Default ceiling for inline image payloads.
pub const DEFAULT_INLINE_MAX_BYTES: u64 = 1_572_864;

const ASCII_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
const ASCII_TARGET_WIDTH: u32 = 64;
const ASCII_MIN_WIDTH: u32 = 8;
const ASCII_MAX_ROWS: u32 = 80;

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Inline image support, looked up through `var` so tests can fake the environment.
pub fn supports_inline_images_with<F>(var: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let set = |key: &str| var(key).is_some_and(|v| !v.is_empty());

    if set("TFM_NO_INLINE_IMAGES") {
        return false;
    }
    match var("TFM_INLINE").map(|v| v.to_lowercase()).as_deref() {
        Some("off" | "none" | "0" | "false") => return false,
        Some("iterm2" | "wezterm") => return true,
        _ => {}
    }
    if set("ITERM_SESSION_ID") || set("WEZTERM_PANE") {
        return true;
    }
    var("TERM_PROGRAM").is_some_and(|v| v.to_lowercase().contains("wezterm"))
}

pub fn supports_inline_images() -> bool {
    supports_inline_images_with(|key| std::env::var(key).ok())
}

/// Byte ceiling for inline images: `TFM_INLINE_MAX_BYTES` wins over `configured`.
pub fn inline_max_bytes(configured: u64) -> u64 {
    std::env::var("TFM_INLINE_MAX_BYTES")
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(configured)
}

/// Raw file contents of an image, base64 encoded and ready for an OSC 1337 sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub name: String,
    pub size: usize,
    pub payload: String,
}

impl InlineImage {
    /// Reads `path` if it is a non-empty file no larger than `max_bytes`.
    pub fn load(path: &Path, max_bytes: u64) -> io::Result<Option<InlineImage>> {
        let meta = fs::metadata(path)?;
        if meta.is_dir() || meta.len() == 0 || meta.len() > max_bytes {
            return Ok(None);
        }
        let data = fs::read(path)?;
        if data.is_empty() {
            return Ok(None);
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Some(InlineImage {
            name,
            size: data.len(),
            payload: BASE64.encode(&data),
        }))
    }

    /// The escape sequence that draws this image over `cols` x `rows` cells.
    pub fn escape_sequence(&self, cols: usize, rows: usize) -> String {
        format!(
            "\x1b]1337;File=name={};size={};inline=1;width={};height={};preserveAspectRatio=1:{}\x07",
            BASE64.encode(self.name.as_bytes()),
            self.size,
            cols,
            rows,
            self.payload
        )
    }
}

fn format_name(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("png"),
        ImageFormat::Jpeg => Some("jpeg"),
        ImageFormat::Gif => Some("gif"),
        ImageFormat::Bmp => Some("bmp"),
        ImageFormat::WebP => Some("webp"),
        _ => None,
    }
}

/// Decodes `path` by content and renders a grayscale ASCII thumbnail.
///
/// Returns the art and the mime type, or `None` when the file is not a
/// supported image or fails to decode.
pub fn ascii_preview(path: &Path) -> Option<(String, String)> {
    let reader = ImageReader::open(path).ok()?.with_guessed_format().ok()?;
    let name = format_name(reader.format()?)?;
    let img = reader.decode().ok()?;
    let (w, _) = img.dimensions();
    let target = if w > 0 && w < ASCII_TARGET_WIDTH {
        w
    } else {
        ASCII_TARGET_WIDTH
    };
    Some((ascii_art(&img, target), format!("image/{name}")))
}

/// Maps each sampled pixel to a 10-step luminance ramp. Rows are halved so the
/// picture keeps its aspect ratio in roughly 1:2 terminal cells.
pub fn ascii_art(img: &image::DynamicImage, target_width: u32) -> String {
    let target_w = target_width.max(ASCII_MIN_WIDTH);
    let (iw, ih) = img.dimensions();
    if iw == 0 || ih == 0 {
        return String::new();
    }
    let scaled = (ih as u64 * target_w as u64 / iw as u64).max(1);
    let target_h = (scaled / 2).clamp(1, ASCII_MAX_ROWS as u64) as u32;

    let levels = ASCII_RAMP.len() as u32;
    let mut out = String::with_capacity(((target_w + 1) * target_h) as usize);
    for y in 0..target_h {
        let sy = (y as u64 * ih as u64 / target_h as u64) as u32;
        for x in 0..target_w {
            let sx = (x as u64 * iw as u64 / target_w as u64) as u32;
            let [r, g, b, _] = img.get_pixel(sx, sy).0;
            let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
            let idx = (luma * (levels - 1) / 255) as usize;
            out.push(ASCII_RAMP[idx.min(ASCII_RAMP.len() - 1)]);
        }
        if y + 1 < target_h {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn inline_detection_from_env() {
        assert!(!supports_inline_images_with(env(&[])));
        assert!(supports_inline_images_with(env(&[("ITERM_SESSION_ID", "w0t0p0")])));
        assert!(supports_inline_images_with(env(&[("TERM_PROGRAM", "WezTerm")])));
        assert!(supports_inline_images_with(env(&[("TFM_INLINE", "iterm2")])));
        assert!(!supports_inline_images_with(env(&[
            ("TFM_INLINE", "off"),
            ("ITERM_SESSION_ID", "x"),
        ])));
        assert!(!supports_inline_images_with(env(&[
            ("TFM_NO_INLINE_IMAGES", "1"),
            ("TFM_INLINE", "wezterm"),
        ])));
    }

    #[test]
    fn image_extension_check_ignores_case() {
        assert!(is_image_path(Path::new("a/b/photo.JPG")));
        assert!(is_image_path(Path::new("x.webp")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("png")));
    }

    #[test]
    fn escape_sequence_is_sized_to_area() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("pic.png");
        fs::write(&path, b"not really a png")?;

        let img = InlineImage::load(&path, DEFAULT_INLINE_MAX_BYTES)?.ok_or("expected payload")?;
        assert_eq!(img.size, 16);
        let seq = img.escape_sequence(12, 5);
        assert!(seq.starts_with("\x1b]1337;File=name="));
        assert!(seq.contains(";size=16;inline=1;width=12;height=5;preserveAspectRatio=1:"));
        assert!(seq.ends_with('\x07'));
        Ok(())
    }

    #[test]
    fn inline_respects_byte_ceiling() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("big.png");
        fs::write(&path, vec![1u8; 64])?;
        assert!(InlineImage::load(&path, 32)?.is_none());
        assert!(InlineImage::load(&path, 64)?.is_some());
        Ok(())
    }

    #[test]
    fn ascii_art_dimensions_and_ramp() {
        let mut buf = RgbImage::new(32, 32);
        for (x, _, px) in buf.enumerate_pixels_mut() {
            *px = if x < 16 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) };
        }
        let art = ascii_art(&DynamicImage::ImageRgb8(buf), 16);
        let rows: Vec<&str> = art.lines().collect();
        assert_eq!(rows.len(), 8);
        assert!(rows.iter().all(|r| r.chars().count() == 16));
        assert!(rows[0].starts_with(' '));
        assert!(rows[0].ends_with('@'));
    }

    #[test]
    fn ascii_preview_decodes_png() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("tiny.png");
        RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])).save(&path)?;

        let (art, mime) = ascii_preview(&path).ok_or("expected ascii art")?;
        assert_eq!(mime, "image/png");
        // narrow images are widened to the minimum width
        assert!(art.lines().all(|l| l.chars().count() == 8));
        Ok(())
    }
}
