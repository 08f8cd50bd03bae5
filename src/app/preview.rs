//! Preview resolution for the preview column.
//!
//! Directories are mirrored through the shared directory cache. Files go
//! through their own path-keyed cache, so a file is sampled at most once per
//! session until it ages out. Failed reads are reported but never cached.

use crate::app::nav::{DirCache, load_listing};
use crate::config::PreviewOptions;
use crate::core::cache::FifoCache;
use crate::core::fm::Entry;
use crate::core::image::{InlineImage, inline_max_bytes, is_image_path, supports_inline_images};
use crate::core::sample::{PreviewResult, sample_file};
use crate::error::Error;

use tracing::{debug, warn};

use std::path::Path;
use std::sync::Arc;

/// What the preview column shows for the current selection.
#[derive(Debug, Clone)]
pub enum Preview {
    Directory(Arc<[Entry]>),
    File(Arc<PreviewResult>),
    Error(String),
}

#[derive(Debug)]
pub struct PreviewResolver {
    cache: FifoCache<Arc<PreviewResult>>,
    inline_enabled: bool,
    inline_max_bytes: u64,
    sample_bytes: usize,
}

impl PreviewResolver {
    pub fn new(inline_enabled: bool, inline_max_bytes: u64, sample_bytes: usize) -> Self {
        Self {
            cache: FifoCache::default(),
            inline_enabled,
            inline_max_bytes,
            sample_bytes,
        }
    }

    /// Inline images are only used when both the config allows them and the
    /// terminal looks like it can draw them.
    pub fn from_options(opts: &PreviewOptions) -> Self {
        let inline = opts.inline_images() && supports_inline_images();
        debug!(inline, "preview resolver");
        Self::new(
            inline,
            inline_max_bytes(opts.inline_max_bytes()),
            opts.sample_bytes(),
        )
    }

    /// Resolves the preview of `path`. Directories are read with `show_hidden`.
    pub fn resolve(
        &mut self,
        path: &Path,
        is_dir: bool,
        show_hidden: bool,
        dirs: &mut DirCache,
    ) -> Preview {
        if is_dir {
            return match load_listing(dirs, path, show_hidden) {
                Ok(entries) => Preview::Directory(entries),
                Err(e) => Preview::Error(e.to_string()),
            };
        }
        self.resolve_file(path)
    }

    pub fn resolve_file(&mut self, path: &Path) -> Preview {
        if let Some(hit) = self.cache.get(path) {
            return Preview::File(Arc::clone(hit));
        }

        let result = match self.try_inline(path) {
            Some(result) => result,
            None => match sample_file(path, self.sample_bytes) {
                Ok(result) => result,
                Err(e) => {
                    let err = Error::from_io(path, e);
                    warn!(path = %path.display(), "preview failed: {err}");
                    return Preview::Error(err.to_string());
                }
            },
        };

        let result = Arc::new(result);
        self.cache.put(path.to_path_buf(), Arc::clone(&result));
        Preview::File(result)
    }

    fn try_inline(&self, path: &Path) -> Option<PreviewResult> {
        if !self.inline_enabled || !is_image_path(path) {
            return None;
        }
        match InlineImage::load(path, self.inline_max_bytes) {
            Ok(Some(img)) => {
                let ext = path
                    .extension()
                    .map(|e| e.to_string_lossy().to_ascii_lowercase())
                    .unwrap_or_default();
                Some(PreviewResult::inline_image(img, format!("image/{ext}")))
            }
            Ok(None) => None,
            Err(e) => {
                debug!(path = %path.display(), "inline image skipped: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sample::PreviewKind;
    use image::{Rgb, RgbImage};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn file_preview_is_cached() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.txt");
        fs::write(&path, "first\r\nsecond")?;

        let mut resolver = PreviewResolver::new(false, 0, 0);
        let Preview::File(first) = resolver.resolve_file(&path) else {
            panic!("expected file preview");
        };
        assert_eq!(first.kind, PreviewKind::Text);
        assert_eq!(first.content, "first\nsecond");

        fs::write(&path, "changed")?;
        let Preview::File(again) = resolver.resolve_file(&path) else {
            panic!("expected file preview");
        };
        assert!(Arc::ptr_eq(&first, &again));
        Ok(())
    }

    #[test]
    fn binary_file_gets_info() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("blob.bin");
        fs::write(&path, [0u8, 1, 2, 3, 0, 0xff])?;

        let mut resolver = PreviewResolver::new(false, 0, 0);
        let Preview::File(result) = resolver.resolve_file(&path) else {
            panic!("expected file preview");
        };
        assert_eq!(result.kind, PreviewKind::Info);
        assert!(result.content.starts_with("blob.bin (6 bytes)"));
        Ok(())
    }

    #[test]
    fn errors_are_not_cached() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("later.txt");

        let mut resolver = PreviewResolver::new(false, 0, 0);
        assert!(matches!(resolver.resolve_file(&path), Preview::Error(_)));
        assert!(resolver.cache.get(&path).is_none());

        fs::write(&path, "now here")?;
        assert!(matches!(resolver.resolve_file(&path), Preview::File(_)));
        Ok(())
    }

    #[test]
    fn directory_mirror_goes_through_dir_cache() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let sub = dir.path().join("sub");
        fs::create_dir(&sub)?;
        fs::write(sub.join("a.txt"), "")?;
        fs::create_dir(sub.join("inner"))?;

        let mut resolver = PreviewResolver::new(false, 0, 0);
        let mut dirs = DirCache::new(8);
        let Preview::Directory(entries) = resolver.resolve(&sub, true, false, &mut dirs) else {
            panic!("expected directory preview");
        };
        let names: Vec<_> = entries.iter().map(|e| e.display_name()).collect();
        assert_eq!(names, ["inner/", "a.txt"]);
        assert!(dirs.has(&sub));
        Ok(())
    }

    #[test]
    fn inline_image_when_enabled_and_small() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("dot.png");
        RgbImage::from_pixel(4, 4, Rgb([200, 10, 10])).save(&path)?;

        let mut inline = PreviewResolver::new(true, 1 << 20, 0);
        let Preview::File(result) = inline.resolve_file(&path) else {
            panic!("expected file preview");
        };
        assert_eq!(result.kind, PreviewKind::Image);
        assert_eq!(result.mime, "image/png");
        assert!(result.inline.is_some());

        // too large for the inline budget: ascii art instead
        let mut capped = PreviewResolver::new(true, 1, 0);
        let Preview::File(result) = capped.resolve_file(&path) else {
            panic!("expected file preview");
        };
        assert_eq!(result.kind, PreviewKind::Image);
        assert!(result.inline.is_none());
        assert!(!result.content.is_empty());
        Ok(())
    }
}
