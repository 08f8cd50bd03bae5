//! Directory listing logic for tfm.
//!
//! Provides the [Entry] struct which is used throughout tfm and [list_dir],
//! the single place where a directory is read, filtered and sorted.
//! Also holds [FileMeta] which backs the info preview and the status line.

use crate::core::formatter::{display_width, format_attributes};

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Leading byte that marks an entry as hidden.
pub const HIDDEN_MARKER: u8 = b'.';

/// A single entry in a directory listing.
///
/// Entries are produced by [list_dir] and never mutated afterwards: a refresh
/// builds a new listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: Box<OsStr>,
    is_dir: bool,
}

impl Entry {
    pub fn new(name: impl Into<OsString>, is_dir: bool) -> Self {
        Entry {
            name: name.into().into_boxed_os_str(),
            is_dir,
        }
    }

    #[inline]
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    #[inline]
    pub fn name_str(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.name.as_encoded_bytes().first() == Some(&HIDDEN_MARKER)
    }

    /// Name as shown in a column: directories carry a trailing slash.
    pub fn display_name(&self) -> String {
        let mut name = self.name_str().into_owned();
        if self.is_dir {
            name.push('/');
        }
        name
    }
}

/// Reads `path`, drops hidden entries unless `show_hidden` is set and sorts
/// directories before files, each group by name.
pub fn list_dir(path: &Path, show_hidden: bool) -> io::Result<Vec<Entry>> {
    let mut entries = Vec::with_capacity(64);

    for entry in fs::read_dir(path)? {
        let Ok(entry) = entry else {
            continue;
        };
        let name = entry.file_name();
        if !show_hidden && name.as_encoded_bytes().first() == Some(&HIDDEN_MARKER) {
            continue;
        }
        let Ok(ft) = entry.file_type() else {
            continue;
        };

        // symlinks count as directories when their target is one
        let is_dir = if ft.is_symlink() {
            fs::metadata(entry.path()).is_ok_and(|md| md.is_dir())
        } else {
            ft.is_dir()
        };
        entries.push(Entry::new(name, is_dir));
    }

    sort_entries(&mut entries);
    Ok(entries)
}

/// Directories first, then lexicographic by name inside each group.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
}

/// Widest directory name in display cells, counting the trailing slash.
/// Zero when the listing holds no directories.
pub fn max_dir_name_width(entries: &[Entry]) -> usize {
    entries
        .iter()
        .filter(|e| e.is_dir())
        .map(|e| display_width(&e.name_str()) + 1)
        .max()
        .unwrap_or(0)
}

/// Metadata summary of a path, as shown by the info preview and status line.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMeta {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub mode: String,
    pub modified: Option<SystemTime>,
}

impl FileMeta {
    pub fn stat(path: &Path) -> io::Result<FileMeta> {
        let md = fs::metadata(path)?;
        Ok(FileMeta {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned()),
            is_dir: md.is_dir(),
            size: md.len(),
            mode: format_attributes(&md),
            modified: md.modified().ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn list_dir_sorts_dirs_first_and_hides_dotfiles() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("Bdir"))?;
        fs::create_dir(dir.path().join("Adir"))?;
        File::create(dir.path().join("z.txt"))?;
        File::create(dir.path().join("a.txt"))?;
        File::create(dir.path().join(".hidden"))?;

        let entries = list_dir(dir.path(), false)?;
        let names: Vec<_> = entries.iter().map(|e| e.name_str().into_owned()).collect();
        assert_eq!(names, vec!["Adir", "Bdir", "a.txt", "z.txt"]);

        let all = list_dir(dir.path(), true)?;
        assert_eq!(all.len(), 5);
        assert!(all.iter().any(|e| e.is_hidden()));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_dir_is_listed_as_dir() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("real"))?;
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link"))?;

        let entries = list_dir(dir.path(), false)?;
        assert!(entries.iter().all(|e| e.is_dir()));
        Ok(())
    }

    #[test]
    fn max_dir_name_width_counts_slash() {
        let entries = vec![
            Entry::new("src", true),
            Entry::new("a_very_long_file_name.rs", false),
            Entry::new("target", true),
        ];
        assert_eq!(max_dir_name_width(&entries), 7);
        assert_eq!(max_dir_name_width(&[Entry::new("f", false)]), 0);
    }

    #[test]
    fn list_dir_nonexistent_errors() {
        let path = PathBuf::from("/path/does/not/exist");
        assert!(list_dir(&path, false).is_err());
    }

    #[test]
    fn file_meta_reports_size() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("hello.txt");
        fs::write(&path, "abc123")?;

        let meta = FileMeta::stat(&path)?;
        assert_eq!(meta.name, "hello.txt");
        assert_eq!(meta.size, 6);
        assert!(!meta.is_dir);
        Ok(())
    }
}
