//! Error types for tfm.
//!
//! Fallible filesystem and config operations return [`Result<T>`]. Inside the
//! event loop these errors are never propagated: they are turned into a
//! display string on the state and shown in the status row.

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("config error: {0}")]
    Config(String),

    #[error("command failed: {0}")]
    Command(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Classifies an I/O error raised while touching `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Error::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotADirectory => Error::NotADirectory(path.to_path_buf()),
            _ => Error::Io(err),
        }
    }
}
