//! Core runtime logic for tfm.
//!
//! The non-UI pieces the navigation engine is built on:
//! - [fm]: directory listing, sorting and file metadata.
//! - [formatter]: width-aware text fitting and attribute/size/time formatting.
//! - [cache]: the bounded FIFO cache behind listings and previews.
//! - [sample]: file classification and text sampling for the preview.
//! - [image]: inline image escapes and the ASCII fallback.
//! - [proc]: running user commands through the shell.
//! - [worker]: background tasks and the messages they send back.
//! - [terminal]: terminal setup/teardown and the main crossterm/ratatui event loop.

pub mod cache;
pub mod fm;
pub mod formatter;
pub mod image;
pub mod proc;
pub mod sample;
pub mod terminal;
pub mod worker;

pub use cache::FifoCache;
pub use fm::{Entry, FileMeta, list_dir, max_dir_name_width, sort_entries};
pub use formatter::{
    display_width, fit_to_width, format_attributes, format_file_size, format_file_time,
    pad_to_width, sanitize_line, trim_to_width,
};
pub use sample::{PreviewKind, PreviewResult, sample_file};
pub use worker::{Message, Task, Workers};
