//! Flattening of dropped file/directory trees into manifest items.
//!
//! A dropped item is exposed as an [`Entry`]: either a file whose handle can be
//! resolved, or a directory whose children are read through a paginated
//! [`DirectoryReader`]. A single page is never assumed to hold every child; a
//! directory is finished only once its reader hands back an empty page.
//!
//! The walk is depth-first and page-by-page, so manifest order equals discovery
//! order. Directory depth is unbounded: the engine keeps an explicit stack of
//! [`TraversalCursor`]s rather than recursing. Entries that cannot be read are
//! skipped (with their subtree) and reported, and the rest of the walk goes on.
//!
//! Bindings:
//! - [`fs`]: local filesystem paths
//! - [`memory`]: in-memory trees

pub mod fs;
pub mod memory;

use std::collections::VecDeque;

use async_trait::async_trait;
use thiserror::Error;

use crate::manifest::ManifestStore;
use crate::models::FileHandle;

/// Errors raised while resolving entries.
#[derive(Debug, Error)]
pub enum TraversalError {
    #[error("could not read entry '{path}': {source}")]
    EntryResolutionFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("entry has no usable name")]
    UnnamedEntry,
}

impl TraversalError {
    pub fn resolution(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::EntryResolutionFailed {
            path: path.into(),
            source,
        }
    }
}

/// Whether an entry is a leaf or has children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A node of a dropped tree.
#[async_trait]
pub trait Entry: Send + Sync {
    /// The entry's own name, without any parent segments.
    fn name(&self) -> &str;

    fn kind(&self) -> EntryKind;

    /// Resolve the file handle. Only meaningful for [`EntryKind::File`].
    async fn file(&self) -> Result<FileHandle, TraversalError>;

    /// Open a reader over the children. Only meaningful for [`EntryKind::Directory`].
    fn create_reader(&self) -> Result<Box<dyn DirectoryReader>, TraversalError>;
}

/// Paginated access to a directory's children.
#[async_trait]
pub trait DirectoryReader: Send {
    /// The next batch of children. An empty page means the directory is exhausted.
    async fn next_page(&mut self) -> Result<Vec<Box<dyn Entry>>, TraversalError>;
}

/// What a walk contributed.
#[derive(Debug, Default)]
pub struct TraversalReport {
    /// Files appended to the manifest.
    pub files: usize,
    /// Directories visited, including empty ones.
    pub directories: usize,
    /// Pages requested from directory readers.
    pub pages: usize,
    /// Branches that were dropped because an entry could not be read.
    pub skipped: Vec<TraversalError>,
}

impl TraversalReport {
    pub fn merge(&mut self, other: TraversalReport) {
        self.files += other.files;
        self.directories += other.directories;
        self.pages += other.pages;
        self.skipped.extend(other.skipped);
    }
}

/// An in-progress walk of one directory.
struct TraversalCursor {
    /// Relative path of the directory itself; children are joined onto it.
    prefix: String,
    reader: Box<dyn DirectoryReader>,
    pending: VecDeque<Box<dyn Entry>>,
    /// Size of the most recent page, `None` before the first request.
    last_page_len: Option<usize>,
}

impl TraversalCursor {
    fn exhausted(&self) -> bool {
        self.pending.is_empty() && self.last_page_len == Some(0)
    }
}

/// Walk `entry` and append every file beneath it to `store`.
///
/// `path_prefix` is the relative path of the entry's parent; it is empty for
/// top-level dropped entries.
pub async fn traverse(
    entry: &dyn Entry,
    path_prefix: &str,
    store: &mut ManifestStore,
) -> TraversalReport {
    let mut report = TraversalReport::default();
    let mut stack: Vec<TraversalCursor> = Vec::new();

    visit(entry, path_prefix, &mut stack, store, &mut report).await;

    loop {
        let Some(cursor) = stack.last_mut() else {
            break;
        };

        if let Some(child) = cursor.pending.pop_front() {
            let prefix = cursor.prefix.clone();
            visit(child.as_ref(), &prefix, &mut stack, store, &mut report).await;
            continue;
        }

        if cursor.exhausted() {
            stack.pop();
            continue;
        }

        match cursor.reader.next_page().await {
            Ok(page) => {
                report.pages += 1;
                tracing::debug!(directory = %cursor.prefix, entries = page.len(), "Read directory page");
                cursor.last_page_len = Some(page.len());
                cursor.pending.extend(page);
            }
            Err(e) => {
                tracing::warn!(directory = %cursor.prefix, error = %e, "Skipping rest of directory");
                report.skipped.push(e);
                stack.pop();
            }
        }
    }

    report
}

/// Handle one entry: append it if it is a file, open a cursor if it is a directory.
async fn visit(
    entry: &dyn Entry,
    prefix: &str,
    stack: &mut Vec<TraversalCursor>,
    store: &mut ManifestStore,
    report: &mut TraversalReport,
) {
    match entry.kind() {
        EntryKind::File => match entry.file().await {
            Ok(handle) => {
                let relative_path = if prefix.is_empty() {
                    handle.flat_relative_path()
                } else {
                    join(prefix, &handle.name)
                };
                if relative_path.is_empty() || handle.name.is_empty() {
                    tracing::warn!(prefix, "Skipping file without a name");
                    report.skipped.push(TraversalError::UnnamedEntry);
                    return;
                }
                store.append(handle, relative_path);
                report.files += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable file");
                report.skipped.push(e);
            }
        },
        EntryKind::Directory => {
            if entry.name().is_empty() {
                tracing::warn!(prefix, "Skipping directory without a name");
                report.skipped.push(TraversalError::UnnamedEntry);
                return;
            }
            let dir_path = join(prefix, entry.name());
            match entry.create_reader() {
                Ok(reader) => {
                    report.directories += 1;
                    stack.push(TraversalCursor {
                        prefix: dir_path,
                        reader,
                        pending: VecDeque::new(),
                        last_page_len: None,
                    });
                }
                Err(e) => {
                    tracing::warn!(directory = %dir_path, error = %e, "Skipping unreadable directory");
                    report.skipped.push(e);
                }
            }
        }
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}
