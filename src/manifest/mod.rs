//! The ordered list of selected files.
//!
//! [`ManifestStore`] is the single owner of the selection. Every consumer
//! (traversal, rendering, submission) goes through it, and it only changes via
//! [`ManifestStore::append`], [`ManifestStore::remove_at`] and
//! [`ManifestStore::clear`]. Content and path travel together in one
//! [`ManifestItem`], so the two submitted field sequences cannot drift apart.

use thiserror::Error;

use crate::models::{FileHandle, ManifestItem};

/// Manifest mutation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("index {index} is out of range for a manifest of {len} items")]
    OutOfRange { index: usize, len: usize },
}

/// Ordered, index-addressable selection of files.
///
/// Identity is positional. Duplicates by path or by content are allowed.
#[derive(Debug, Default, Clone)]
pub struct ManifestStore {
    items: Vec<ManifestItem>,
}

impl ManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item at the end.
    pub fn append(&mut self, content: FileHandle, relative_path: impl Into<String>) {
        let item = ManifestItem::new(content, relative_path);
        tracing::debug!(index = self.items.len(), path = %item.relative_path, "Appended manifest item");
        self.items.push(item);
    }

    /// Remove the item at `index`, shifting later items down by one.
    ///
    /// Indices held by callers are invalid after this returns and must be
    /// re-read from a fresh [`snapshot`](Self::snapshot).
    pub fn remove_at(&mut self, index: usize) -> Result<ManifestItem, ManifestError> {
        if index >= self.items.len() {
            return Err(ManifestError::OutOfRange {
                index,
                len: self.items.len(),
            });
        }
        let item = self.items.remove(index);
        tracing::debug!(index, path = %item.relative_path, "Removed manifest item");
        Ok(item)
    }

    pub fn clear(&mut self) {
        tracing::debug!(count = self.items.len(), "Cleared manifest");
        self.items.clear();
    }

    /// Read-only view of the current selection, in order.
    pub fn snapshot(&self) -> &[ManifestItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
