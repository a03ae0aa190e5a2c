//! Normalization of the different ways files get selected.
//!
//! Every input source ends up as [`ManifestStore::append`] calls:
//! - picked files and directory-picker files are already flat and are appended
//!   directly with their platform path or bare name;
//! - dropped entries go through the traversal engine with an empty prefix;
//! - dropped files the platform could not expose as an entry are appended flat.
//!
//! Items are appended in arrival order. Nothing is deduplicated.

use std::path::PathBuf;

use crate::manifest::ManifestStore;
use crate::models::FileHandle;
use crate::traversal::fs::{pick_directory, FsEntry};
use crate::traversal::{self, Entry, TraversalReport};

/// One unit of user input.
pub enum Selection {
    /// Files chosen with the discrete file picker.
    DiscretePick(Vec<FileHandle>),
    /// Files chosen with the directory picker, already flattened by the platform.
    DirectoryPick(Vec<FileHandle>),
    /// A dropped item exposed as a file or directory entry.
    DropEntry(Box<dyn Entry>),
    /// A dropped file with no entry available.
    DropFlatFile(FileHandle),
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DiscretePick(files) => f.debug_tuple("DiscretePick").field(&files.len()).finish(),
            Self::DirectoryPick(files) => {
                f.debug_tuple("DirectoryPick").field(&files.len()).finish()
            }
            Self::DropEntry(entry) => f.debug_tuple("DropEntry").field(&entry.name()).finish(),
            Self::DropFlatFile(file) => f.debug_tuple("DropFlatFile").field(&file.name).finish(),
        }
    }
}

/// Apply one selection to the store.
pub async fn apply(store: &mut ManifestStore, selection: Selection) -> TraversalReport {
    tracing::debug!(?selection, "Applying selection");
    match selection {
        Selection::DiscretePick(files) | Selection::DirectoryPick(files) => {
            append_flat(store, files)
        }
        Selection::DropFlatFile(file) => append_flat(store, vec![file]),
        Selection::DropEntry(entry) => traversal::traverse(entry.as_ref(), "", store).await,
    }
}

/// Apply a batch in order, e.g. every item of a single drop.
///
/// Each selection is finished before the next one starts.
pub async fn apply_all(
    store: &mut ManifestStore,
    selections: impl IntoIterator<Item = Selection>,
) -> TraversalReport {
    let mut report = TraversalReport::default();
    for selection in selections {
        report.merge(apply(store, selection).await);
    }
    if !report.skipped.is_empty() {
        tracing::warn!(skipped = report.skipped.len(), "Some dropped entries could not be read");
    }
    report
}

/// A local path handed over by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalInput {
    /// Treated like a dropped item: directories are walked.
    Drop(PathBuf),
    /// Treated like a folder-picker choice.
    Folder(PathBuf),
}

/// Resolve local paths and apply them one after another, in the given order.
///
/// A path that cannot be resolved is reported in the returned skips and the
/// remaining inputs are still applied.
pub async fn apply_local(
    store: &mut ManifestStore,
    inputs: impl IntoIterator<Item = LocalInput>,
    page_size: usize,
) -> TraversalReport {
    let mut report = TraversalReport::default();
    for input in inputs {
        let selection = match input {
            LocalInput::Drop(path) => match FsEntry::from_path(&path, page_size).await {
                Ok(entry) => Selection::DropEntry(Box::new(entry)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping dropped path");
                    report.skipped.push(e);
                    continue;
                }
            },
            LocalInput::Folder(path) => match pick_directory(&path, page_size).await {
                Ok(files) => Selection::DirectoryPick(files),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping folder");
                    report.skipped.push(e);
                    continue;
                }
            },
        };
        report.merge(apply(store, selection).await);
    }
    report
}

fn append_flat(store: &mut ManifestStore, files: Vec<FileHandle>) -> TraversalReport {
    let mut report = TraversalReport::default();
    for file in files {
        let relative_path = file.flat_relative_path();
        if relative_path.is_empty() {
            tracing::warn!("Skipping picked file without a name");
            report.skipped.push(traversal::TraversalError::UnnamedEntry);
            continue;
        }
        store.append(file, relative_path);
        report.files += 1;
    }
    report
}
