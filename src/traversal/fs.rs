//! Local filesystem binding.
//!
//! Plays the part the browser plays for a web client: [`FsEntry`] is what a
//! dropped path resolves to, [`pick_files`] is the discrete file picker and
//! [`pick_directory`] is the directory picker, which flattens the tree itself
//! and stamps each file with its relative path.
//!
//! Children of a directory are sorted by name so enumeration order is stable
//! across platforms. Symlinks to files are followed; symlinks to directories
//! are left out, which keeps every walk acyclic.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{traverse, DirectoryReader, Entry, EntryKind, TraversalError};
use crate::manifest::ManifestStore;
use crate::models::FileHandle;

/// A file or directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsEntry {
    path: PathBuf,
    name: String,
    kind: EntryKind,
    page_size: usize,
}

impl FsEntry {
    /// Resolve a path into an entry. Symlinks are followed.
    pub async fn from_path(
        path: impl Into<PathBuf>,
        page_size: usize,
    ) -> Result<Self, TraversalError> {
        let path = path.into();
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| TraversalError::resolution(path.display().to_string(), e))?;
        let name = entry_name(&path).await?;
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Ok(Self {
            path,
            name,
            kind,
            page_size: page_size.max(1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Entry for FsEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntryKind {
        self.kind
    }

    async fn file(&self) -> Result<FileHandle, TraversalError> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| TraversalError::resolution(self.path.display().to_string(), e))?;
        Ok(FileHandle::on_disk(
            self.name.clone(),
            metadata.len(),
            self.path.clone(),
        ))
    }

    fn create_reader(&self) -> Result<Box<dyn DirectoryReader>, TraversalError> {
        Ok(Box::new(FsDirectoryReader {
            path: self.path.clone(),
            page_size: self.page_size,
            remaining: None,
        }))
    }
}

/// Reads a directory once, then hands its children out a page at a time.
struct FsDirectoryReader {
    path: PathBuf,
    page_size: usize,
    remaining: Option<std::vec::IntoIter<FsEntry>>,
}

impl FsDirectoryReader {
    async fn load(&self) -> Result<Vec<FsEntry>, TraversalError> {
        let fail = |e| TraversalError::resolution(self.path.display().to_string(), e);

        let mut children = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.path).await.map_err(fail)?;
        while let Some(child) = dir.next_entry().await.map_err(fail)? {
            let path = child.path();
            let mut file_type = child.file_type().await.map_err(fail)?;
            if file_type.is_symlink() {
                match tokio::fs::metadata(&path).await {
                    Ok(target) if target.is_file() => file_type = target.file_type(),
                    Ok(_) => {
                        tracing::debug!(path = %path.display(), "Not following directory symlink");
                        continue;
                    }
                    // Listed as a file; resolving it fails and the walk records the skip.
                    Err(e) => {
                        tracing::debug!(path = %path.display(), error = %e, "Dangling symlink")
                    }
                }
            }
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            children.push(FsEntry {
                name: child.file_name().to_string_lossy().into_owned(),
                path,
                kind,
                page_size: self.page_size,
            });
        }
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }
}

#[async_trait]
impl DirectoryReader for FsDirectoryReader {
    async fn next_page(&mut self) -> Result<Vec<Box<dyn Entry>>, TraversalError> {
        if self.remaining.is_none() {
            self.remaining = Some(self.load().await?.into_iter());
        }
        let Some(remaining) = self.remaining.as_mut() else {
            return Ok(Vec::new());
        };
        Ok(remaining
            .by_ref()
            .take(self.page_size)
            .map(|entry| Box::new(entry) as Box<dyn Entry>)
            .collect())
    }
}

/// Discrete file picker: one handle per path, no relative path attached.
pub async fn pick_files(paths: &[PathBuf]) -> Result<Vec<FileHandle>, TraversalError> {
    let mut handles = Vec::with_capacity(paths.len());
    for path in paths {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| TraversalError::resolution(path.display().to_string(), e))?;
        if metadata.is_dir() {
            return Err(TraversalError::resolution(
                path.display().to_string(),
                std::io::Error::new(std::io::ErrorKind::Other, "expected a file, found a directory"),
            ));
        }
        let name = entry_name(path).await?;
        handles.push(FileHandle::on_disk(name, metadata.len(), path.clone()));
    }
    Ok(handles)
}

/// Directory picker: every file below `dir`, each carrying a relative path
/// that starts with the directory's own name.
///
/// Unreadable subtrees are logged and left out, the way a browser silently
/// omits what it cannot list.
pub async fn pick_directory(
    dir: impl Into<PathBuf>,
    page_size: usize,
) -> Result<Vec<FileHandle>, TraversalError> {
    let entry = FsEntry::from_path(dir, page_size).await?;
    if entry.kind() != EntryKind::Directory {
        return Err(TraversalError::resolution(
            entry.path().display().to_string(),
            std::io::Error::new(std::io::ErrorKind::Other, "expected a directory"),
        ));
    }

    let mut flattened = ManifestStore::new();
    let report = traverse(&entry, "", &mut flattened).await;
    for skipped in &report.skipped {
        tracing::warn!(error = %skipped, "Directory picker left out an entry");
    }

    Ok(flattened
        .snapshot()
        .iter()
        .map(|item| item.content.clone().with_relative_path(item.relative_path.clone()))
        .collect())
}

/// The last path component, canonicalizing first for paths like `.` or `dir/..`.
async fn entry_name(path: &Path) -> Result<String, TraversalError> {
    if let Some(name) = path.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }
    let canonical = tokio::fs::canonicalize(path)
        .await
        .map_err(|e| TraversalError::resolution(path.display().to_string(), e))?;
    canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or(TraversalError::UnnamedEntry)
}
