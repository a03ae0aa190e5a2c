//! In-memory entry trees.
//!
//! Useful for embedding the engine where files already live in memory, and for
//! exercising pagination and failure paths deterministically.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::{DirectoryReader, Entry, EntryKind, TraversalError};
use crate::models::FileHandle;

const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct MemoryEntry {
    name: String,
    node: MemoryNode,
}

#[derive(Debug, Clone)]
enum MemoryNode {
    File {
        content: Vec<u8>,
        relative_path: Option<String>,
    },
    Directory {
        children: Vec<MemoryEntry>,
        page_size: usize,
        page_requests: Arc<AtomicUsize>,
        /// Pages served before the reader starts failing.
        fail_after: Option<usize>,
    },
    /// Fails whenever it is resolved or opened.
    Broken(EntryKind),
}

impl MemoryEntry {
    pub fn file(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            node: MemoryNode::File {
                content: content.into(),
                relative_path: None,
            },
        }
    }

    pub fn dir(name: impl Into<String>, children: Vec<MemoryEntry>) -> Self {
        Self {
            name: name.into(),
            node: MemoryNode::Directory {
                children,
                page_size: DEFAULT_PAGE_SIZE,
                page_requests: Arc::new(AtomicUsize::new(0)),
                fail_after: None,
            },
        }
    }

    pub fn broken_file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node: MemoryNode::Broken(EntryKind::File),
        }
    }

    pub fn broken_dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node: MemoryNode::Broken(EntryKind::Directory),
        }
    }

    /// Limit how many children a directory hands out per page (minimum 1).
    pub fn with_page_size(mut self, size: usize) -> Self {
        if let MemoryNode::Directory { page_size, .. } = &mut self.node {
            *page_size = size.max(1);
        }
        self
    }

    /// Make the directory's reader fail once it has served `pages` pages.
    pub fn failing_after(mut self, pages: usize) -> Self {
        if let MemoryNode::Directory { fail_after, .. } = &mut self.node {
            *fail_after = Some(pages);
        }
        self
    }

    /// Attach a platform-computed relative path to a file.
    pub fn with_relative_path(mut self, path: impl Into<String>) -> Self {
        if let MemoryNode::File { relative_path, .. } = &mut self.node {
            *relative_path = Some(path.into());
        }
        self
    }

    /// How many pages have been requested from readers of this directory.
    pub fn page_requests(&self) -> usize {
        match &self.node {
            MemoryNode::Directory { page_requests, .. } => page_requests.load(Ordering::SeqCst),
            _ => 0,
        }
    }

    fn unreadable(&self) -> TraversalError {
        TraversalError::resolution(
            self.name.clone(),
            io::Error::new(io::ErrorKind::PermissionDenied, "entry is not readable"),
        )
    }
}

#[async_trait]
impl Entry for MemoryEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntryKind {
        match &self.node {
            MemoryNode::File { .. } => EntryKind::File,
            MemoryNode::Directory { .. } => EntryKind::Directory,
            MemoryNode::Broken(kind) => *kind,
        }
    }

    async fn file(&self) -> Result<FileHandle, TraversalError> {
        match &self.node {
            MemoryNode::File {
                content,
                relative_path,
            } => {
                let handle = FileHandle::in_memory(self.name.clone(), content.clone());
                Ok(match relative_path {
                    Some(path) => handle.with_relative_path(path.clone()),
                    None => handle,
                })
            }
            MemoryNode::Directory { .. } => Err(TraversalError::resolution(
                self.name.clone(),
                io::Error::new(io::ErrorKind::Other, "entry is a directory"),
            )),
            MemoryNode::Broken(_) => Err(self.unreadable()),
        }
    }

    fn create_reader(&self) -> Result<Box<dyn DirectoryReader>, TraversalError> {
        match &self.node {
            MemoryNode::Directory {
                children,
                page_size,
                page_requests,
                fail_after,
            } => Ok(Box::new(MemoryDirectoryReader {
                name: self.name.clone(),
                children: children.clone().into_iter(),
                page_size: *page_size,
                page_requests: Arc::clone(page_requests),
                served: 0,
                fail_after: *fail_after,
            })),
            MemoryNode::File { .. } => Err(TraversalError::resolution(
                self.name.clone(),
                io::Error::new(io::ErrorKind::Other, "entry is not a directory"),
            )),
            MemoryNode::Broken(_) => Err(self.unreadable()),
        }
    }
}

struct MemoryDirectoryReader {
    name: String,
    children: std::vec::IntoIter<MemoryEntry>,
    page_size: usize,
    page_requests: Arc<AtomicUsize>,
    served: usize,
    fail_after: Option<usize>,
}

#[async_trait]
impl DirectoryReader for MemoryDirectoryReader {
    async fn next_page(&mut self) -> Result<Vec<Box<dyn Entry>>, TraversalError> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| self.served >= limit) {
            return Err(TraversalError::resolution(
                self.name.clone(),
                io::Error::new(io::ErrorKind::Interrupted, "directory listing failed"),
            ));
        }
        self.served += 1;
        Ok(self
            .children
            .by_ref()
            .take(self.page_size)
            .map(|child| Box::new(child) as Box<dyn Entry>)
            .collect())
    }
}
