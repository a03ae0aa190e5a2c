use std::path::PathBuf;

/// Where a file's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Read from disk when the submission is built.
    Disk(PathBuf),
    /// Already held in memory.
    Memory(Vec<u8>),
}

/// Opaque handle to a selected file.
///
/// Mirrors what a browser hands out for a picked or dropped file: a leaf name,
/// a size, and optionally a relative path the platform computed itself (the
/// directory picker does this). The content is not read until submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub size: u64,
    /// Relative path supplied by the platform, if any (e.g. `photos/2024/a.jpg`).
    pub platform_relative_path: Option<String>,
    pub source: FileSource,
}

impl FileHandle {
    /// A handle backed by a file on disk.
    pub fn on_disk(name: impl Into<String>, size: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            size,
            platform_relative_path: None,
            source: FileSource::Disk(path.into()),
        }
    }

    /// A handle whose bytes are already in memory.
    pub fn in_memory(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: content.len() as u64,
            platform_relative_path: None,
            source: FileSource::Memory(content),
        }
    }

    pub fn with_relative_path(mut self, path: impl Into<String>) -> Self {
        self.platform_relative_path = Some(path.into());
        self
    }

    /// The platform-supplied relative path when present and non-empty, else the bare name.
    pub fn flat_relative_path(&self) -> String {
        match self.platform_relative_path.as_deref() {
            Some(rel) if !rel.is_empty() => rel.to_string(),
            _ => self.name.clone(),
        }
    }

    /// Load the file's bytes.
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Disk(path) => tokio::fs::read(path).await,
            FileSource::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

/// One selected file and the relative path it will be submitted under.
///
/// `relative_path` is `/`-separated, never empty, and never carries an
/// absolute prefix from the source filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub content: FileHandle,
    pub relative_path: String,
}

impl ManifestItem {
    pub fn new(content: FileHandle, relative_path: impl Into<String>) -> Self {
        Self {
            content,
            relative_path: relative_path.into(),
        }
    }

    /// Size in kilobytes, as shown next to each selected item.
    pub fn size_kb(&self) -> f64 {
        self.content.size as f64 / 1024.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_path_prefers_platform_path() {
        let handle = FileHandle::in_memory("b.txt", "x").with_relative_path("docs/sub/b.txt");
        assert_eq!(handle.flat_relative_path(), "docs/sub/b.txt");
    }

    #[test]
    fn flat_path_falls_back_to_name_when_platform_path_is_blank() {
        let handle = FileHandle::in_memory("b.txt", "x").with_relative_path("");
        assert_eq!(handle.flat_relative_path(), "b.txt");

        let handle = FileHandle::in_memory("c.txt", "x");
        assert_eq!(handle.flat_relative_path(), "c.txt");
    }

    #[test]
    fn in_memory_handle_reports_its_size() {
        let item = ManifestItem::new(FileHandle::in_memory("a.bin", vec![0u8; 2048]), "a.bin");
        assert_eq!(item.content.size, 2048);
        assert!((item.size_kb() - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn reads_memory_content() {
        let handle = FileHandle::in_memory("a.txt", "hello");
        assert_eq!(handle.read().await.unwrap(), b"hello");
    }
}
