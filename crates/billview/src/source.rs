//! Where document bytes come from.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::ViewerError;

/// Fetches the bytes behind a document URL.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ViewerError::DocumentLoad`] when the document cannot be read.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ViewerError>;
}

/// Reads local paths and `file://` URLs.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    root: Option<PathBuf>,
}

impl FileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ViewerError> {
        let path = self.resolve(url);
        tokio::fs::read(&path)
            .await
            .map_err(|e| ViewerError::DocumentLoad(format!("{}: {e}", path.display())))
    }
}

/// In-memory documents keyed by URL.
#[derive(Debug, Default)]
pub struct MemorySource {
    documents: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert for setting up a source before sharing it.
    pub fn with(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.documents.get_mut().insert(url.into(), bytes.into());
        self
    }

    pub async fn insert(&self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.documents.write().await.insert(url.into(), bytes.into());
    }

    pub async fn remove(&self, url: &str) -> Option<Vec<u8>> {
        self.documents.write().await.remove(url)
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ViewerError> {
        self.documents
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| ViewerError::DocumentLoad(format!("{url}: not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_source_round_trip() {
        let source = MemorySource::new();
        source.insert("mem://bill.txt", b"Invoice".to_vec()).await;
        assert_eq!(source.fetch("mem://bill.txt").await.unwrap(), b"Invoice");
        assert!(source.remove("mem://bill.txt").await.is_some());
        let err = source.fetch("mem://bill.txt").await.unwrap_err();
        assert!(matches!(err, ViewerError::DocumentLoad(_)));
    }

    #[tokio::test]
    async fn file_source_reads_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bill.txt");
        tokio::fs::write(&path, b"Total 42").await.unwrap();

        let source = FileSource::new();
        let url = format!("file://{}", path.display());
        assert_eq!(source.fetch(&url).await.unwrap(), b"Total 42");

        let rooted = FileSource::with_root(dir.path());
        assert_eq!(rooted.fetch("bill.txt").await.unwrap(), b"Total 42");
    }

    #[tokio::test]
    async fn file_source_missing_file() {
        let err = FileSource::new()
            .fetch("/definitely/not/here.pdf")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not/here.pdf"));
    }
}
