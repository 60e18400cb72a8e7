use async_trait::async_trait;
use mimic_core::{Error, Result};

use crate::builtin::BUILTIN_LOCATION;
use crate::handler::DictionarySource;

/// Word list on the local filesystem, `file:path` or a bare path.
pub struct FileSource;

impl FileSource {
    fn path(location: &str) -> &str {
        location.strip_prefix("file:").unwrap_or(location).trim()
    }
}

#[async_trait]
impl DictionarySource for FileSource {
    fn can_handle(&self, location: &str) -> bool {
        if location.starts_with("file:") {
            return true;
        }
        !location.trim().is_empty()
            && !location.contains("://")
            && !location.starts_with(BUILTIN_LOCATION)
    }

    async fn load(&self, location: &str) -> Result<String> {
        let path = Self::path(location);
        tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Other(anyhow::anyhow!("Failed to read word list {}: {}", path, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_can_handle() {
        let source = FileSource;
        assert!(source.can_handle("file:/tmp/words.txt"));
        assert!(source.can_handle("words.txt"));
        assert!(!source.can_handle("https://example.com/words.txt"));
        assert!(!source.can_handle("builtin:"));
        assert!(!source.can_handle("  "));
    }

    #[tokio::test]
    async fn test_load_with_and_without_prefix() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "alpha\nbeta").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let source = FileSource;
        assert_eq!(source.load(&path).await.unwrap(), "alpha\nbeta\n");
        assert_eq!(
            source.load(&format!("file:{}", path)).await.unwrap(),
            "alpha\nbeta\n"
        );
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = FileSource;
        let err = source.load("file:/definitely/not/here.txt").await.unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }
}
