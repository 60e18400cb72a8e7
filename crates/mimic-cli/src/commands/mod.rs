pub mod config;
pub mod detect;
pub mod redact;

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

/// Read the whole input from `path`, or stdin when it is absent or `-`.
pub async fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        std::fs::write(&path, "{\"a\":1}").unwrap();
        assert_eq!(read_input(Some(&path)).await.unwrap(), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_missing_file_names_path() {
        let err = read_input(Some(Path::new("/no/such/input.txt"))).await.unwrap_err();
        assert!(err.to_string().contains("/no/such/input.txt"));
    }
}
