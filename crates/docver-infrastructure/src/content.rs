//! File-backed payload for the new version.

use async_trait::async_trait;
use docver_core::config::ContentConfig;
use docver_core::document::DocumentContent;
use docver_core::error::{DocverError, Result};
use docver_core::gateway::ContentProvider;
use std::path::PathBuf;

/// Reads the check-in payload from disk each time it is requested.
#[derive(Debug, Clone)]
pub struct FileContentProvider {
    path: PathBuf,
    file_name: String,
    mime_type: String,
}

impl FileContentProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let mime_type = infer_mime_type(&file_name);
        Self {
            path,
            file_name,
            mime_type,
        }
    }

    pub fn from_config(config: &ContentConfig) -> Self {
        let mut provider = Self::new(config.path.clone());
        if let Some(file_name) = &config.file_name {
            provider.file_name = file_name.clone();
        }
        if let Some(mime_type) = &config.mime_type {
            provider.mime_type = mime_type.clone();
        }
        provider
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

/// Infers the MIME type from a filename extension using the `mime_guess` library.
fn infer_mime_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string()
}

#[async_trait]
impl ContentProvider for FileContentProvider {
    async fn load(&self) -> Result<DocumentContent> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            DocverError::io(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        if bytes.is_empty() {
            return Err(DocverError::io(format!(
                "{} is empty, refusing to check in an empty version",
                self.path.display()
            )));
        }

        tracing::debug!(
            "[Content] Loaded {} ({} bytes, {})",
            self.path.display(),
            bytes.len(),
            self.mime_type
        );
        Ok(DocumentContent {
            file_name: self.file_name.clone(),
            mime_type: self.mime_type.clone(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_reads_file_and_guesses_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contract.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let provider = FileContentProvider::new(&path);
        let content = provider.load().await.unwrap();

        assert_eq!(content.file_name, "contract.pdf");
        assert_eq!(content.mime_type, "application/pdf");
        assert_eq!(content.bytes, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_config_overrides_name_and_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        std::fs::write(&path, b"data").unwrap();
        let config = ContentConfig {
            path,
            mime_type: Some("application/pdf".into()),
            file_name: Some("renamed.pdf".into()),
        };

        let content = FileContentProvider::from_config(&config).load().await.unwrap();

        assert_eq!(content.file_name, "renamed.pdf");
        assert_eq!(content.mime_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_unknown_extension_is_octet_stream() {
        let provider = FileContentProvider::new("/tmp/payload.zzunknown");
        assert_eq!(provider.mime_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let provider = FileContentProvider::new(dir.path().join("absent.pdf"));

        let err = provider.load().await.unwrap_err();

        assert!(matches!(err, DocverError::Io { .. }));
        assert!(err.to_string().contains("absent.pdf"));
    }

    #[tokio::test]
    async fn test_empty_file_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        std::fs::write(&path, b"").unwrap();

        let err = FileContentProvider::new(&path).load().await.unwrap_err();

        assert!(err.to_string().contains("empty"));
    }
}
