//! Evidence document storage
//!
//! Documents land on the local filesystem under a configured uploads
//! directory. Stored names are derived, never the raw upload name, so a
//! hostile filename cannot escape the directory.

use crate::{error::AppError, models::activity::DocumentUpload};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

pub struct DocumentStore {
    root: PathBuf,
}

/// Keep only characters that are safe in a filename.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn ensure_root(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create uploads dir: {}", e)))?;
        Ok(())
    }

    /// Decode and write an uploaded document. Returns the stored filename,
    /// which is what the documents table records.
    pub async fn store(
        &self,
        asset_id: Uuid,
        upload: &DocumentUpload,
    ) -> Result<String, AppError> {
        let content = BASE64
            .decode(upload.content.as_bytes())
            .map_err(|_| AppError::BadRequest("Document content is not valid base64".to_string()))?;
        if content.is_empty() {
            return Err(AppError::BadRequest("Document content is empty".to_string()));
        }

        let stored_name = format!(
            "{}_{}_{}",
            asset_id,
            Utc::now().timestamp(),
            sanitize_filename(&upload.file_name)
        );
        let path = self.root.join(&stored_name);
        tokio::fs::write(&path, &content)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write document: {}", e)))?;

        debug!(asset_id = %asset_id, stored_name = %stored_name, "Stored evidence document");
        Ok(stored_name)
    }

    /// Read a stored document back for download.
    pub async fn load(&self, stored_name: &str) -> Result<Vec<u8>, AppError> {
        // Stored names are generated by us; reject anything that looks
        // like a path.
        if stored_name.contains('/') || stored_name.contains('\\') || stored_name.contains("..") {
            return Err(AppError::NotFound);
        }
        let path = self.root.join(stored_name);
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound
            } else {
                AppError::Storage(format!("Failed to read document: {}", e))
            }
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_strips_path_characters() {
        assert_eq!(sanitize_filename("police report.pdf"), "police_report.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_filename("..."), "document");
    }

    #[tokio::test]
    async fn test_store_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("ict-uploads-{}", Uuid::new_v4()));
        let store = DocumentStore::new(&dir);
        store.ensure_root().await.unwrap();

        let upload = DocumentUpload {
            file_name: "report.pdf".to_string(),
            content: BASE64.encode(b"evidence"),
        };
        let asset_id = Uuid::new_v4();
        let stored = store.store(asset_id, &upload).await.unwrap();
        assert!(stored.starts_with(&asset_id.to_string()));
        assert!(stored.ends_with("report.pdf"));

        let bytes = store.load(&stored).await.unwrap();
        assert_eq!(bytes, b"evidence");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_rejects_path_traversal() {
        let store = DocumentStore::new("/tmp");
        assert!(matches!(
            store.load("../etc/passwd").await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_store_rejects_invalid_base64() {
        let dir = std::env::temp_dir().join(format!("ict-uploads-{}", Uuid::new_v4()));
        let store = DocumentStore::new(&dir);
        store.ensure_root().await.unwrap();

        let upload = DocumentUpload {
            file_name: "x.pdf".to_string(),
            content: "not base64!!!".to_string(),
        };
        assert!(store.store(Uuid::new_v4(), &upload).await.is_err());
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
