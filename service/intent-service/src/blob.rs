use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("document '{name}' not found")]
    NotFound { name: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Seam to the document blob storage collaborator.
pub trait BlobFetcher: Send + Sync {
    fn fetch_bytes(&self, name: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetches document bytes from a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsBlobFetcher {
    root: PathBuf,
}

impl FsBlobFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BlobFetcher for FsBlobFetcher {
    fn fetch_bytes(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.root.join(name);
        if !path.is_file() {
            return Err(FetchError::NotFound {
                name: name.to_string(),
            });
        }
        Ok(std::fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetches_existing_files_and_reports_missing_ones() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("guia.json"), b"{}").expect("write");

        let fetcher = FsBlobFetcher::new(dir.path());
        assert_eq!(fetcher.fetch_bytes("guia.json").expect("fetch"), b"{}");
        assert!(matches!(
            fetcher.fetch_bytes("falta.json"),
            Err(FetchError::NotFound { .. })
        ));
    }
}
