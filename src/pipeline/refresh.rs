//! Catalog document fetching.

use crate::error::Result;
use crate::models::CatalogSnapshot;
use crate::utils::{fingerprint, http, is_remote_source};

/// Fetches the catalog document and skips bodies already seen.
pub struct CatalogRefresher {
    client: reqwest::Client,
    source: String,
    last_fingerprint: Option<String>,
}

impl CatalogRefresher {
    /// `source` is an `http(s)` URL or a filesystem path.
    pub fn new(client: reqwest::Client, source: impl Into<String>) -> Self {
        Self {
            client,
            source: source.into(),
            last_fingerprint: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Fetch the document; `None` when it is identical to the previous fetch.
    pub async fn fetch(&mut self) -> Result<Option<CatalogSnapshot>> {
        let body = if is_remote_source(&self.source) {
            http::fetch_text(&self.client, &self.source).await?
        } else {
            tokio::fs::read_to_string(&self.source).await?
        };

        let digest = fingerprint(body.as_bytes());
        if self.last_fingerprint.as_deref() == Some(digest.as_str()) {
            log::debug!("Catalog at {} unchanged ({})", self.source, &digest[..12]);
            return Ok(None);
        }

        let snapshot = CatalogSnapshot::from_json(&body)?;
        log::info!(
            "Loaded catalog from {} ({} items, fingerprint {})",
            self.source,
            snapshot.item_count(),
            &digest[..12]
        );
        self.last_fingerprint = Some(digest);
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::fixtures::sample_document;

    fn refresher(path: &std::path::Path) -> CatalogRefresher {
        CatalogRefresher::new(reqwest::Client::new(), path.to_string_lossy())
    }

    #[tokio::test]
    async fn test_unchanged_document_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, serde_json::to_string(&sample_document()).unwrap()).unwrap();

        let mut refresher = refresher(&path);
        let first = refresher.fetch().await.unwrap().unwrap();
        assert_eq!(first.item_count(), sample_document().items.len());
        assert!(refresher.fetch().await.unwrap().is_none());

        let mut document = sample_document();
        document.items.truncate(3);
        std::fs::write(&path, serde_json::to_string(&document).unwrap()).unwrap();
        assert_eq!(refresher.fetch().await.unwrap().unwrap().item_count(), 3);
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = refresher(&path).fetch().await;
        assert!(matches!(result, Err(AppError::Json(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = refresher(&dir.path().join("absent.json")).fetch().await;
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
