//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Whether a catalog source names a remote document rather than a file.
pub fn is_remote_source(source: &str) -> bool {
    Url::parse(source)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Hex SHA-256 of a document body.
pub fn fingerprint(body: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote_source() {
        assert!(is_remote_source("https://example.com/schema.json"));
        assert!(is_remote_source("http://localhost:8080/schema"));
        assert!(!is_remote_source("data/schema.json"));
        assert!(!is_remote_source("/var/lib/schema.json"));
        assert!(!is_remote_source("file:///tmp/schema.json"));
    }

    #[test]
    fn test_fingerprint() {
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(fingerprint(b"{}"), fingerprint(b"{ }"));
    }
}
