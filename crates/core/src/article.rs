//! Article records and deduplication keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// A single feed item stored for reading.
///
/// Articles belong to exactly one feed and are immutable from the rule
/// engine's point of view. They carry no direct user reference; ownership
/// is resolved by traversing collection → feed containment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub feed_id: i64,
    pub title: String,
    pub url: Option<String>,
    pub guid: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    /// SHA-256 of guid (or url) for per-feed deduplication.
    pub dedup_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum DedupKeyError {
    #[error("article requires guid or url to compute dedup_key")]
    MissingSource,
}

/// Compute a stable deduplication key from an article's guid or url.
///
/// The guid wins when present; empty strings are treated as absent.
pub fn compute_dedup_key(
    guid: Option<&str>,
    url: Option<&str>,
) -> Result<String, DedupKeyError> {
    let source = guid
        .filter(|s| !s.is_empty())
        .or_else(|| url.filter(|s| !s.is_empty()))
        .ok_or(DedupKeyError::MissingSource)?;
    Ok(hex::encode(Sha256::digest(source.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guid_wins_over_url() {
        let from_guid = compute_dedup_key(Some("guid-1"), Some("https://a/1")).unwrap();
        let guid_only = compute_dedup_key(Some("guid-1"), None).unwrap();
        assert_eq!(from_guid, guid_only);
    }

    #[test]
    fn falls_back_to_url() {
        let a = compute_dedup_key(None, Some("https://a/1")).unwrap();
        let b = compute_dedup_key(Some(""), Some("https://a/1")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stable_across_calls() {
        let a = compute_dedup_key(Some("x"), None).unwrap();
        let b = compute_dedup_key(Some("x"), None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn missing_both_is_an_error() {
        assert!(compute_dedup_key(None, None).is_err());
        assert!(compute_dedup_key(Some(""), Some("")).is_err());
    }
}
