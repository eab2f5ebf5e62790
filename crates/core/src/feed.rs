//! Feed records and URL canonicalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// An RSS/Atom feed source and its fetch metadata.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Feed {
    pub id: i64,
    /// Stored in canonical form (see [`normalize_url`]) so the uniqueness
    /// constraint on `url` stays reliable.
    pub url: String,
    pub title: String,
    pub site_url: Option<String>,
    pub description: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub failure_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalize a feed URL for consistent storage and uniqueness.
///
/// Lowercases scheme and host, drops default ports and fragments, and strips
/// a trailing slash from non-root paths. Inputs that do not parse as absolute
/// URLs with a host pass through trimmed.
pub fn normalize_url(raw_url: &str) -> String {
    let stripped = raw_url.trim();
    let parsed = match Url::parse(stripped) {
        Ok(u) if u.has_host() => u,
        _ => return stripped.to_string(),
    };

    let mut out = format!(
        "{}://{}",
        parsed.scheme(),
        parsed.host_str().unwrap_or_default()
    );
    // `Url::port` is None for the scheme's default port.
    if let Some(port) = parsed.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }

    let path = parsed.path();
    if path == "/" {
        out.push('/');
    } else {
        out.push_str(path.strip_suffix('/').unwrap_or(path));
    }

    if let Some(query) = parsed.query() {
        out.push('?');
        out.push_str(query);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_scheme_and_host() {
        assert_eq!(
            normalize_url("HTTPS://Example.COM/Feed.xml"),
            "https://example.com/Feed.xml"
        );
    }

    #[test]
    fn strips_default_ports() {
        assert_eq!(
            normalize_url("http://example.com:80/rss"),
            "http://example.com/rss"
        );
        assert_eq!(
            normalize_url("https://example.com:443/rss"),
            "https://example.com/rss"
        );
    }

    #[test]
    fn keeps_explicit_ports() {
        assert_eq!(
            normalize_url("http://example.com:8080/rss"),
            "http://example.com:8080/rss"
        );
    }

    #[test]
    fn strips_trailing_slash_on_non_root_paths() {
        assert_eq!(
            normalize_url("https://example.com/feed/"),
            "https://example.com/feed"
        );
        assert_eq!(normalize_url("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn preserves_query_drops_fragment() {
        assert_eq!(
            normalize_url("https://example.com/feed?format=rss#latest"),
            "https://example.com/feed?format=rss"
        );
    }

    #[test]
    fn non_urls_pass_through_trimmed() {
        assert_eq!(normalize_url("  not a url  "), "not a url");
    }
}
