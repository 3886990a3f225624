// src/source/mod.rs
pub mod board_api;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::SearchTarget;
use crate::model::Posting;

/// A scraping source the harvest cycle pulls postings from. Transient failures
/// (rate limits, network errors) surface as `Err` and are retried by the
/// caller through the retry wrapper.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(
        &self,
        target: &SearchTarget,
        limit: u32,
        recency_hours: u32,
    ) -> Result<Vec<Posting>>;

    fn name(&self) -> &'static str;
}

/// Deduplication key: the posting URL with its query string stripped.
/// Two distinct postings sharing a stripped URL collide and the second is
/// silently discarded (tracking-parameter collision, known gap).
pub fn canonical_url(url: &str) -> Option<String> {
    let stripped = url.split('?').next().unwrap_or_default().trim();
    if stripped.is_empty() {
        return None;
    }
    Some(stripped.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_url_strips_query_string() {
        assert_eq!(
            canonical_url("https://x/jobs/1?utm_source=feed&ref=abc"),
            Some("https://x/jobs/1".to_string())
        );
        assert_eq!(
            canonical_url("https://x/jobs/1"),
            Some("https://x/jobs/1".to_string())
        );
    }

    #[test]
    fn empty_urls_are_rejected() {
        assert_eq!(canonical_url(""), None);
        assert_eq!(canonical_url("?utm_source=feed"), None);
        assert_eq!(canonical_url("   "), None);
    }
}
