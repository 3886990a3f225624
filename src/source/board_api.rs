// src/source/board_api.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use serde::Deserialize;
use std::time::Duration;

use crate::config::SearchTarget;
use crate::model::Posting;
use crate::source::{canonical_url, SourceAdapter};

/// Row shape returned by the aggregated job-board search endpoint.
#[derive(Debug, Deserialize)]
struct BoardRow {
    job_url: Option<String>,
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    description: Option<String>,
    salary: Option<String>,
    #[serde(default)]
    is_remote: bool,
}

/// Adapter over an HTTP job-board search API that returns a JSON array of
/// raw postings per (term, location) query.
pub struct BoardApiAdapter {
    base_url: String,
    client: reqwest::Client,
}

impl BoardApiAdapter {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("job-scout/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { base_url, client }
    }

    fn map_rows(&self, rows: Vec<BoardRow>, target: &SearchTarget) -> Vec<Posting> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            // Skip rows without a usable URL: no identity, no row.
            let Some(id) = row.job_url.as_deref().and_then(canonical_url) else {
                continue;
            };
            out.push(Posting {
                id: id.clone(),
                title: row.title.unwrap_or_else(|| "Untitled".to_string()),
                company: row
                    .company
                    .unwrap_or_else(|| "Unspecified company".to_string()),
                location: row.location.unwrap_or_else(|| target.location.clone()),
                url: id,
                date_found: Utc::now(),
                description: row.description,
                salary: row.salary,
                is_remote: row.is_remote,
                match_score: None,
                is_suitable: None,
                seniority_mismatch: None,
                missing_skills: Vec::new(),
                summary: None,
                notified: false,
            });
        }
        counter!("harvest_postings_fetched_total").increment(out.len() as u64);
        out
    }
}

#[async_trait]
impl SourceAdapter for BoardApiAdapter {
    async fn fetch(
        &self,
        target: &SearchTarget,
        limit: u32,
        recency_hours: u32,
    ) -> Result<Vec<Posting>> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("search_term", target.term.as_str()),
                ("location", target.location.as_str()),
                ("country", target.country.as_str()),
                ("results_wanted", &limit.to_string()),
                ("hours_old", &recency_hours.to_string()),
            ])
            .send()
            .await
            .context("job board request failed")?
            .error_for_status()
            .context("job board returned non-2xx")?;

        let rows: Vec<BoardRow> = resp.json().await.context("decoding job board response")?;
        Ok(self.map_rows(rows, target))
    }

    fn name(&self) -> &'static str {
        "board-api"
    }
}
