// src/harvest.rs
//! One harvest cycle: fetch postings for every search target, dedup, score
//! what the store has not seen, persist, and decide which postings are worth
//! a notification.

use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::{Config, SearchTarget};
use crate::notify::{render_message, NotificationPayload};
use crate::retry::{with_retry, Backoff};
use crate::scorer::{CandidateProfile, Scorer};
use crate::source::SourceAdapter;
use crate::store::Store;

/// One-time metrics registration (so series show up on the exporter).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("harvest_runs_total", "Harvest cycles started.");
        describe_counter!(
            "harvest_postings_fetched_total",
            "Raw postings returned by the source adapter."
        );
        describe_counter!(
            "harvest_new_postings_total",
            "Postings scored and persisted for the first time."
        );
        describe_counter!(
            "harvest_target_errors_total",
            "Search targets that failed after exhausting retries."
        );
        describe_counter!(
            "notifications_enqueued_total",
            "Payloads handed to the notification queue."
        );
        describe_counter!("deliveries_total", "Payloads delivered to the channel.");
        describe_counter!(
            "delivery_failures_total",
            "Payloads dropped after a delivery error."
        );
        describe_gauge!(
            "harvest_last_run_ts",
            "Unix ts when the harvest cycle last finished."
        );
    });
}

/// The harvest cycle and its collaborators. Built once at startup from the
/// explicit configuration; no ambient state.
pub struct Harvester {
    adapter: Arc<dyn SourceAdapter>,
    scorer: Arc<dyn Scorer>,
    store: Arc<dyn Store>,
    profile: CandidateProfile,
    chat_id: Option<String>,
    targets: Vec<SearchTarget>,
    results_per_target: u32,
    recency_hours: u32,
    backoff: Backoff,
}

impl Harvester {
    pub fn new(
        cfg: &Config,
        adapter: Arc<dyn SourceAdapter>,
        scorer: Arc<dyn Scorer>,
        store: Arc<dyn Store>,
        profile: CandidateProfile,
    ) -> Self {
        Self {
            adapter,
            scorer,
            store,
            profile,
            chat_id: cfg.telegram_chat_id.clone(),
            targets: cfg.targets.clone(),
            results_per_target: cfg.results_per_target,
            recency_hours: cfg.recency_hours,
            backoff: Backoff::default(),
        }
    }

    /// Run one full pass over all search targets. Returns the payloads that
    /// passed the notification predicate this cycle (possibly empty).
    pub async fn run_cycle(&self) -> Result<Vec<NotificationPayload>> {
        ensure_metrics_described();

        let raw = self.fetch_all_targets().await;
        let unique = dedup_by_id(raw);
        tracing::info!(candidates = unique.len(), "merged unique postings across targets");

        let mut out = Vec::new();
        for mut posting in unique {
            // Idempotent re-harvest: the store is the sole source of truth
            // for "already seen".
            if self.store.get(&posting.id)?.is_some() {
                continue;
            }

            let audit = self.scorer.score(&posting, &self.profile).await;
            tracing::info!(
                posting = %posting.id,
                company = %posting.company,
                score = audit.match_score,
                suitable = audit.is_suitable,
                verdict = %audit.verdict,
                "posting scored"
            );
            posting.apply_audit(&audit);
            self.store.upsert(&posting)?;
            counter!("harvest_new_postings_total").increment(1);

            if posting.wants_notification() {
                // Flag is persisted immediately, not batched, so at most one
                // notification is ever produced for this record.
                posting.notified = true;
                self.store.upsert(&posting)?;
                match &self.chat_id {
                    Some(chat_id) => out.push(NotificationPayload {
                        chat_id: chat_id.clone(),
                        text: render_message(&posting),
                    }),
                    None => tracing::warn!(
                        posting = %posting.id,
                        "TELEGRAM_CHAT_ID not configured, match will not be delivered"
                    ),
                }
            }
        }

        gauge!("harvest_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
        Ok(out)
    }

    /// Fetch every target through the retry wrapper. One target failing after
    /// exhausted retries is logged and skipped, never aborts the cycle.
    async fn fetch_all_targets(&self) -> Vec<crate::model::Posting> {
        let mut raw = Vec::new();
        for target in &self.targets {
            tracing::info!(term = %target.term, location = %target.location, "searching target");
            let fetched = with_retry(self.backoff, || {
                self.adapter
                    .fetch(target, self.results_per_target, self.recency_hours)
            })
            .await;
            match fetched {
                Ok(mut v) => raw.append(&mut v),
                Err(e) => {
                    counter!("harvest_target_errors_total").increment(1);
                    tracing::warn!(
                        location = %target.location,
                        source = self.adapter.name(),
                        error = %e,
                        "target failed after retries, continuing with next target"
                    );
                }
            }
        }
        raw
    }
}

/// Collapse postings sharing an identifier to a single entry. Identifiers are
/// content-addressed by canonical URL, so which duplicate survives does not
/// matter; first-seen wins.
pub fn dedup_by_id(postings: Vec<crate::model::Posting>) -> Vec<crate::model::Posting> {
    let mut seen: HashSet<String> = HashSet::with_capacity(postings.len());
    let mut unique = Vec::with_capacity(postings.len());
    for p in postings {
        if seen.insert(p.id.clone()) {
            unique.push(p);
        }
    }
    unique
}
