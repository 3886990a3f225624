// src/model.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single job listing. `id` is the canonical posting URL (query string
/// stripped) and doubles as the deduplication key in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Posting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub date_found: DateTime<Utc>,

    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub is_remote: bool,

    // Audit fields, populated after scoring.
    #[serde(default)]
    pub match_score: Option<u8>,
    #[serde(default)]
    pub is_suitable: Option<bool>,
    #[serde(default)]
    pub seniority_mismatch: Option<bool>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,

    /// True once a notification has been emitted for this posting.
    /// At most one false→true transition for the lifetime of the record.
    #[serde(default)]
    pub notified: bool,
}

impl Posting {
    pub fn new(id: String, title: String, company: String, location: String) -> Self {
        let url = id.clone();
        Self {
            id,
            title,
            company,
            location,
            url,
            date_found: Utc::now(),
            description: None,
            salary: None,
            is_remote: false,
            match_score: None,
            is_suitable: None,
            seniority_mismatch: None,
            missing_skills: Vec::new(),
            summary: None,
            notified: false,
        }
    }

    /// Copy a scoring audit into the posting's mutable audit fields.
    pub fn apply_audit(&mut self, audit: &JobAudit) {
        self.match_score = Some(audit.match_score);
        self.is_suitable = Some(audit.is_suitable);
        self.seniority_mismatch = Some(audit.seniority_mismatch);
        self.missing_skills = audit.missing_skills.clone();
        self.summary = Some(audit.verdict.clone());
    }

    /// Notification predicate: worth telling the candidate about, and not
    /// already notified.
    pub fn wants_notification(&self) -> bool {
        let score_ok = self.match_score.unwrap_or(0) >= 70;
        let suitable = self.is_suitable.unwrap_or(false);
        (score_ok || suitable) && !self.notified
    }
}

/// Compatibility audit produced by the scorer for one posting against the
/// candidate profile. Scorers return this even on internal failure (degraded
/// all-zero variant with an explanatory verdict).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobAudit {
    pub match_score: u8,
    pub is_suitable: bool,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub seniority_mismatch: bool,
    pub verdict: String,
}

impl JobAudit {
    /// Sentinel result used when the scorer fails internally. Guarantees the
    /// posting still gets a persisted row and the cycle keeps moving.
    pub fn degraded(reason: &str) -> Self {
        Self {
            match_score: 0,
            is_suitable: false,
            missing_skills: Vec::new(),
            seniority_mismatch: false,
            verdict: format!("scoring unavailable: {reason}"),
        }
    }
}
