// src/scorer.rs
//! Inference-backed match scoring. The scorer contract is infallible: any
//! internal failure (network, HTTP, malformed model output) degrades to a
//! zero-score unsuitable audit with an explanatory verdict, so every new
//! posting still gets a persisted row and the cycle keeps moving.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use crate::model::{JobAudit, Posting};

/// The fixed candidate profile postings are audited against, loaded once at
/// startup from a JSON CV file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile(pub Value);

impl CandidateProfile {
    /// Missing or unreadable profile degrades to an empty object with a
    /// warning rather than failing startup.
    pub fn from_path(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(v) => Self(v),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "profile file is not valid JSON, using empty profile");
                    Self(Value::Object(Default::default()))
                }
            },
            Err(_) => {
                tracing::warn!(path = %path.display(), "profile file not found, using empty profile");
                Self(Value::Object(Default::default()))
            }
        }
    }
}

#[async_trait]
pub trait Scorer: Send + Sync {
    /// Audit one posting against the profile. Must not fail.
    async fn score(&self, posting: &Posting, profile: &CandidateProfile) -> JobAudit;

    fn provider_name(&self) -> &'static str;
}

const SYSTEM_PROMPT: &str = "Act as a technical audit engine performing a strict compatibility \
analysis between a professional profile (JSON) and a job posting. Rules: base every claim only \
on facts present in the data; if a skill is absent from the profile JSON, the candidate does \
not have it. match_score measures tech-stack overlap from 0 to 100. Flag seniority_mismatch \
when the posting demands clearly more experience than the profile shows. Extract the real \
technical requirements hidden behind generic corporate language. The verdict is an objective \
technical conclusion of at most 15 words, not a motivational recommendation. Respond with a \
single JSON object with keys: match_score (integer 0-100), is_suitable (boolean), \
missing_skills (array of strings), seniority_mismatch (boolean), verdict (string).";

/// Scorer backed by the Groq chat-completions API (OpenAI-compatible wire
/// format, JSON response mode).
pub struct GroqScorer {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GroqScorer {
    pub fn new(api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("job-scout/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key,
            model,
        }
    }

    async fn score_inner(&self, posting: &Posting, profile: &CandidateProfile) -> anyhow::Result<JobAudit> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct ResponseFormat<'a> {
            #[serde(rename = "type")]
            kind: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            response_format: ResponseFormat<'a>,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let description = posting
            .description
            .as_deref()
            .unwrap_or("No description available");
        let truncated: String = description.chars().take(3000).collect();
        let user = format!(
            "CANDIDATE PROFILE (JSON):\n{}\n\nVACANCY:\nTitle: {}\nDescription: {}",
            self.render_profile(profile),
            posting.title,
            truncated
        );

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: 0.1,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let resp = self
            .http
            .post("https://api.groq.com/openai/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?
            .error_for_status()?;

        let body: Resp = resp.json().await?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();
        let mut audit: JobAudit = serde_json::from_str(content)?;
        audit.match_score = audit.match_score.min(100);
        Ok(audit)
    }

    fn render_profile(&self, profile: &CandidateProfile) -> String {
        serde_json::to_string(&profile.0).unwrap_or_else(|_| "{}".to_string())
    }
}

#[async_trait]
impl Scorer for GroqScorer {
    async fn score(&self, posting: &Posting, profile: &CandidateProfile) -> JobAudit {
        match self.score_inner(posting, profile).await {
            Ok(audit) => audit,
            Err(e) => {
                tracing::warn!(posting = %posting.id, error = %e, "scorer degraded to sentinel result");
                let msg = e.to_string();
                let head: String = msg.chars().take(80).collect();
                JobAudit::degraded(&head)
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "groq"
    }
}

/// Deterministic scorer for tests and local dry runs.
#[derive(Clone)]
pub struct StubScorer {
    pub fixed: JobAudit,
}

#[async_trait]
impl Scorer for StubScorer {
    async fn score(&self, _posting: &Posting, _profile: &CandidateProfile) -> JobAudit {
        self.fixed.clone()
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_profile_degrades_to_empty_object() {
        let p = CandidateProfile::from_path(Path::new("/nonexistent/cv.json"));
        assert!(p.0.as_object().is_some_and(|m| m.is_empty()));
    }

    #[tokio::test]
    async fn stub_scorer_returns_fixed_audit() {
        let stub = StubScorer {
            fixed: JobAudit {
                match_score: 88,
                is_suitable: true,
                missing_skills: vec![],
                seniority_mismatch: false,
                verdict: "Strong overlap".into(),
            },
        };
        let posting = Posting::new(
            "https://x/1".into(),
            "Dev".into(),
            "Acme".into(),
            "Remote".into(),
        );
        let profile = CandidateProfile(serde_json::json!({"skills": ["rust"]}));
        let audit = stub.score(&posting, &profile).await;
        assert_eq!(audit.match_score, 88);
    }
}
