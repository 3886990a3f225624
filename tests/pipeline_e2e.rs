// tests/pipeline_e2e.rs
// Full pipeline smoke: harvest cycle -> queue -> delivery worker.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use job_scout::config::{Config, SearchTarget};
use job_scout::harvest::Harvester;
use job_scout::model::{JobAudit, Posting};
use job_scout::notify::{run_delivery_worker, DeliveryChannel, NotificationPayload};
use job_scout::queue;
use job_scout::scorer::{CandidateProfile, StubScorer};
use job_scout::source::SourceAdapter;
use job_scout::store::{MemoryStore, Store};

struct OnePostingAdapter;

#[async_trait]
impl SourceAdapter for OnePostingAdapter {
    async fn fetch(
        &self,
        _target: &SearchTarget,
        _limit: u32,
        _recency_hours: u32,
    ) -> Result<Vec<Posting>> {
        let mut p = Posting::new(
            "https://x/1".into(),
            "Senior Backend Developer".into(),
            "Acme".into(),
            "Mar del Plata, Argentina".into(),
        );
        p.description = Some("Python, FastAPI, PostgreSQL".into());
        Ok(vec![p])
    }

    fn name(&self) -> &'static str {
        "one-posting"
    }
}

struct SinkChannel {
    delivered: Mutex<Vec<NotificationPayload>>,
}

#[async_trait]
impl DeliveryChannel for SinkChannel {
    async fn send(&self, payload: &NotificationPayload) -> Result<()> {
        self.delivered.lock().unwrap().push(payload.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sink"
    }
}

#[tokio::test]
async fn scored_match_travels_from_source_to_delivery() {
    let cfg = Config {
        groq_api_key: "test-key".into(),
        groq_model: "test-model".into(),
        telegram_bot_token: Some("token".into()),
        telegram_chat_id: Some("777".into()),
        store_dir: PathBuf::from("unused"),
        profile_path: PathBuf::from("unused"),
        board_url: "http://unused".into(),
        targets: vec![SearchTarget {
            term: "Python Developer".into(),
            location: "Argentina".into(),
            country: "argentina".into(),
        }],
        results_per_target: 15,
        recency_hours: 24,
        harvest_interval: Duration::from_secs(300),
    };

    let store = Arc::new(MemoryStore::new());
    let scorer = Arc::new(StubScorer {
        fixed: JobAudit {
            match_score: 85,
            is_suitable: true,
            missing_skills: vec!["kubernetes".into()],
            seniority_mismatch: false,
            verdict: "Strong tech-stack overlap".into(),
        },
    });
    let harvester = Harvester::new(
        &cfg,
        Arc::new(OnePostingAdapter),
        scorer,
        Arc::clone(&store) as Arc<dyn Store>,
        CandidateProfile(serde_json::json!({"skills": ["python", "fastapi"]})),
    );

    let payloads = harvester.run_cycle().await.unwrap();
    assert_eq!(payloads.len(), 1);

    let stored = store.get("https://x/1").unwrap().unwrap();
    assert!(stored.notified);
    assert_eq!(stored.match_score, Some(85));

    // Hand the cycle output to the queue and drain it through the worker.
    let (q, stream) = queue::channel();
    for p in payloads {
        q.enqueue(p);
    }
    drop(q);

    let channel = Arc::new(SinkChannel {
        delivered: Mutex::new(Vec::new()),
    });
    run_delivery_worker(stream, Some(Arc::clone(&channel) as Arc<dyn DeliveryChannel>)).await;

    let delivered = channel.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].chat_id, "777");
    assert!(delivered[0].text.contains("Acme"));
    assert!(delivered[0].text.contains("85/100"));
}
