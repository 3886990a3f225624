// src/notify/mod.rs
pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;

use crate::model::Posting;
use crate::queue::NotificationStream;

/// Pause after a failed delivery before resuming consumption, so a
/// misbehaving channel does not turn into a hot error loop.
const ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Destination plus a fully rendered message body. Created by the harvest
/// cycle, consumed and discarded by the delivery worker; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    pub chat_id: String,
    pub text: String,
}

/// Outbound channel the delivery worker forwards payloads to.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send(&self, payload: &NotificationPayload) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Render a scored posting as a Telegram-HTML message (bold/italic/code/link).
/// All dynamic fields are escaped.
pub fn render_message(p: &Posting) -> String {
    let esc = |s: &str| html_escape::encode_text(s).to_string();

    let skills = if p.missing_skills.is_empty() {
        "none detected".to_string()
    } else {
        esc(&p.missing_skills.join(", "))
    };
    let seniority_alert = if p.seniority_mismatch.unwrap_or(false) {
        "\n<b>Warning:</b> possible seniority mismatch"
    } else {
        ""
    };
    let verdict = p.summary.as_deref().unwrap_or("n/a");

    format!(
        "<b>Match found</b>\n\n\
         <b>Company:</b> {}\n\
         <b>Role:</b> {}\n\
         <b>Location:</b> {}\n\n\
         <b>Score:</b> <code>{}/100</code>\n\
         <b>Missing skills:</b> <i>{}</i>{}\n\n\
         <b>Verdict:</b>\n{}\n\n\
         <a href=\"{}\">Open posting</a>",
        esc(&p.company),
        esc(&p.title),
        esc(&p.location),
        p.match_score.unwrap_or(0),
        skills,
        seniority_alert,
        esc(verdict),
        html_escape::encode_double_quoted_attribute(&p.url),
    )
}

/// Long-running consumer: dequeue one payload at a time and forward it.
///
/// Best-effort, at-most-once: a failed delivery is logged and dropped, never
/// retried or re-enqueued, and the worker pauses briefly before resuming.
/// With no channel configured the worker warns and terminates, degrading to
/// "notifications accumulate unconsumed".
pub async fn run_delivery_worker(
    mut stream: NotificationStream,
    channel: Option<Arc<dyn DeliveryChannel>>,
) {
    let Some(channel) = channel else {
        tracing::warn!("delivery channel not configured, delivery worker disabled");
        return;
    };

    tracing::info!(channel = channel.name(), "delivery worker started");
    while let Some(payload) = stream.recv().await {
        match channel.send(&payload).await {
            Ok(()) => {
                counter!("deliveries_total").increment(1);
                tracing::info!(chat_id = %payload.chat_id, "notification delivered");
            }
            Err(e) => {
                counter!("delivery_failures_total").increment(1);
                tracing::warn!(
                    chat_id = %payload.chat_id,
                    error = %e,
                    "delivery failed, dropping payload"
                );
                tokio::time::sleep(ERROR_PAUSE).await;
            }
        }
    }
}
