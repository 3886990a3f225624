// src/notify/telegram.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{DeliveryChannel, NotificationPayload};

/// Telegram Bot API `sendMessage` channel. One shot per payload, bounded
/// timeout, no internal retry: the delivery worker drops failed payloads.
pub struct TelegramNotifier {
    token: String,
    client: Client,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn new(token: String) -> Self {
        Self {
            token,
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    fn endpoint(&self) -> String {
        format!("https://api.telegram.org/bot{}/sendMessage", self.token)
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl DeliveryChannel for TelegramNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<()> {
        let body = SendMessage {
            chat_id: &payload.chat_id,
            text: &payload.text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let resp = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("telegram request failed")?
            .error_for_status()
            .context("telegram non-2xx")?;

        let api: ApiResponse = resp.json().await.context("decoding telegram response")?;
        if !api.ok {
            return Err(anyhow!(
                "telegram rejected message: {}",
                api.description.unwrap_or_else(|| "unknown".to_string())
            ));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}
