//! Delivery sinks for scheduled posts.
//!
//! A sink takes a rendered message and hands it to a fixed destination.
//! Jobs receive the sink at construction time as an `Arc<dyn DeliverySink>`.

use crate::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

/// Discord rejects message content longer than this many characters.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Deliver one rendered message.
    async fn deliver(&self, message: &str) -> Result<()>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

/// Posts messages to a Discord channel through an incoming webhook.
#[derive(Clone)]
pub struct DiscordWebhook {
    client: Client,
    webhook_url: String,
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

impl DiscordWebhook {
    pub fn new(webhook_url: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let webhook_url = webhook_url.into();
        if !webhook_url.starts_with("https://") && !webhook_url.starts_with("http://") {
            return Err(BotError::Config(format!(
                "webhook URL must start with 'http://' or 'https://': {}",
                webhook_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| BotError::Delivery(format!("failed to build HTTP client: {}", e)))?;

        info!("Discord webhook delivery enabled");
        Ok(Self {
            client,
            webhook_url,
        })
    }

    async fn post(&self, content: &str) -> Result<()> {
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&WebhookMessage { content })
            .send()
            .await
            .map_err(|e| {
                error!("Discord webhook request failed: {}", e);
                BotError::Delivery(e.to_string())
            })?;

        if resp.status().is_success() {
            debug!("Discord message posted ({} chars)", content.chars().count());
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!("Discord webhook rejected message: {} - {}", status, body);
            Err(BotError::Delivery(format!("HTTP {}: {}", status, body)))
        }
    }
}

#[async_trait]
impl DeliverySink for DiscordWebhook {
    async fn deliver(&self, message: &str) -> Result<()> {
        for chunk in split_message(message, DISCORD_MESSAGE_LIMIT) {
            self.post(&chunk).await?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

/// Prints messages to standard output. Used when no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

#[async_trait]
impl DeliverySink for StdoutSink {
    async fn deliver(&self, message: &str) -> Result<()> {
        println!("{}", message);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// Split `text` into chunks of at most `limit` characters.
///
/// Breaks on line boundaries where possible; a single line longer than
/// `limit` is cut mid-line. Blank chunks are dropped.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > limit {
            for c in line.chars() {
                if current_len == limit {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push(c);
                current_len += 1;
            }
        } else {
            current.push_str(line);
            current_len += line_len;
        }
    }
    chunks.push(current);

    chunks
        .into_iter()
        .map(|c| c.trim_end().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}
