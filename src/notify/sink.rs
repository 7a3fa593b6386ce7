use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::notify::{Notification, Priority};

const PUSHOVER_MESSAGES_URL: &str = "https://api.pushover.net/1/messages.json";
const PUSHOVER_VALIDATE_URL: &str = "https://api.pushover.net/1/users/validate.json";

/// Pushover rejects message bodies past this length.
const PUSHOVER_BODY_LIMIT: usize = 1024;

#[async_trait]
pub trait NotifySink: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}

pub struct StdoutSink;

#[async_trait]
impl NotifySink for StdoutSink {
    async fn send(&self, notification: &Notification) -> Result<()> {
        println!(
            "[{:?}] {} - {}",
            notification.priority, notification.title, notification.body
        );
        Ok(())
    }
}

pub struct PushoverSink {
    client: Client,
    api_token: String,
    user_key: String,
}

impl PushoverSink {
    pub fn new(api_token: impl Into<String>, user_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent("benchwatch/0.1")
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build Pushover HTTP client");
        Self {
            client,
            api_token: api_token.into(),
            user_key: user_key.into(),
        }
    }

    /// Check the configured credentials against the validate endpoint.
    /// Called once at startup; a rejection is a configuration error.
    pub async fn validate(&self) -> Result<()> {
        let response = self
            .client
            .post(PUSHOVER_VALIDATE_URL)
            .form(&[
                ("token", self.api_token.as_str()),
                ("user", self.user_key.as_str()),
            ])
            .send()
            .await
            .context("failed reaching Pushover validate endpoint")?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .context("invalid JSON from Pushover validate endpoint")?;
        if status.is_success() && payload.get("status").and_then(Value::as_i64) == Some(1) {
            return Ok(());
        }
        let errors = payload
            .get("errors")
            .map(Value::to_string)
            .unwrap_or_else(|| "unknown error".to_string());
        Err(anyhow!("invalid Pushover credentials: {errors}"))
    }
}

#[async_trait]
impl NotifySink for PushoverSink {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let body = truncate_body(&notification.body, PUSHOVER_BODY_LIMIT);
        let priority = priority_code(notification.priority).to_string();
        self.client
            .post(PUSHOVER_MESSAGES_URL)
            .form(&[
                ("token", self.api_token.as_str()),
                ("user", self.user_key.as_str()),
                ("title", notification.title.as_str()),
                ("message", body.as_str()),
                ("priority", priority.as_str()),
            ])
            .send()
            .await
            .context("failed sending Pushover message")?
            .error_for_status()
            .context("Pushover rejected the message")?;
        Ok(())
    }
}

fn priority_code(priority: Priority) -> i8 {
    match priority {
        Priority::Normal => 0,
        Priority::Elevated => 1,
    }
}

fn truncate_body(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}
