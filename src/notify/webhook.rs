//! Discord webhook delivery with edit-vs-create bookkeeping.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::models::{ChangeEvent, Snapshot};
use crate::notify::render;

/// Minimum spacing between webhook calls.
const SEND_SPACING: Duration = Duration::from_secs(1);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Pushes snapshots and incident timelines to a Discord webhook.
///
/// One persistent status message is edited in place; each incident gets
/// its own message keyed by incident id.
pub struct WebhookNotifier {
    client: reqwest::Client,
    webhook_url: String,
    status_message_id: Option<String>,
    incident_messages: HashMap<String, String>,
    last_send: Option<Instant>,
}

impl WebhookNotifier {
    pub fn new(webhook_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            webhook_url,
            status_message_id: None,
            incident_messages: HashMap::new(),
            last_send: None,
        })
    }

    /// Deliver one check's outcome: refresh the status message, then
    /// post or update a message per incident-bearing event.
    pub async fn handle_update(
        &mut self,
        snapshot: &Snapshot,
        events: &[ChangeEvent],
    ) -> Result<()> {
        let status_id = self.status_message_id.take();
        self.status_message_id = Some(self.upsert(status_id, render::status_embed(snapshot)).await?);

        // The initial sentinel only seeds the status message
        if matches!(events.first(), Some(ChangeEvent::Initial { .. })) {
            return Ok(());
        }

        for event in events {
            let incident = match event {
                ChangeEvent::NewIncident { incident }
                | ChangeEvent::IncidentUpdate { incident } => incident,
                _ => continue,
            };

            let existing = self.incident_messages.get(&incident.id).cloned();
            let message_id = self.upsert(existing, render::incident_embed(incident)).await?;
            self.incident_messages
                .insert(incident.id.clone(), message_id);
        }

        Ok(())
    }

    /// Edit the given message, falling back to creating a new one when
    /// there is no message yet or the edit target is gone.
    async fn upsert(&mut self, message_id: Option<String>, embed: Value) -> Result<String> {
        self.pace().await;

        if let Some(id) = message_id {
            match self.edit(&id, &embed).await {
                Ok(()) => return Ok(id),
                Err(error) => {
                    log::warn!("Edit of message {id} failed, sending a new one: {error}");
                }
            }
        }

        self.create(&embed).await
    }

    async fn edit(&self, message_id: &str, embed: &Value) -> Result<()> {
        let url = format!("{}/messages/{}", self.webhook_url, message_id);
        let response = self
            .client
            .patch(&url)
            .json(&json!({ "embeds": [embed] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::notify(format!(
                "message edit returned status {status}"
            )));
        }
        Ok(())
    }

    async fn create(&self, embed: &Value) -> Result<String> {
        // wait=true makes Discord return the created message
        let url = format!("{}?wait=true", self.webhook_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "embeds": [embed] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::notify(format!(
                "message create returned status {status}"
            )));
        }

        let body: Value = response.json().await?;
        body.get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AppError::notify("webhook response carried no message id"))
    }

    async fn pace(&mut self) {
        if let Some(last) = self.last_send {
            let elapsed = last.elapsed();
            if elapsed < SEND_SPACING {
                tokio::time::sleep(SEND_SPACING - elapsed).await;
            }
        }
        self.last_send = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifier_builds_with_webhook_url() {
        let notifier =
            WebhookNotifier::new("https://discord.com/api/webhooks/1/token".to_string()).unwrap();
        assert!(notifier.status_message_id.is_none());
        assert!(notifier.incident_messages.is_empty());
    }

    #[tokio::test]
    async fn pace_records_send_time() {
        let mut notifier =
            WebhookNotifier::new("https://discord.com/api/webhooks/1/token".to_string()).unwrap();
        notifier.pace().await;
        assert!(notifier.last_send.is_some());
    }
}
