//! A client for the Firebase Cloud Messaging HTTP v1 API.

use crate::core::{MessagingGateway, NotificationMessage};
use crate::gateway::{GatewayError, TokenSource};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

#[derive(Serialize)]
struct SendRequest<'a> {
    message: &'a NotificationMessage,
}

#[derive(Deserialize)]
struct SendResponse {
    name: Option<String>,
}

/// Sends messages to a topic through `projects/{id}/messages:send`.
pub struct FcmGateway {
    client: reqwest::Client,
    send_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl FcmGateway {
    /// Creates a new `FcmGateway`.
    ///
    /// # Arguments
    /// * `endpoint` - Base URL of the API, e.g. `https://fcm.googleapis.com`.
    /// * `project_id` - The Firebase project that owns the topics.
    /// * `tokens` - Source of the OAuth2 bearer token, asked on every send.
    /// * `timeout` - Per-request timeout applied by the HTTP client.
    pub fn new(
        endpoint: &str,
        project_id: &str,
        tokens: Arc<dyn TokenSource>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let send_url = format!(
            "{}/v1/projects/{}/messages:send",
            endpoint.trim_end_matches('/'),
            project_id
        );
        Ok(Self {
            client,
            send_url,
            tokens,
        })
    }

    pub fn send_url(&self) -> &str {
        &self.send_url
    }
}

#[async_trait]
impl MessagingGateway for FcmGateway {
    fn name(&self) -> &str {
        "fcm"
    }

    #[instrument(skip(self, message), fields(topic = %message.topic()))]
    async fn send(&self, message: &NotificationMessage) -> Result<(), GatewayError> {
        let access_token = self.tokens.access_token().await?;

        let start = Instant::now();
        let result = self
            .client
            .post(&self.send_url)
            .bearer_auth(access_token)
            .json(&SendRequest { message })
            .send()
            .await;
        metrics::histogram!("gateway_send_duration_seconds", "gateway" => "fcm")
            .record(start.elapsed().as_secs_f64());
        let response = result?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // The message name is informational only.
        match response.json::<SendResponse>().await {
            Ok(SendResponse { name: Some(name) }) => debug!(message_name = %name, "FCM accepted message"),
            _ => debug!("FCM accepted message"),
        }
        Ok(())
    }
}
