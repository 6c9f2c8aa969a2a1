//! Core domain types and service traits for rawdha-notify
//!
//! This module defines the data that flows through a single handler
//! invocation and the trait contracts at the two external seams: the
//! messaging gateway on the way out and the trigger runtime on the way in.

use crate::gateway::GatewayError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// The fields of a newly created document.
pub type DocumentData = Map<String, Value>;

/// Prefix of every topic a notification is published to.
pub const TOPIC_PREFIX: &str = "school_";

/// A single document-creation event handed to a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEvent {
    /// Full path of the created document, e.g. `announcements/abc123`.
    pub document: String,
    /// Wildcard captures from the subscription pattern.
    pub params: HashMap<String, String>,
    /// Snapshot of the new document. `None` when the runtime had no data.
    pub data: Option<DocumentData>,
    /// When the runtime received the event.
    pub received_at: DateTime<Utc>,
}

impl TriggerEvent {
    /// Creates an event carrying a document snapshot.
    pub fn new(document: impl Into<String>, data: DocumentData) -> Self {
        Self {
            document: document.into(),
            params: HashMap::new(),
            data: Some(data),
            received_at: Utc::now(),
        }
    }

    /// Creates an event with no snapshot attached.
    pub fn without_snapshot(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            params: HashMap::new(),
            data: None,
            received_at: Utc::now(),
        }
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }
}

/// A push notification addressed to a tenant topic.
///
/// Serializes to the gateway wire shape:
/// `{ topic, notification: { title, body }, data: { type, rawdhaId } }`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NotificationMessage {
    topic: String,
    notification: NotificationContent,
    data: NotificationData,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct NotificationContent {
    title: String,
    body: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct NotificationData {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "rawdhaId")]
    rawdha_id: String,
}

impl NotificationMessage {
    /// Builds a message for the topic of `rawdha_id`.
    pub fn for_tenant(
        rawdha_id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        let rawdha_id = rawdha_id.into();
        Self {
            topic: format!("{TOPIC_PREFIX}{rawdha_id}"),
            notification: NotificationContent {
                title: title.into(),
                body: body.into(),
            },
            data: NotificationData {
                kind: kind.into(),
                rawdha_id,
            },
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn title(&self) -> &str {
        &self.notification.title
    }

    pub fn body(&self) -> &str {
        &self.notification.body
    }

    /// The `type` entry of the data payload.
    pub fn kind(&self) -> &str {
        &self.data.kind
    }

    pub fn rawdha_id(&self) -> &str {
        &self.data.rawdha_id
    }
}

/// How a single handler invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The gateway accepted the message.
    Sent,
    /// The event was dropped before reaching the gateway.
    Skipped,
    /// The gateway call failed.
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Sent => "sent",
            Outcome::Skipped => "skipped",
            Outcome::Failed => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// Delivers notifications to a topic-addressed push service.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// A short name for the gateway (e.g., "fcm", "logging").
    fn name(&self) -> &str;

    /// Makes exactly one delivery attempt for `message`.
    ///
    /// # Returns
    /// * `Ok(())` if the service accepted the message
    /// * `Err` on transport failure or rejection
    async fn send(&self, message: &NotificationMessage) -> Result<(), GatewayError>;
}

/// Reacts to the creation of a document.
///
/// Implementations absorb every failure; the runtime only ever sees an
/// `Outcome`.
#[async_trait]
pub trait DocumentHandler: Send + Sync {
    /// A unique, descriptive name used for logging and metrics.
    fn name(&self) -> &str;

    async fn on_created(&self, event: &TriggerEvent) -> Outcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_serializes_to_gateway_shape() {
        let message = NotificationMessage::for_tenant("42", "Exam", "", "announcement");

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "topic": "school_42",
                "notification": { "title": "Exam", "body": "" },
                "data": { "type": "announcement", "rawdhaId": "42" }
            })
        );
    }

    #[test]
    fn outcome_labels_are_lowercase() {
        assert_eq!(Outcome::Sent.to_string(), "sent");
        assert_eq!(serde_json::to_value(Outcome::Skipped).unwrap(), json!("skipped"));
    }
}
