//! Handlers that turn newly created documents into push notifications.
//!
//! Both handlers share one transform: read the tenant id, title and body
//! from the document, skip if a required field is absent, build the message
//! and make a single send attempt. They differ only in their
//! `NotifierProfile`.

pub mod announcement;
pub mod general;

pub use announcement::AnnouncementNotifier;
pub use general::GenericNotificationNotifier;

use crate::core::{DocumentData, MessagingGateway, NotificationMessage, Outcome, TriggerEvent};
use crate::gateway::GatewayError;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

/// Why an invocation did not deliver a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("no snapshot data")]
    MissingSnapshot,

    #[error("missing required field `{0}`")]
    MissingRequiredField(&'static str),

    #[error("gateway send failed: {0}")]
    GatewaySendFailure(#[from] GatewayError),
}

/// The per-handler differences of the shared transform.
#[derive(Debug, Clone, Copy)]
pub struct NotifierProfile {
    pub name: &'static str,
    /// Document fields consulted for the body, in order.
    pub body_fields: &'static [&'static str],
    /// `type` used when the document does not carry one.
    pub default_kind: &'static str,
    /// Whether dropped events are logged at `info` rather than `debug`.
    pub log_skips: bool,
}

/// Reads `key` as notification text.
///
/// Non-empty strings are taken as-is and non-zero numbers are rendered as
/// text. Anything else, including an empty string or `0`, counts as absent.
fn text_field(data: &DocumentData, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Builds the message for `data`, or reports the first missing field.
pub fn build_message(
    profile: &NotifierProfile,
    data: &DocumentData,
) -> Result<NotificationMessage, NotifyError> {
    let rawdha_id = text_field(data, "rawdhaId");
    let title = text_field(data, "title");
    let (rawdha_id, title) = match (rawdha_id, title) {
        (Some(rawdha_id), Some(title)) => (rawdha_id, title),
        (None, _) => return Err(NotifyError::MissingRequiredField("rawdhaId")),
        (_, None) => return Err(NotifyError::MissingRequiredField("title")),
    };

    let body = profile
        .body_fields
        .iter()
        .find_map(|field| text_field(data, field))
        .unwrap_or_default();
    let kind = text_field(data, "type").unwrap_or_else(|| profile.default_kind.to_string());

    Ok(NotificationMessage::for_tenant(rawdha_id, title, body, kind))
}

/// Runs one invocation: validate, build and make a single send attempt.
async fn deliver(
    profile: &NotifierProfile,
    gateway: &dyn MessagingGateway,
    event: &TriggerEvent,
) -> Result<(), NotifyError> {
    let data = event.data.as_ref().ok_or(NotifyError::MissingSnapshot)?;
    let message = build_message(profile, data)?;
    debug!(
        handler = profile.name,
        topic = %message.topic(),
        gateway = gateway.name(),
        "Sending notification"
    );
    gateway.send(&message).await?;
    Ok(())
}

/// Runs `deliver` and absorbs every failure into an `Outcome`.
pub(crate) async fn notify(
    profile: &NotifierProfile,
    gateway: &dyn MessagingGateway,
    event: &TriggerEvent,
) -> Outcome {
    match deliver(profile, gateway, event).await {
        Ok(()) => {
            debug!(handler = profile.name, document = %event.document, "Notification sent");
            Outcome::Sent
        }
        Err(NotifyError::MissingSnapshot) => {
            if profile.log_skips {
                info!(handler = profile.name, document = %event.document, "No snapshot data");
            } else {
                debug!(handler = profile.name, document = %event.document, "No snapshot data");
            }
            Outcome::Skipped
        }
        Err(e @ NotifyError::MissingRequiredField(_)) => {
            if profile.log_skips {
                info!(
                    handler = profile.name,
                    document = %event.document,
                    reason = %e,
                    "Missing rawdhaId or title, skipping notification"
                );
            } else {
                debug!(handler = profile.name, document = %event.document, reason = %e, "Skipping notification");
            }
            Outcome::Skipped
        }
        Err(e @ NotifyError::GatewaySendFailure(_)) => {
            error!(handler = profile.name, document = %event.document, error = %e, "FCM error");
            Outcome::Failed
        }
    }
}
