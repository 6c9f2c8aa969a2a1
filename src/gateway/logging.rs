//! A gateway that logs messages instead of delivering them.
//!
//! Used for dry runs and local development, where no credentials for the
//! push service are available.

use crate::core::{MessagingGateway, NotificationMessage};
use crate::gateway::GatewayError;
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct LoggingGateway;

#[async_trait]
impl MessagingGateway for LoggingGateway {
    fn name(&self) -> &str {
        "logging"
    }

    async fn send(&self, message: &NotificationMessage) -> Result<(), GatewayError> {
        let payload = serde_json::to_string(message)?;
        info!(topic = %message.topic(), %payload, "Dry run: notification not delivered");
        Ok(())
    }
}
