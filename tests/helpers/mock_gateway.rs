#![allow(dead_code)]
//! A mock messaging gateway for testing handler integration.

use async_trait::async_trait;
use rawdha_notify::core::{MessagingGateway, NotificationMessage};
use rawdha_notify::gateway::GatewayError;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Debug, Default)]
pub struct MockGateway {
    sent: Arc<Mutex<Vec<NotificationMessage>>>,
    reject_with: Option<u16>,
    delay: Option<Duration>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose every send is rejected with `status`.
    pub fn rejecting(status: u16) -> Self {
        Self {
            reject_with: Some(status),
            ..Self::default()
        }
    }

    /// A gateway that takes `delay` to complete each send.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn sent_messages(&self) -> Vec<NotificationMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingGateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, message: &NotificationMessage) -> Result<(), GatewayError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sent.lock().unwrap().push(message.clone());
        match self.reject_with {
            Some(status) => Err(GatewayError::Rejected {
                status,
                body: "rejected by mock".to_string(),
            }),
            None => Ok(()),
        }
    }
}
