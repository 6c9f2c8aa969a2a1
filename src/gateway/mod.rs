//! Clients for the push-notification service.
//!
//! Every client implements `MessagingGateway` and makes a single delivery
//! attempt per call. Which one is used is decided once at startup.

pub mod fcm;
pub mod logging;
pub mod token;

pub use fcm::FcmGateway;
pub use logging::LoggingGateway;
pub use token::{GcpTokenSource, StaticToken, TokenSource};

use thiserror::Error;

/// Errors returned by a `MessagingGateway`.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request to messaging service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("messaging service rejected the message: status {status}, body: {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to obtain an access token: {0}")]
    Auth(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl GatewayError {
    /// Returns true if the underlying request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Transport(e) if e.is_timeout())
    }
}
