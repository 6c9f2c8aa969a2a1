//! Sources of OAuth2 bearer tokens for the FCM API.
//!
//! `FcmGateway` asks its `TokenSource` for a token on every send, so a
//! source that refreshes keeps a long-running process authorized after the
//! first token expires.

use crate::gateway::GatewayError;
use async_trait::async_trait;
use std::sync::Arc;

/// The OAuth2 scope required by `messages:send`.
pub const FIREBASE_MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Hands out a currently valid bearer token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, GatewayError>;
}

/// A fixed token, used when `messaging.access_token` is configured.
///
/// It is never refreshed and stops working once it expires.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, GatewayError> {
        Ok(self.0.clone())
    }
}

/// Tokens minted from Google application default credentials.
///
/// `gcp_auth` caches each token and fetches a new one shortly before it
/// expires.
pub struct GcpTokenSource {
    provider: Arc<dyn gcp_auth::TokenProvider>,
}

impl GcpTokenSource {
    /// Discovers credentials from the environment: a service-account key in
    /// `GOOGLE_APPLICATION_CREDENTIALS`, the gcloud CLI, or the metadata
    /// server.
    pub async fn new() -> Result<Self, GatewayError> {
        let provider = gcp_auth::provider()
            .await
            .map_err(|e| GatewayError::Auth(Box::new(e)))?;
        Ok(Self { provider })
    }
}

#[async_trait]
impl TokenSource for GcpTokenSource {
    async fn access_token(&self) -> Result<String, GatewayError> {
        let token = self
            .provider
            .token(&[FIREBASE_MESSAGING_SCOPE])
            .await
            .map_err(|e| GatewayError::Auth(Box::new(e)))?;
        Ok(token.as_str().to_string())
    }
}
