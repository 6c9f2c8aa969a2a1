//! Notifies a school's topic when a generic notification document is saved.

use super::{notify, NotifierProfile};
use crate::core::{DocumentHandler, MessagingGateway, Outcome, TriggerEvent};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

// No `content` fallback here; generic documents only carry `body`.
const PROFILE: NotifierProfile = NotifierProfile {
    name: "general",
    body_fields: &["body"],
    default_kind: "general",
    log_skips: false,
};

/// Handler for documents created in the notifications collection.
pub struct GenericNotificationNotifier {
    gateway: Arc<dyn MessagingGateway>,
}

impl GenericNotificationNotifier {
    pub fn new(gateway: Arc<dyn MessagingGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl DocumentHandler for GenericNotificationNotifier {
    fn name(&self) -> &str {
        PROFILE.name
    }

    #[instrument(skip_all, fields(handler = PROFILE.name, document = %event.document))]
    async fn on_created(&self, event: &TriggerEvent) -> Outcome {
        notify(&PROFILE, self.gateway.as_ref(), event).await
    }
}
