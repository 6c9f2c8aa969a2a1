//! Notifies a school's topic when an announcement is created.

use super::{notify, NotifierProfile};
use crate::core::{DocumentHandler, MessagingGateway, Outcome, TriggerEvent};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

const PROFILE: NotifierProfile = NotifierProfile {
    name: "announcement",
    body_fields: &["body", "content"],
    default_kind: "announcement",
    log_skips: true,
};

/// Handler for documents created in the announcements collection.
pub struct AnnouncementNotifier {
    gateway: Arc<dyn MessagingGateway>,
}

impl AnnouncementNotifier {
    pub fn new(gateway: Arc<dyn MessagingGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl DocumentHandler for AnnouncementNotifier {
    fn name(&self) -> &str {
        PROFILE.name
    }

    #[instrument(skip_all, fields(handler = PROFILE.name, document = %event.document))]
    async fn on_created(&self, event: &TriggerEvent) -> Outcome {
        notify(&PROFILE, self.gateway.as_ref(), event).await
    }
}
