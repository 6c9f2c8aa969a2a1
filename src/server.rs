//! # Event Server
//!
//! The HTTP surface of the trigger runtime. The hosting platform posts one
//! request per created document to `/v1/events`; the response is written
//! once the matching handler has finished.

use crate::core::{DocumentData, Outcome};
use crate::trigger::TriggerRegistry;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, trace};

/// A document-created notification from the hosting platform.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentCreated {
    /// Full document path, e.g. `announcements/abc123`.
    pub document: String,
    /// The new document's fields; absent or `null` when there is no snapshot.
    #[serde(default)]
    pub data: Option<DocumentData>,
}

/// Body of a `202 Accepted` reply.
#[derive(Debug, Serialize, PartialEq)]
pub struct DispatchResponse {
    pub handler: String,
    pub outcome: Outcome,
}

/// Builds the router for the event endpoint.
pub fn router(registry: Arc<TriggerRegistry>) -> Router {
    Router::new()
        .route("/v1/events", post(receive_event))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(registry)
}

async fn receive_event(
    State(registry): State<Arc<TriggerRegistry>>,
    Json(event): Json<DocumentCreated>,
) -> Response {
    match registry.dispatch(&event.document, event.data).await {
        Some((handler, outcome)) => (
            StatusCode::ACCEPTED,
            Json(DispatchResponse { handler, outcome }),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("no trigger registered for `{}`", event.document)
            })),
        )
            .into_response(),
    }
}

/// Serves the event endpoint until the shutdown signal fires and every
/// open request has been answered.
pub struct EventServer {
    listener: TcpListener,
    registry: Arc<TriggerRegistry>,
    shutdown_rx: watch::Receiver<bool>,
}

impl EventServer {
    pub fn new(
        listener: TcpListener,
        registry: Arc<TriggerRegistry>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            listener,
            registry,
            shutdown_rx,
        }
    }

    /// Returns a future that runs the server until a shutdown signal is received.
    pub fn run(self) -> impl Future<Output = ()> {
        let EventServer {
            listener,
            registry,
            mut shutdown_rx,
        } = self;
        let app = router(registry);

        async move {
            if let Ok(addr) = listener.local_addr() {
                info!(%addr, "Event server listening");
            }
            // In-flight events run to completion before the server returns.
            let shutdown = async move {
                shutdown_rx.changed().await.ok();
                trace!("Event server received shutdown signal.");
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("Event server error: {}", e);
            }
            trace!("Event server task finished.");
        }
    }
}
