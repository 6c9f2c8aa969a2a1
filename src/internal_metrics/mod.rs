//! # Internal Metrics Module
//!
//! - **`Metrics`**: a cloneable handle used by the trigger registry to count
//!   dispatched events by handler and outcome.
//!
//! - **`MetricsBuilder`**: installs the Prometheus recorder and prepares the
//!   `MetricsServer` (defined in `server.rs`) that exposes `/metrics`.

use crate::config::MetricsConfig;
use crate::core::Outcome;
use crate::internal_metrics::server::MetricsServer;
use anyhow::Result;
use metrics::{Counter, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::error;

pub mod server;

/// The public API for the metrics system.
#[derive(Clone)]
pub struct Metrics {
    pub trigger_events_unmatched_total: Counter,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    /// Creates a new `Metrics` instance and registers descriptions for all
    /// supported metrics with the global recorder.
    pub fn new() -> Self {
        metrics::describe_counter!("trigger_events_total", Unit::Count, "Document-creation events handled, labeled by handler and outcome.");
        metrics::describe_counter!("trigger_events_unmatched_total", Unit::Count, "Events whose document path matched no subscription.");
        metrics::describe_histogram!("gateway_send_duration_seconds", Unit::Seconds, "Latency of a single send call to the messaging service.");

        Self {
            trigger_events_unmatched_total: metrics::counter!("trigger_events_unmatched_total"),
        }
    }

    /// Creates a `Metrics` instance that records nothing of interest.
    /// Used when metrics are disabled in the configuration.
    pub fn disabled() -> Self {
        Self {
            trigger_events_unmatched_total: metrics::counter!("disabled"),
        }
    }

    /// Counts one handled event.
    pub fn record_outcome(&self, handler: &str, outcome: Outcome) {
        metrics::counter!(
            "trigger_events_total",
            "handler" => handler.to_string(),
            "outcome" => outcome.as_str()
        )
        .increment(1);
    }
}

/// Builder for the metrics system.
pub struct MetricsBuilder {
    config: MetricsConfig,
}

impl MetricsBuilder {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Installs the Prometheus recorder and binds the metrics listener.
    ///
    /// Returns a disabled `Metrics` and no server when metrics are turned off
    /// or the recorder cannot be installed.
    pub fn build(
        self,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Result<(Metrics, Option<(MetricsServer, SocketAddr)>)> {
        if !self.config.enabled {
            return Ok((Metrics::disabled(), None));
        }

        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
            )?
            .build_recorder();
        let handle = recorder.handle();

        let listener = std::net::TcpListener::bind(self.config.listen_address)?;
        let addr = listener.local_addr()?;
        listener.set_nonblocking(true)?;
        let listener = TcpListener::from_std(listener)?;

        if let Err(e) = metrics::set_global_recorder(recorder) {
            error!("Failed to install Prometheus recorder: {}", e);
            return Ok((Metrics::disabled(), None));
        }

        let metrics = Metrics::new();
        let server = MetricsServer::new(listener, handle, shutdown_rx);
        Ok((metrics, Some((server, addr))))
    }
}
