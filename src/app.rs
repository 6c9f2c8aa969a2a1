//! The main application logic, decoupled from the entry point.

use crate::{
    config::Config,
    core::MessagingGateway,
    gateway::{FcmGateway, GcpTokenSource, LoggingGateway, StaticToken, TokenSource},
    handlers::{AnnouncementNotifier, GenericNotificationNotifier},
    internal_metrics::{Metrics, MetricsBuilder},
    server::EventServer,
    task_manager::TaskManager,
    trigger::TriggerRegistry,
};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// A handle to the running application, containing all its task handles.
pub struct App {
    task_manager: TaskManager,
    event_addr: SocketAddr,
    metrics_addr: Option<SocketAddr>,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    /// The address the event endpoint is bound to.
    pub fn event_addr(&self) -> SocketAddr {
        self.event_addr
    }

    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        self.metrics_addr
    }

    /// Waits for the shutdown signal and then gracefully shuts down all tasks.
    pub async fn run(self) -> Result<()> {
        let mut shutdown_rx = self.task_manager.get_shutdown_rx();
        shutdown_rx.changed().await.ok();
        info!("Shutdown signal received. Waiting for tasks to complete...");

        self.task_manager.shutdown().await;
        Ok(())
    }
}

/// Builder for the main application.
///
/// Separates constructing the components from running them, and lets tests
/// replace the messaging gateway.
pub struct AppBuilder {
    config: Config,
    gateway_override: Option<Arc<dyn MessagingGateway>>,
    metrics_override: Option<Metrics>,
}

impl AppBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            gateway_override: None,
            metrics_override: None,
        }
    }

    /// Overrides the messaging gateway for testing.
    pub fn gateway_override(mut self, gateway: Arc<dyn MessagingGateway>) -> Self {
        self.gateway_override = Some(gateway);
        self
    }

    /// Overrides the metrics system for testing.
    pub fn metrics_override(mut self, metrics: Metrics) -> Self {
        self.metrics_override = Some(metrics);
        self
    }

    /// Builds and initializes all application components, returning a runnable `App`.
    #[instrument(skip_all)]
    pub async fn build(self, shutdown_rx: watch::Receiver<bool>) -> Result<App> {
        let config = self.config;
        let task_manager = TaskManager::new(shutdown_rx);

        // =========================================================================
        // 1. Initialize Metrics
        // =========================================================================
        let (metrics, metrics_server_info) = match self.metrics_override {
            Some(m) => (m, None),
            None => MetricsBuilder::new(config.metrics.clone()).build(task_manager.get_shutdown_rx())?,
        };
        let metrics = Arc::new(metrics);
        let metrics_addr = if let Some((server, addr)) = metrics_server_info {
            task_manager.spawn("MetricsServer", server.run());
            Some(addr)
        } else {
            None
        };

        // =========================================================================
        // 2. Messaging Gateway
        // =========================================================================
        let gateway: Arc<dyn MessagingGateway> = match self.gateway_override {
            Some(gateway) => gateway,
            None => build_gateway(&config).await?,
        };
        debug!(gateway = gateway.name(), "Messaging gateway ready");

        // =========================================================================
        // 3. Register Handlers
        // =========================================================================
        let mut registry = TriggerRegistry::new(metrics.clone());
        registry
            .on_document_created(
                &config.triggers.announcements,
                Arc::new(AnnouncementNotifier::new(gateway.clone())),
            )
            .context("invalid announcements trigger pattern")?;
        registry
            .on_document_created(
                &config.triggers.notifications,
                Arc::new(GenericNotificationNotifier::new(gateway)),
            )
            .context("invalid notifications trigger pattern")?;
        let registry = Arc::new(registry);

        // =========================================================================
        // 4. Event Server
        // =========================================================================
        let listener = TcpListener::bind(config.server.listen_address)
            .await
            .with_context(|| format!("failed to bind {}", config.server.listen_address))?;
        let event_addr = listener.local_addr()?;
        let server = EventServer::new(listener, registry, task_manager.get_shutdown_rx());
        task_manager.spawn("EventServer", server.run());

        info!(%event_addr, "rawdha-notify initialized. Waiting for document events...");

        Ok(App {
            task_manager,
            event_addr,
            metrics_addr,
        })
    }
}

/// Chooses the gateway implementation from the messaging configuration.
async fn build_gateway(config: &Config) -> Result<Arc<dyn MessagingGateway>> {
    let messaging = &config.messaging;
    if messaging.dry_run {
        info!("Dry run enabled. Notifications will be logged, not sent.");
        return Ok(Arc::new(LoggingGateway));
    }

    let project_id = messaging
        .project_id
        .as_deref()
        .context("messaging.project_id is required")?;
    let tokens: Arc<dyn TokenSource> = match messaging.access_token.as_deref() {
        Some(token) if !token.is_empty() => {
            info!("Using the configured access token. It will not be refreshed.");
            Arc::new(StaticToken::new(token))
        }
        _ => Arc::new(
            GcpTokenSource::new()
                .await
                .context("failed to load Google application default credentials")?,
        ),
    };
    let gateway = FcmGateway::new(&messaging.endpoint, project_id, tokens, messaging.timeout())?;
    Ok(Arc::new(gateway))
}
