#![allow(dead_code)]
//! Test helpers for running the full application instance.

use anyhow::Result;
use rawdha_notify::{
    app::AppBuilder, config::Config, core::MessagingGateway, internal_metrics::Metrics,
};
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle, time::timeout};

/// A running instance of the application for testing purposes.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown_tx: watch::Sender<bool>,
    app_handle: JoinHandle<Result<()>>,
}

impl TestApp {
    /// Posts a document-created event and returns the status and JSON body.
    pub async fn post_event(&self, event: Value) -> Result<(u16, Value)> {
        let response = self
            .client
            .post(format!("http://{}/v1/events", self.addr))
            .json(&event)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    /// Shuts down the application and waits for it to terminate.
    pub async fn shutdown(self, timeout_duration: Duration) -> Result<()> {
        self.shutdown_tx.send(true)?;
        match timeout(timeout_duration, self.app_handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(anyhow::anyhow!("App failed to shut down within the timeout")),
        }
    }
}

/// A builder for creating `TestApp` instances.
pub struct TestAppBuilder {
    pub config: Config,
    gateway: Option<Arc<dyn MessagingGateway>>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.listen_address = ([127, 0, 0, 1], 0).into();
        config.messaging.project_id = Some("test-project".to_string());
        config.messaging.access_token = Some("test-token".to_string());
        Self {
            config,
            gateway: None,
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn MessagingGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_config_modifier(mut self, modify: impl FnOnce(&mut Config)) -> Self {
        modify(&mut self.config);
        self
    }

    pub async fn build(self) -> Result<TestApp> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut builder = AppBuilder::new(self.config).metrics_override(Metrics::disabled());
        if let Some(gateway) = self.gateway {
            builder = builder.gateway_override(gateway);
        }
        let app = builder.build(shutdown_rx).await?;
        let addr = app.event_addr();
        let app_handle = tokio::spawn(app.run());

        Ok(TestApp {
            addr,
            client: reqwest::Client::new(),
            shutdown_tx,
            app_handle,
        })
    }
}
