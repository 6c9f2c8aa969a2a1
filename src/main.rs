//! rawdha-notify - push notifications for newly created school documents.

use anyhow::Result;
use clap::Parser;
use rawdha_notify::{app::App, cli::Cli, config::Config};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            tracing_subscriber::fmt().init();
            error!("Failed to load configuration: {:#}", err);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("rawdha-notify starting up...");
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("Listen Address: {}", config.server.listen_address);
    info!("Announcements Trigger: {}", config.triggers.announcements);
    info!("Notifications Trigger: {}", config.triggers.notifications);
    if config.messaging.dry_run {
        info!("Messaging: Dry run (notifications are logged only)");
    } else {
        info!("Messaging Endpoint: {}", config.messaging.endpoint);
        info!(
            "Messaging Project: {}",
            config.messaging.project_id.as_deref().unwrap_or("-")
        );
        info!("Messaging Timeout: {}ms", config.messaging.timeout_ms);
    }
    info!(
        "Metrics: {}",
        if config.metrics.enabled {
            config.metrics.listen_address.to_string()
        } else {
            "Disabled".to_string()
        }
    );
    info!("-------------------------------------------------------");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let app = App::builder(config).build(shutdown_rx).await?;
    let app_handle = tokio::spawn(app.run());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Shutting down gracefully...");
    let _ = shutdown_tx.send(true);

    app_handle.await??;
    info!("All tasks shut down. Exiting.");
    Ok(())
}
