//! Command-Line Interface (CLI) argument parsing.
//!
//! The arguments are parsed at startup and merged over the configuration
//! from the TOML file and environment variables.

use clap::Parser;
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Forwards newly created school documents to push-notification topics.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address for the inbound event endpoint.
    #[arg(long, value_name = "ADDR")]
    pub listen_address: Option<SocketAddr>,

    /// Logging level (overridden by RUST_LOG).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log notifications instead of sending them.
    #[arg(long)]
    pub dry_run: bool,

    /// Firebase project id used for sending.
    #[arg(long, value_name = "ID")]
    pub project_id: Option<String>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut server = Dict::new();
        if let Some(addr) = self.listen_address {
            server.insert("listen_address".into(), Value::from(addr.to_string()));
        }

        // `--dry-run` can only switch dry-run mode on.
        let mut messaging = Dict::new();
        if self.dry_run {
            messaging.insert("dry_run".into(), Value::from(true));
        }
        if let Some(project_id) = &self.project_id {
            messaging.insert("project_id".into(), Value::from(project_id.clone()));
        }

        let mut dict = Dict::new();
        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }
        if !server.is_empty() {
            dict.insert("server".into(), Value::Dict(Tag::Default, server));
        }
        if !messaging.is_empty() {
            dict.insert("messaging".into(), Value::Dict(Tag::Default, messaging));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
