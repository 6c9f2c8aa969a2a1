use rawdha_notify::cli::Cli;
use rawdha_notify::config::Config;
use std::io::Write;
use std::net::SocketAddr;
use tempfile::NamedTempFile;

fn cli_for(toml_content: &str) -> (NamedTempFile, Cli) {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", toml_content).unwrap();
    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    (file, cli)
}

#[test]
fn test_load_full_valid_config() {
    let (_file, cli) = cli_for(
        r#"
        log_level = "debug"
        [server]
        listen_address = "127.0.0.1:8181"
        [messaging]
        endpoint = "http://localhost:9999"
        project_id = "rawdha-prod"
        access_token = "secret"
        timeout_ms = 2500
        [triggers]
        announcements = "schools/{schoolId}/announcements/{id}"
        [metrics]
        enabled = true
        listen_address = "127.0.0.1:9191"
    "#,
    );

    let config = Config::load(&cli).unwrap();

    assert_eq!(config.log_level, "debug");
    assert_eq!(
        config.server.listen_address,
        "127.0.0.1:8181".parse::<SocketAddr>().unwrap()
    );
    assert_eq!(config.messaging.endpoint, "http://localhost:9999");
    assert_eq!(config.messaging.project_id.as_deref(), Some("rawdha-prod"));
    assert_eq!(config.messaging.access_token.as_deref(), Some("secret"));
    assert_eq!(config.messaging.timeout_ms, 2500);
    assert!(!config.messaging.dry_run);
    assert_eq!(
        config.triggers.announcements,
        "schools/{schoolId}/announcements/{id}"
    );
    // Not in the toml, so it should be the default value
    assert_eq!(config.triggers.notifications, "notifications/{notificationId}");
    assert!(config.metrics.enabled);
}

#[test]
fn test_dry_run_defaults_load_without_credentials() {
    let (_file, cli) = cli_for(
        r#"
        [messaging]
        dry_run = true
    "#,
    );

    let config = Config::load(&cli).unwrap();

    let mut expected = Config::default();
    expected.messaging.dry_run = true;
    assert_eq!(config, expected);
}

#[test]
fn test_cli_flags_override_file() {
    let (_file, mut cli) = cli_for(
        r#"
        log_level = "warn"
        [server]
        listen_address = "127.0.0.1:8181"
        [messaging]
        project_id = "from-file"
        access_token = "secret"
    "#,
    );
    cli.listen_address = Some("127.0.0.1:7000".parse().unwrap());
    cli.project_id = Some("from-cli".to_string());
    cli.log_level = Some("trace".to_string());

    let config = Config::load(&cli).unwrap();

    assert_eq!(config.log_level, "trace");
    assert_eq!(config.server.listen_address.port(), 7000);
    assert_eq!(config.messaging.project_id.as_deref(), Some("from-cli"));
}

#[test]
fn test_cli_dry_run_flag() {
    let (_file, mut cli) = cli_for("");
    cli.dry_run = true;

    let config = Config::load(&cli).unwrap();

    assert!(config.messaging.dry_run);
}

#[test]
fn test_missing_project_fails_validation() {
    let (_file, cli) = cli_for(
        r#"
        [messaging]
        access_token = "secret"
    "#,
    );

    let err = Config::load(&cli).unwrap_err();

    assert!(err.to_string().contains("project_id"));
}

#[test]
fn test_access_token_is_optional() {
    // Without a fixed token the gateway uses application default credentials.
    let (_file, cli) = cli_for(
        r#"
        [messaging]
        project_id = "rawdha-prod"
    "#,
    );

    let config = Config::load(&cli).unwrap();

    assert_eq!(config.messaging.project_id.as_deref(), Some("rawdha-prod"));
    assert_eq!(config.messaging.access_token, None);
}

#[test]
fn test_invalid_value_type() {
    let (_file, cli) = cli_for(
        r#"
        [messaging]
        dry_run = true
        timeout_ms = "fast"
    "#,
    );

    assert!(Config::load(&cli).is_err());
}

#[test]
fn test_invalid_listen_address() {
    let (_file, cli) = cli_for(
        r#"
        [messaging]
        dry_run = true
        [server]
        listen_address = "not-an-address"
    "#,
    );

    assert!(Config::load(&cli).is_err());
}
