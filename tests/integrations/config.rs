//! Tests for layered configuration loading.

use commonlog::cli::Cli;
use commonlog::config::{CacheBackend, Config, SendMethod, WriteFailurePolicy};
use commonlog::{AlertLevel, ChannelResolver};
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

const SAMPLE_CONFIG: &str = r##"
provider = "lark"
send_method = "webclient"
channel = "#fallback"
service_name = "billing"
environment = "prod"

[lark_app]
app_id = "cli_a1"
app_secret = "s3cr3t"

[cache]
backend = "redis"
host = "redis.internal"
port = 6380
db = 2
write_failure = "warn"

[routing]
default_channel = "#billing-general"

[routing.channel_map]
error = "#billing-alerts"
warn = "#billing-warnings"
"##;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn cli_for(file: &NamedTempFile) -> Cli {
    Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    }
}

#[test]
#[serial]
fn test_defaults_without_file() {
    let config = Config::load(&Cli::default()).unwrap();
    assert_eq!(config.provider, "slack");
    assert_eq!(config.send_method, SendMethod::WebClient);
    assert_eq!(config.log_level, "info");
    assert_eq!(config.cache.write_failure, WriteFailurePolicy::Fail);
    assert!(config.channel_resolver.is_none());
}

#[test]
#[serial]
fn test_toml_file_populates_nested_tables() {
    let file = write_config(SAMPLE_CONFIG);
    let config = Config::load(&cli_for(&file)).unwrap();

    assert_eq!(config.provider, "lark");
    assert_eq!(config.service_name, "billing");
    let app = config.lark_app.as_ref().unwrap();
    assert_eq!(app.app_id, "cli_a1");
    assert_eq!(app.app_secret, "s3cr3t");

    assert_eq!(config.cache.backend, CacheBackend::Redis);
    assert_eq!(config.cache.host, "redis.internal");
    assert_eq!(config.cache.port, Some(6380));
    assert_eq!(config.cache.db, 2);
    assert_eq!(config.cache.write_failure, WriteFailurePolicy::Warn);

    let resolver = config.channel_resolver.as_ref().unwrap();
    assert_eq!(resolver.resolve_channel(AlertLevel::Error), "#billing-alerts");
    assert_eq!(resolver.resolve_channel(AlertLevel::Warn), "#billing-warnings");
    assert_eq!(resolver.resolve_channel(AlertLevel::Info), "#billing-general");
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let file = write_config(SAMPLE_CONFIG);
    std::env::set_var("COMMONLOG_CACHE__HOST", "redis.override");
    std::env::set_var("COMMONLOG_SERVICE_NAME", "payments");

    let result = Config::load(&cli_for(&file));

    std::env::remove_var("COMMONLOG_CACHE__HOST");
    std::env::remove_var("COMMONLOG_SERVICE_NAME");

    let config = result.unwrap();
    assert_eq!(config.cache.host, "redis.override");
    assert_eq!(config.cache.port, Some(6380));
    assert_eq!(config.service_name, "payments");
}

#[test]
#[serial]
fn test_command_line_overrides_everything() {
    let file = write_config(SAMPLE_CONFIG);
    std::env::set_var("COMMONLOG_PROVIDER", "lark");

    let cli = Cli {
        provider: Some("slack".to_string()),
        method: Some("Webhook".to_string()),
        log_level: Some("debug".to_string()),
        ..cli_for(&file)
    };
    let result = Config::load(&cli);
    std::env::remove_var("COMMONLOG_PROVIDER");

    let config = result.unwrap();
    assert_eq!(config.provider, "slack");
    assert_eq!(config.send_method, SendMethod::Webhook);
    assert_eq!(config.log_level, "debug");
}

#[test]
#[serial]
fn test_unknown_send_method_is_rejected() {
    let file = write_config("send_method = \"carrier-pigeon\"\n");
    assert!(Config::load(&cli_for(&file)).is_err());
}
