//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the `commonlog` binary
//! using the `clap` crate. The alert itself (level, message, attachments) is
//! taken from the arguments; the transport overrides are merged on top of the
//! TOML file and environment variables.

use crate::core::AlertLevel;
use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Send one alert to Slack or Lark.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Alert level (info, warn, error). Defaults to error.
    #[arg(short, long, value_name = "LEVEL")]
    pub level: Option<AlertLevel>,

    /// The alert text.
    #[arg(short, long, value_name = "TEXT")]
    pub message: String,

    /// Send to this channel instead of the routed one.
    #[arg(long, value_name = "CHANNEL")]
    pub channel: Option<String>,

    /// Provider override ("slack" or "lark").
    #[arg(long, value_name = "NAME")]
    pub provider: Option<String>,

    /// Send method override (webclient, webhook, http).
    #[arg(long, value_name = "METHOD")]
    pub method: Option<String>,

    /// File whose contents are attached as a trace log.
    #[arg(long, value_name = "FILE")]
    pub trace_file: Option<PathBuf>,

    /// File whose contents are attached inline.
    #[arg(long, value_name = "FILE")]
    pub attachment_file: Option<PathBuf>,

    /// Link attached to the alert.
    #[arg(long, value_name = "URL")]
    pub attachment_url: Option<String>,

    /// Log level filter for the binary's own output.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(provider) = &self.provider {
            dict.insert("provider".into(), Value::from(provider.clone()));
        }

        if let Some(method) = &self.method {
            dict.insert("send_method".into(), Value::from(method.to_lowercase()));
        }

        if let Some(log_level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(log_level.clone()));
        }

        // `--channel` is a per-send override and stays out of the config.

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
