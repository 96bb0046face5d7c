//! commonlog - send one alert from the command line.

use anyhow::{Context, Result};
use clap::Parser;
use commonlog::{cli::Cli, config::Config, AlertLevel, Attachment, Logger};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        // Manually initialize logging for this specific error
        tracing_subscriber::fmt().init();
        error!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        provider = %config.provider,
        method = %config.send_method,
        service = %config.service_name,
        environment = %config.environment,
        "commonlog starting"
    );

    let attachment = build_attachment(&cli)?;
    let trace = match &cli.trace_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read trace file {}", path.display()))?,
        None => String::new(),
    };

    let level = cli.level.unwrap_or(AlertLevel::Error);
    let channel = cli.channel.clone().unwrap_or_default();

    let logger = Logger::new(config);
    logger
        .send_to_channel(level, &cli.message, attachment.as_ref(), &trace, &channel)
        .await
        .context("failed to send alert")?;

    info!(level = %level, "Alert dispatched");
    Ok(())
}

fn build_attachment(cli: &Cli) -> Result<Option<Attachment>> {
    let mut attachment = Attachment::default();

    if let Some(path) = &cli.attachment_file {
        attachment.content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read attachment {}", path.display()))?;
        attachment.file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    if let Some(url) = &cli.attachment_url {
        attachment.url = url.clone();
    }

    if attachment == Attachment::default() {
        Ok(None)
    } else {
        Ok(Some(attachment))
    }
}
