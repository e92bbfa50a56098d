use anyhow::{Context, Result};
use clap::Parser;
use seeklyzer::app_log;
use seeklyzer::pipeline_cli::{handle_pipeline_command, Cli, Command};
use seeklyzer::{core::ConfigManager, start_web_server};
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "/tmp/seeklyzer.log";
const DEFAULT_LOG_FILTER: &str = "seeklyzer=info,rocket::server=off";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path =
        std::env::var("SEEKLYZER_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Invalid log filter")?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    let config = ConfigManager::load()?;
    config.ensure_directories().await?;

    app_log!(info, "Environment: {}", config.environment_name);
    app_log!(info, "Data: {}", config.environment.data_path.display());
    app_log!(info, "Logging to {}", log_path);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => start_web_server(config).await,
        Command::Pipeline { step } => handle_pipeline_command(&config, step).await,
    }
}
