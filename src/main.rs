use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

use gitfleet::cli::Cli;
use gitfleet::config::Config;
use gitfleet::repo::Registry;

fn setup_logging(debug: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gitfleet")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("gitfleet.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Pipe(target));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.debug)?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let registry = Registry::from_config(&config).context("Failed to build repository registry")?;

    info!("Running command: {:?}", cli.command);
    let failures = gitfleet::commands::run(&cli, &config, &registry)
        .await
        .context("Command failed")?;

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
