mod app;
mod ui;

use anyhow::Result;
use std::fs::{self, OpenOptions};

use courtside_core::{
    config::{self, AppConfig},
    Schedule, Source,
};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let source = Source::from_config(&config.fetch);
    let label = source.describe();
    let schedule = Schedule::from_config(&config.poll);
    tracing::info!(
        source = %label,
        active_secs = schedule.active().as_secs(),
        full_secs = schedule.full().as_secs(),
        "starting scoreboard"
    );

    let mut app = app::ScoreboardApp::new(source, label, schedule);
    app.run().await
}

// The terminal belongs to the UI, so logs only go to a file.
fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("courtside.log");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
