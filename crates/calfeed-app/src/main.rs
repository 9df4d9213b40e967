use std::io::Write;
use std::time::Duration;

use calfeed_core::config::{OutputFormat, load_config};
use calfeed_service::agenda::group_by_day;
use calfeed_service::feed::{FeedOptions, HttpFeedFetcher, fetch_events};
use chrono::{Days, Local};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

mod render;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let config = load_config()?;

    tracing::debug!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let fetcher = HttpFeedFetcher::new(Duration::from_secs(config.fetch.timeout_secs))?;
    let options = FeedOptions::from_settings(&config);

    let events = fetch_events(
        &fetcher,
        &config.feeds,
        config.window.days_before,
        config.window.days_ahead,
        &options,
    )
    .await?;

    let mut out = std::io::stdout().lock();
    match config.output.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &events)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            let today = Local::now().date_naive();
            let first = today
                .checked_sub_days(Days::new(u64::from(config.window.days_before)))
                .unwrap_or(today);
            let last = today
                .checked_add_days(Days::new(u64::from(config.window.days_ahead)))
                .unwrap_or(today);

            let days: Vec<_> = group_by_day(&events, &Local)
                .into_iter()
                .filter(|day| day.date >= first && day.date <= last)
                .collect();
            render::write_agenda(&mut out, &days, &Local)?;
        }
    }

    Ok(())
}
