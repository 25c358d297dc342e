// Club report runner.
//
// Startup sequence:
// 1. Initialize tracing (stderr; stdout carries the report)
// 2. Load config
// 3. Build the cached CSV source and the club facade
// 4. Load competitors and matches, print the report
// 5. If refresh_secs > 0, repeat on that interval until Ctrl+C

mod report;

use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use pongboard_club::ClubData;
use pongboard_core::config::{self, Config, ReportFormat};
use pongboard_core::{CsvSource, LoadOptions};
use tracing::info;

use crate::report::{json_report, render_text, Dashboard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: club={}, base_url={}, cache ttl {}s",
        config.source.club, config.source.base_url, config.cache.ttl_secs
    );

    // 3. Build the data source
    let source = CsvSource::from_config(&config).context("failed to build HTTP client")?;
    let club = ClubData::new(source, config.source.clone());
    let mut dashboard = Dashboard::new(club);

    // 4. First run
    run_once(&mut dashboard, &config).await?;

    if config.report.refresh_secs == 0 {
        if dashboard.has_errors() {
            anyhow::bail!("one or more club files could not be loaded");
        }
        return Ok(());
    }

    // 5. Refresh loop
    let period = Duration::from_secs(config.report.refresh_secs);
    info!("Refreshing every {}s, Ctrl+C to stop", period.as_secs());

    let mut ticker = tokio::time::interval(period);
    // The first tick completes immediately and the first run already happened.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => run_once(&mut dashboard, &config).await?,
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for Ctrl+C")?;
                info!("Interrupted, shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn run_once(dashboard: &mut Dashboard, config: &Config) -> anyhow::Result<()> {
    let options = LoadOptions {
        no_cache: config.report.no_cache,
    };
    dashboard.refresh(options).await;

    let now = Utc::now();
    match config.report.format {
        ReportFormat::Text => {
            let text = render_text(dashboard.competitors(), dashboard.teams(), &now)
                .context("failed to render report")?;
            print!("{text}");
        }
        ReportFormat::Json => {
            let report = json_report(dashboard.competitors(), dashboard.teams(), now);
            let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Initialize tracing to stderr so that stdout only carries the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pongboard=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
