// Courtside entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file)
// 2. Load config
// 3. Work out which seasons to load
// 4. Build the configured game log source
// 5. Resolve the player from the team roster
// 6. Run the report (and the per-opponent breakdown if enabled) and print

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use tracing::info;
use tracing_subscriber::EnvFilter;

use courtside_app::config::{self, OutputFormat, SourceConfig, SourceKind};
use courtside_app::dashboard::Dashboard;
use courtside_app::report::{self, DashboardQuery, DashboardReport};
use courtside_app::source::{CsvSource, GameLogSource, StatsApiSource};
use courtside_core::season::past_seasons;

const LOG_FILE: &str = "courtside.log";
const DEFAULT_FILTER: &str = "courtside=info,courtside_app=info,courtside_core=info,warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    let cwd = std::env::current_dir().context("failed to read working directory")?;
    let log_path = init_tracing(&cwd.join("logs"))?;
    info!("courtside starting up, logging to {}", log_path.display());

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: player={} ({}), line={}, lookback={}, seasons={}",
        config.player.name,
        config.player.team,
        config.query.over_under_line,
        config.query.lookback_games,
        config.query.seasons_back
    );

    // 3. Seasons to load
    let seasons = past_seasons(config.query.seasons_back, Local::now().date_naive());
    info!("Loading seasons {}", seasons.join(", "));

    // 4. Source
    let source = build_source(&config.source).context("failed to build game log source")?;

    // 5. Player
    let dashboard = Dashboard::open(source, &config.player.team, &config.player.name, seasons)
        .await
        .context("failed to resolve player")?;

    // 6. Reports
    let query = DashboardQuery::from(&config.query);
    let mut reports = vec![dashboard
        .report(&query)
        .await
        .context("failed to normalize game log")?];
    if config.output.opponent_breakdown {
        reports.extend(
            dashboard
                .opponent_breakdown(&query)
                .await
                .context("failed to build opponent breakdown")?,
        );
    }
    print_reports(&reports, config.output.format)?;

    info!("courtside finished");
    Ok(())
}

fn build_source(cfg: &SourceConfig) -> anyhow::Result<Arc<dyn GameLogSource>> {
    let source: Arc<dyn GameLogSource> = match cfg.kind {
        SourceKind::Http => Arc::new(StatsApiSource::new(
            &cfg.base_url,
            &cfg.season_type,
            Duration::from_secs(cfg.timeout_secs),
        )?),
        SourceKind::Csv => Arc::new(CsvSource::new(&cfg.csv_dir)),
    };
    Ok(source)
}

/// Text reports are separated by a blank line; JSON is a single array when
/// there is more than one report.
fn print_reports(reports: &[DashboardReport], format: OutputFormat) -> anyhow::Result<()> {
    match (format, reports) {
        (OutputFormat::Text, _) => {
            let text: Vec<String> = reports.iter().map(report::render_text).collect();
            print!("{}", text.join("\n"));
        }
        (OutputFormat::Json, [single]) => {
            println!(
                "{}",
                report::render_json(single).context("failed to serialize report")?
            );
        }
        (OutputFormat::Json, many) => {
            println!(
                "{}",
                serde_json::to_string_pretty(many).context("failed to serialize reports")?
            );
        }
    }
    Ok(())
}

/// Send tracing output to `<log_dir>/courtside.log` so stdout carries only
/// the report. `RUST_LOG` overrides the default filter. Returns the log path.
fn init_tracing(log_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join(LOG_FILE);
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("failed to create {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {e}"))?;

    Ok(log_path)
}
