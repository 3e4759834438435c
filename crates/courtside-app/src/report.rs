// Dashboard report: runs the normalize -> window -> summarize pipeline for
// one query and renders the result as text or JSON.

use std::fmt;

use serde::Serialize;
use tracing::info;

use courtside_core::normalize::{normalize, retain_complete, NormalizeError, NormalizedGameRecord};
use courtside_core::record::RawGameRecord;
use courtside_core::series::{
    deviation_from_mean, efficiency_by_opponent, over_under_split, scatter_with_trend, Deviation,
    OpponentEfficiency, OverUnderSplit, ScatterSeries,
};
use courtside_core::summary::{summarize, SummaryStatistics};
use courtside_core::window::{opponent_options, select, WindowMode};

use crate::config::QueryConfig;

pub const NO_DATA_MESSAGE: &str = "No data available for this player across selected seasons.";

/// The user-adjustable parameters for one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardQuery {
    pub over_under_line: f64,
    pub lookback_games: usize,
    pub seasons_back: usize,
    pub opponent: Option<String>,
    pub opponent_cap: Option<usize>,
}

impl From<&QueryConfig> for DashboardQuery {
    fn from(q: &QueryConfig) -> Self {
        Self {
            over_under_line: q.over_under_line,
            lookback_games: q.lookback_games,
            seasons_back: q.seasons_back,
            opponent: q.opponent_filter().map(str::to_string),
            opponent_cap: q.opponent_cap,
        }
    }
}

impl DashboardQuery {
    fn window_mode(&self) -> WindowMode {
        WindowMode::from_selection(
            self.opponent.as_deref(),
            self.lookback_games,
            self.opponent_cap,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub scatter: ScatterSeries,
    pub deviations: Vec<Deviation>,
    pub over_under: OverUnderSplit,
    pub efficiency: Vec<OpponentEfficiency>,
}

/// One windowed game plus its display label (`"Jan 05 24'"`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowRow {
    #[serde(flatten)]
    pub record: NormalizedGameRecord,
    pub label: String,
}

impl From<NormalizedGameRecord> for WindowRow {
    fn from(record: NormalizedGameRecord) -> Self {
        let label = record.date_label();
        Self { record, label }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub player: String,
    pub query: DashboardQuery,
    /// Opponents available for filtering, across the whole loaded log.
    pub opponent_options: Vec<String>,
    pub headline: String,
    pub hit_rate_line: Option<String>,
    pub note: Option<String>,
    pub window: Vec<WindowRow>,
    pub summary: Option<SummaryStatistics>,
    pub charts: Option<ChartSeries>,
}

fn no_data(player: &str, query: &DashboardQuery) -> DashboardReport {
    DashboardReport {
        player: player.to_string(),
        query: query.clone(),
        opponent_options: Vec::new(),
        headline: NO_DATA_MESSAGE.to_string(),
        hit_rate_line: None,
        note: None,
        window: Vec::new(),
        summary: None,
        charts: None,
    }
}

/// Build the report for `player` from a raw multi-season log.
///
/// Rows missing points or minutes are dropped before windowing. An empty
/// log produces the "no data" report; only malformed dates are errors.
pub fn build_report(
    player: &str,
    raw: &[RawGameRecord],
    query: &DashboardQuery,
) -> Result<DashboardReport, NormalizeError> {
    if raw.is_empty() {
        info!(player, "no game log rows loaded");
        return Ok(no_data(player, query));
    }

    let records = retain_complete(normalize(raw, query.over_under_line)?);
    let options = opponent_options(&records);
    let window = select(&records, &query.window_mode());
    let summary = summarize(&window);

    let headline = match (summary.mean_points, summary.mean_minutes) {
        (Some(pts), Some(min)) => format!(
            "{player} averages {pts:.1} PPG and {min:.1} minutes over the last {} games.",
            summary.sample_size
        ),
        _ => match &query.opponent {
            Some(opp) => format!("{player} has no games against {opp} in the selected seasons."),
            None => NO_DATA_MESSAGE.to_string(),
        },
    };
    let hit_rate_line = summary.over_rate.map(|rate| {
        format!(
            "Over Line Hit Rate: {rate:.0}% (Line: {} points)",
            query.over_under_line
        )
    });
    let note = query.opponent.as_ref().map(|opp| {
        format!(
            "Showing all games against {opp} across last {} seasons",
            query.seasons_back
        )
    });

    let charts = ChartSeries {
        scatter: scatter_with_trend(&window),
        deviations: deviation_from_mean(&window),
        over_under: over_under_split(&window),
        efficiency: efficiency_by_opponent(&window),
    };

    info!(
        player,
        loaded = raw.len(),
        usable = records.len(),
        window = window.len(),
        "built dashboard report"
    );

    Ok(DashboardReport {
        player: player.to_string(),
        query: query.clone(),
        opponent_options: options,
        headline,
        hit_rate_line,
        note,
        window: window.into_iter().map(WindowRow::from).collect(),
        summary: Some(summary),
        charts: Some(charts),
    })
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.decimals$}"))
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.headline)?;
        if let Some(line) = &self.hit_rate_line {
            writeln!(f, "{line}")?;
        }
        if let Some(note) = &self.note {
            writeln!(f, "{note}")?;
        }

        let Some(summary) = &self.summary else {
            return Ok(());
        };

        match &summary.trend {
            Ok(line) => writeln!(
                f,
                "Trend: points = {:.2} x minutes {:+.2}",
                line.slope, line.intercept
            )?,
            Err(e) => writeln!(f, "Trend: unavailable ({e})")?,
        }

        if !self.window.is_empty() {
            writeln!(f)?;
            writeln!(
                f,
                "{:<11} {:<10} {:>5} {:>5} {:>7}  OVER",
                "DATE", "OPP", "PTS", "MIN", "PTS/MIN"
            )?;
            for row in &self.window {
                let game = &row.record;
                let opponent = match game.opponent() {
                    Some(opp) if game.is_home() => format!("vs. {opp}"),
                    Some(opp) => format!("@ {opp}"),
                    None => "?".to_string(),
                };
                writeln!(
                    f,
                    "{:<11} {:<10} {:>5} {:>5} {:>7}  {}",
                    row.label,
                    opponent,
                    fmt_opt(game.points, 0),
                    fmt_opt(game.minutes, 0),
                    fmt_opt(game.points_per_minute, 2),
                    if game.over_line { "yes" } else { "no" }
                )?;
            }
        }

        if let Some(charts) = &self.charts {
            writeln!(f)?;
            writeln!(
                f,
                "Over/Under: {} over, {} under",
                charts.over_under.over, charts.over_under.under
            )?;
            for row in &charts.efficiency {
                writeln!(
                    f,
                    "  {:<6} {:>2} games  {} pts/min",
                    row.opponent,
                    row.games,
                    fmt_opt(row.mean_points_per_minute, 2)
                )?;
            }
        }

        Ok(())
    }
}

/// Plain-text rendering for the terminal.
pub fn render_text(report: &DashboardReport) -> String {
    report.to_string()
}

pub fn render_json(report: &DashboardReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
