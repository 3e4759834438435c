// Summary statistics over a selected window: means, over-rate, trend fit.

use serde::Serialize;
use tracing::debug;

use crate::normalize::NormalizedGameRecord;

/// Minute variance at or below this is treated as zero.
const VARIANCE_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Trend fit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrendError {
    #[error("insufficient data for a trend fit: {reason} ({usable} usable game(s))")]
    InsufficientData { usable: usize, reason: &'static str },
}

const TOO_FEW_GAMES: &str = "fewer than two games with points and minutes";
const CONSTANT_MINUTES: &str = "minutes do not vary";

/// Least-squares line of points as a function of minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn predict(&self, minutes: f64) -> f64 {
        self.slope * minutes + self.intercept
    }
}

/// Fit points against minutes over records that have both values.
///
/// Needs at least two such records with differing minutes.
pub fn fit_trend(window: &[NormalizedGameRecord]) -> Result<TrendLine, TrendError> {
    let pairs: Vec<(f64, f64)> = window
        .iter()
        .filter_map(|r| Some((r.minutes?, r.points?)))
        .collect();
    let usable = pairs.len();
    if usable < 2 {
        return Err(TrendError::InsufficientData {
            usable,
            reason: TOO_FEW_GAMES,
        });
    }

    let n = usable as f64;
    let x_mean = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let y_mean = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in &pairs {
        let dx = x - x_mean;
        sxx += dx * dx;
        sxy += dx * (y - y_mean);
    }
    if sxx / n <= VARIANCE_EPSILON {
        return Err(TrendError::InsufficientData {
            usable,
            reason: CONSTANT_MINUTES,
        });
    }

    let slope = sxy / sxx;
    Ok(TrendLine {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

impl Serialize for TrendError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Aggregates over one window. Every optional field is `None` when the
/// window holds no usable value for it; check `sample_size` first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub sample_size: usize,
    pub mean_points: Option<f64>,
    pub mean_minutes: Option<f64>,
    /// Percentage (0-100) of games with points that went over the line.
    pub over_rate: Option<f64>,
    pub trend: Result<TrendLine, TrendError>,
}

impl SummaryStatistics {
    pub fn is_empty(&self) -> bool {
        self.sample_size == 0
    }
}

fn mean<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Mean points over games with a points value.
pub fn mean_points(window: &[NormalizedGameRecord]) -> Option<f64> {
    mean(window.iter().filter_map(|r| r.points))
}

pub fn summarize(window: &[NormalizedGameRecord]) -> SummaryStatistics {
    let with_points: Vec<&NormalizedGameRecord> =
        window.iter().filter(|r| r.points.is_some()).collect();
    let over_rate = (!with_points.is_empty()).then(|| {
        let overs = with_points.iter().filter(|r| r.over_line).count();
        overs as f64 / with_points.len() as f64 * 100.0
    });

    let summary = SummaryStatistics {
        sample_size: window.len(),
        mean_points: mean_points(window),
        mean_minutes: mean(window.iter().filter_map(|r| r.minutes)),
        over_rate,
        trend: fit_trend(window),
    };
    debug!(
        sample_size = summary.sample_size,
        has_trend = summary.trend.is_ok(),
        "summarized window"
    );
    summary
}
