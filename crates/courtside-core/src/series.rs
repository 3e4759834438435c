// Per-chart data series derived from a selected window.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::normalize::NormalizedGameRecord;
use crate::summary::{fit_trend, mean_points, TrendLine};

/// Points-vs-minutes scatter with the fitted line's endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    /// `(minutes, points)` for games with both values.
    pub points: Vec<(f64, f64)>,
    pub trend: Option<TrendLine>,
    /// Line evaluated at the smallest and largest minutes; `None` without a
    /// trend.
    pub trend_endpoints: Option<[(f64, f64); 2]>,
}

pub fn scatter_with_trend(window: &[NormalizedGameRecord]) -> ScatterSeries {
    let points: Vec<(f64, f64)> = window
        .iter()
        .filter_map(|r| Some((r.minutes?, r.points?)))
        .collect();
    let trend = fit_trend(window).ok();

    let trend_endpoints = trend.map(|line| {
        let lo = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let hi = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        [(lo, line.predict(lo)), (hi, line.predict(hi))]
    });

    ScatterSeries {
        points,
        trend,
        trend_endpoints,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deviation {
    pub game_date: NaiveDate,
    pub label: String,
    pub deviation: f64,
}

/// Each game's points minus the window's mean points, in window order.
/// Games without points are skipped; empty when the mean is undefined.
pub fn deviation_from_mean(window: &[NormalizedGameRecord]) -> Vec<Deviation> {
    let Some(mean) = mean_points(window) else {
        return Vec::new();
    };
    window
        .iter()
        .filter_map(|r| {
            Some(Deviation {
                game_date: r.game_date,
                label: r.date_label(),
                deviation: r.points? - mean,
            })
        })
        .collect()
}

/// Over vs. not-over counts among games with points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverUnderSplit {
    pub over: usize,
    pub under: usize,
}

pub fn over_under_split(window: &[NormalizedGameRecord]) -> OverUnderSplit {
    window
        .iter()
        .filter(|r| r.points.is_some())
        .fold(OverUnderSplit::default(), |mut split, r| {
            if r.over_line {
                split.over += 1;
            } else {
                split.under += 1;
            }
            split
        })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpponentEfficiency {
    pub opponent: String,
    pub games: usize,
    /// Mean points per minute over games where it is defined.
    pub mean_points_per_minute: Option<f64>,
}

/// Efficiency heatmap rows, one per opponent, sorted by opponent name.
/// Games with an unmatched matchup are left out.
pub fn efficiency_by_opponent(window: &[NormalizedGameRecord]) -> Vec<OpponentEfficiency> {
    let mut groups: BTreeMap<&str, (usize, f64, usize)> = BTreeMap::new();
    for r in window {
        let Some(opponent) = r.opponent() else {
            continue;
        };
        let entry = groups.entry(opponent).or_insert((0, 0.0, 0));
        entry.0 += 1;
        if let Some(ppm) = r.points_per_minute {
            entry.1 += ppm;
            entry.2 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(opponent, (games, sum, rated))| OpponentEfficiency {
            opponent: opponent.to_string(),
            games,
            mean_points_per_minute: (rated > 0).then(|| sum / rated as f64),
        })
        .collect()
}
