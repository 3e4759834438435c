// Game log normalization: raw rows -> typed records with derived fields.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::record::RawGameRecord;
use crate::season::season_end_year;

/// The single date convention accepted for raw game dates.
pub const GAME_DATE_FORMAT: &str = "%Y-%m-%d";

const HOME_MARKER: &str = "vs. ";
const AWAY_MARKER: &str = "@ ";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("malformed game date {value:?} in row {row} (expected YYYY-MM-DD)")]
    MalformedDate { row: usize, value: String },
}

// ---------------------------------------------------------------------------
// Matchup parsing
// ---------------------------------------------------------------------------

/// Opponent and venue extracted from matchup text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Matchup {
    Matched { opponent: String, is_home: bool },
    /// Text matched neither `"vs. X"` nor `"@ X"` (neutral site, postponed
    /// game notation, empty cell, ...).
    Unmatched,
}

impl Matchup {
    pub fn opponent(&self) -> Option<&str> {
        match self {
            Matchup::Matched { opponent, .. } => Some(opponent),
            Matchup::Unmatched => None,
        }
    }

    pub fn is_home(&self) -> bool {
        matches!(self, Matchup::Matched { is_home: true, .. })
    }
}

/// Parse matchup text such as `"LAL vs. BOS"` (home) or `"LAL @ BOS"` (away).
///
/// Whichever marker occurs first wins; the opponent is the trimmed rest of
/// the text after it.
pub fn parse_matchup(text: &str) -> Matchup {
    let home = text.find(HOME_MARKER).map(|i| (i, HOME_MARKER, true));
    let away = text.find(AWAY_MARKER).map(|i| (i, AWAY_MARKER, false));

    let hit = match (home, away) {
        (Some(h), Some(a)) => Some(if a.0 < h.0 { a } else { h }),
        (h, a) => h.or(a),
    };

    let Some((idx, marker, is_home)) = hit else {
        return Matchup::Unmatched;
    };

    let opponent = text[idx + marker.len()..].trim();
    if opponent.is_empty() {
        return Matchup::Unmatched;
    }
    Matchup::Matched {
        opponent: opponent.to_string(),
        is_home,
    }
}

// ---------------------------------------------------------------------------
// Normalized record
// ---------------------------------------------------------------------------

/// A game with typed fields and the per-game derived values charts use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedGameRecord {
    pub game_date: NaiveDate,
    pub matchup: Matchup,
    pub points: Option<f64>,
    pub minutes: Option<f64>,
    /// `points / minutes`; `None` when either is missing or minutes is zero.
    pub points_per_minute: Option<f64>,
    /// Points strictly above the over/under line.
    pub over_line: bool,
    pub season_label: Option<String>,
}

impl NormalizedGameRecord {
    pub fn opponent(&self) -> Option<&str> {
        self.matchup.opponent()
    }

    pub fn is_home(&self) -> bool {
        self.matchup.is_home()
    }

    /// Both points and minutes are present.
    pub fn is_complete(&self) -> bool {
        self.points.is_some() && self.minutes.is_some()
    }

    /// Short axis label: `"Jan 05 24'"`, where the suffix is the season's
    /// end year (or the game's own year when no season is attached).
    pub fn date_label(&self) -> String {
        let year = self
            .season_label
            .as_deref()
            .and_then(season_end_year)
            .unwrap_or_else(|| self.game_date.year());
        format!("{} {:02}'", self.game_date.format("%b %d"), year.rem_euclid(100))
    }
}

fn parse_game_date(row: usize, text: &str) -> Result<NaiveDate, NormalizeError> {
    NaiveDate::parse_from_str(text.trim(), GAME_DATE_FORMAT).map_err(|_| {
        NormalizeError::MalformedDate {
            row,
            value: text.to_string(),
        }
    })
}

fn points_per_minute(points: Option<f64>, minutes: Option<f64>) -> Option<f64> {
    match (points, minutes) {
        (Some(p), Some(m)) if m != 0.0 => Some(p / m),
        _ => None,
    }
}

/// Normalize raw rows against the given over/under line.
///
/// Output order matches input order. The first unparseable date aborts the
/// whole batch; rows are never dropped here.
pub fn normalize(
    raw_records: &[RawGameRecord],
    over_under_line: f64,
) -> Result<Vec<NormalizedGameRecord>, NormalizeError> {
    let mut out = Vec::with_capacity(raw_records.len());
    let mut unmatched = 0usize;

    for (row, raw) in raw_records.iter().enumerate() {
        let game_date = parse_game_date(row, &raw.game_date)?;
        let matchup = parse_matchup(&raw.matchup);
        if matchup == Matchup::Unmatched {
            unmatched += 1;
        }
        let points = raw.points.as_ref().and_then(|s| s.coerce());
        let minutes = raw.minutes.as_ref().and_then(|s| s.coerce());

        out.push(NormalizedGameRecord {
            game_date,
            matchup,
            points,
            minutes,
            points_per_minute: points_per_minute(points, minutes),
            over_line: points.is_some_and(|p| p > over_under_line),
            season_label: raw.season.clone(),
        });
    }

    if unmatched > 0 {
        warn!(unmatched, "matchup text without a recognizable opponent");
    }
    debug!(rows = out.len(), over_under_line, "normalized game log");
    Ok(out)
}

/// Drop rows missing points or minutes.
///
/// Callers whose data source guarantees complete rows can skip this; it is
/// never applied implicitly by [`normalize`].
pub fn retain_complete(records: Vec<NormalizedGameRecord>) -> Vec<NormalizedGameRecord> {
    let before = records.len();
    let kept: Vec<_> = records.into_iter().filter(|r| r.is_complete()).collect();
    if kept.len() < before {
        debug!(removed = before - kept.len(), "dropped incomplete game rows");
    }
    kept
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawStat;

    fn raw(date: &str, matchup: &str, pts: &str, min: &str) -> RawGameRecord {
        RawGameRecord::new(date, matchup, Some(RawStat::from(pts)), Some(RawStat::from(min)))
    }

    // -- Matchup parsing --

    #[test]
    fn home_matchup() {
        let m = parse_matchup("LAL vs. BOS");
        assert_eq!(m.opponent(), Some("BOS"));
        assert!(m.is_home());
    }

    #[test]
    fn away_matchup() {
        let m = parse_matchup("LAL @ BOS");
        assert_eq!(m.opponent(), Some("BOS"));
        assert!(!m.is_home());
    }

    #[test]
    fn unrecognized_matchup_is_unmatched() {
        assert_eq!(parse_matchup("LAL v BOS"), Matchup::Unmatched);
        assert_eq!(parse_matchup(""), Matchup::Unmatched);
        assert!(!parse_matchup("LAL - BOS").is_home());
    }

    #[test]
    fn marker_without_opponent_is_unmatched() {
        assert_eq!(parse_matchup("LAL vs. "), Matchup::Unmatched);
        assert_eq!(parse_matchup("LAL @  "), Matchup::Unmatched);
    }

    #[test]
    fn leftmost_marker_wins() {
        let m = parse_matchup("LAL @ vs. BOS");
        assert_eq!(m.opponent(), Some("vs. BOS"));
        assert!(!m.is_home());
    }

    // -- Normalization --

    #[test]
    fn derives_fields() {
        let out = normalize(&[raw("2024-01-01", "A vs. B", "22", "34")], 20.0).unwrap();
        assert_eq!(out.len(), 1);
        let r = &out[0];
        assert_eq!(r.game_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(r.opponent(), Some("B"));
        assert!(r.is_home());
        assert_eq!(r.points, Some(22.0));
        assert_eq!(r.minutes, Some(34.0));
        assert!((r.points_per_minute.unwrap() - 22.0 / 34.0).abs() < 1e-12);
        assert!(r.over_line);
    }

    #[test]
    fn over_line_is_strict() {
        let out = normalize(
            &[
                raw("2024-01-01", "A vs. B", "20.5", "30"),
                raw("2024-01-02", "A vs. B", "21", "30"),
            ],
            20.5,
        )
        .unwrap();
        assert!(!out[0].over_line);
        assert!(out[1].over_line);
    }

    #[test]
    fn zero_minutes_has_no_rate() {
        let out = normalize(&[raw("2024-01-01", "A @ B", "0", "0")], 10.0).unwrap();
        assert_eq!(out[0].minutes, Some(0.0));
        assert_eq!(out[0].points_per_minute, None);
    }

    #[test]
    fn missing_stats_propagate_as_none() {
        let rec = RawGameRecord::new("2024-01-01", "A @ B", None, Some(RawStat::from("DNP")));
        let out = normalize(&[rec], 10.0).unwrap();
        assert_eq!(out[0].points, None);
        assert_eq!(out[0].minutes, None);
        assert_eq!(out[0].points_per_minute, None);
        assert!(!out[0].over_line);
    }

    #[test]
    fn malformed_date_fails_with_row() {
        let err = normalize(
            &[raw("2024-01-01", "A vs. B", "1", "1"), raw("01/03/2024", "A vs. B", "1", "1")],
            0.0,
        )
        .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::MalformedDate {
                row: 1,
                value: "01/03/2024".into()
            }
        );
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(normalize(&[], 20.5).unwrap().is_empty());
    }

    #[test]
    fn preserves_input_order_and_length() {
        let input = vec![
            raw("2024-01-05", "A vs. B", "10", "20"),
            raw("2024-01-01", "A @ C", "12", "22"),
            raw("2024-01-03", "A vs. D", "14", "24"),
        ];
        let out = normalize(&input, 11.0).unwrap();
        let dates: Vec<_> = out.iter().map(|r| r.game_date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-05", "2024-01-01", "2024-01-03"]);
    }

    #[test]
    fn retain_complete_drops_partial_rows() {
        let input = vec![
            raw("2024-01-01", "A vs. B", "10", "20"),
            raw("2024-01-02", "A vs. B", "", "20"),
            raw("2024-01-03", "A vs. B", "10", ""),
        ];
        let kept = retain_complete(normalize(&input, 5.0).unwrap());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].game_date.to_string(), "2024-01-01");
    }

    // -- Date labels --

    #[test]
    fn date_label_uses_season_end_year() {
        let rec = raw("2023-11-05", "A vs. B", "1", "1").with_season("2023-24");
        let out = normalize(&[rec], 0.0).unwrap();
        assert_eq!(out[0].date_label(), "Nov 05 24'");
    }

    #[test]
    fn date_label_falls_back_to_game_year() {
        let out = normalize(&[raw("2024-01-05", "A vs. B", "1", "1")], 0.0).unwrap();
        assert_eq!(out[0].date_label(), "Jan 05 24'");
    }
}
