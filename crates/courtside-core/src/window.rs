// Window selection: opponent-filtered or most-recent-N slices of a game log.

use std::collections::BTreeSet;

use tracing::debug;

use crate::normalize::NormalizedGameRecord;

/// Opponent filter value meaning "no opponent filter".
pub const ALL_OPPONENTS: &str = "All";

/// Which slice of the game log to summarize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowMode {
    /// Every game against `opponent`, newest first, optionally capped.
    Opponent { opponent: String, cap: Option<usize> },
    /// The `count` most recent games.
    MostRecent { count: usize },
}

impl WindowMode {
    /// Build the mode from a raw user selection. A missing filter or the
    /// `"All"` sentinel selects the most-recent window.
    pub fn from_selection(
        opponent_filter: Option<&str>,
        lookback_count: usize,
        opponent_cap: Option<usize>,
    ) -> Self {
        match opponent_filter {
            Some(opponent) if opponent != ALL_OPPONENTS => WindowMode::Opponent {
                opponent: opponent.to_string(),
                cap: opponent_cap,
            },
            _ => WindowMode::MostRecent {
                count: lookback_count,
            },
        }
    }
}

/// Records sorted newest first. The sort is stable, so games on the same
/// date keep their input order.
fn newest_first<'a, I>(records: I) -> Vec<NormalizedGameRecord>
where
    I: IntoIterator<Item = &'a NormalizedGameRecord>,
{
    let mut sorted: Vec<NormalizedGameRecord> = records.into_iter().cloned().collect();
    sorted.sort_by(|a, b| b.game_date.cmp(&a.game_date));
    sorted
}

/// Apply a window mode. Never mutates the input; short histories return
/// whatever is available.
pub fn select(records: &[NormalizedGameRecord], mode: &WindowMode) -> Vec<NormalizedGameRecord> {
    let window = match mode {
        WindowMode::Opponent { opponent, cap } => {
            let mut matched =
                newest_first(records.iter().filter(|r| r.opponent() == Some(opponent.as_str())));
            if let Some(cap) = cap {
                matched.truncate(*cap);
            }
            matched
        }
        WindowMode::MostRecent { count } => {
            let mut recent = newest_first(records);
            recent.truncate(*count);
            recent
        }
    };
    debug!(?mode, input = records.len(), selected = window.len(), "selected window");
    window
}

/// Select a window straight from the user's selection.
/// See [`WindowMode::from_selection`].
pub fn select_window(
    records: &[NormalizedGameRecord],
    opponent_filter: Option<&str>,
    lookback_count: usize,
    opponent_cap: Option<usize>,
) -> Vec<NormalizedGameRecord> {
    select(
        records,
        &WindowMode::from_selection(opponent_filter, lookback_count, opponent_cap),
    )
}

/// Sorted, de-duplicated opponent names present in the log.
pub fn opponent_options(records: &[NormalizedGameRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.opponent())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::record::{RawGameRecord, RawStat};

    fn game(day: u32, matchup: &str, pts: f64) -> RawGameRecord {
        RawGameRecord::new(
            format!("2024-01-{day:02}"),
            matchup,
            Some(RawStat::Number(pts)),
            Some(RawStat::Number(30.0)),
        )
    }

    fn ten_games() -> Vec<NormalizedGameRecord> {
        let raw: Vec<_> = (1..=10)
            .map(|d| {
                let m = if d % 2 == 0 { "LAL vs. BOS" } else { "LAL @ NYK" };
                game(d, m, d as f64)
            })
            .collect();
        normalize(&raw, 5.0).unwrap()
    }

    fn days(window: &[NormalizedGameRecord]) -> Vec<u32> {
        use chrono::Datelike;
        window.iter().map(|r| r.game_date.day()).collect()
    }

    #[test]
    fn lookback_larger_than_history_returns_all_sorted() {
        let records = ten_games();
        let window = select_window(&records, None, 15, None);
        assert_eq!(window.len(), 10);
        assert_eq!(days(&window), vec![10, 9, 8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn lookback_truncates_to_most_recent() {
        let window = select_window(&ten_games(), Some(ALL_OPPONENTS), 3, None);
        assert_eq!(days(&window), vec![10, 9, 8]);
    }

    #[test]
    fn opponent_filter_ignores_lookback() {
        let window = select_window(&ten_games(), Some("BOS"), 2, None);
        assert_eq!(days(&window), vec![10, 8, 6, 4, 2]);
        assert!(window.iter().all(|r| r.opponent() == Some("BOS")));
    }

    #[test]
    fn opponent_cap_applies() {
        let window = select_window(&ten_games(), Some("NYK"), 15, Some(2));
        assert_eq!(days(&window), vec![9, 7]);
    }

    #[test]
    fn unknown_opponent_is_empty() {
        assert!(select_window(&ten_games(), Some("MIA"), 15, None).is_empty());
    }

    #[test]
    fn input_is_not_reordered() {
        let records = ten_games();
        let before = records.clone();
        let _ = select_window(&records, None, 5, None);
        assert_eq!(records, before);
    }

    #[test]
    fn same_day_games_keep_input_order() {
        let raw = vec![game(1, "A vs. B", 1.0), game(1, "A vs. C", 2.0), game(2, "A vs. D", 3.0)];
        let window = select_window(&normalize(&raw, 0.0).unwrap(), None, 10, None);
        let opps: Vec<_> = window.iter().filter_map(|r| r.opponent()).collect();
        assert_eq!(opps, vec!["D", "B", "C"]);
    }

    #[test]
    fn mode_from_selection() {
        assert_eq!(
            WindowMode::from_selection(Some("All"), 15, Some(5)),
            WindowMode::MostRecent { count: 15 }
        );
        assert_eq!(
            WindowMode::from_selection(None, 7, None),
            WindowMode::MostRecent { count: 7 }
        );
        assert_eq!(
            WindowMode::from_selection(Some("BOS"), 15, Some(5)),
            WindowMode::Opponent {
                opponent: "BOS".into(),
                cap: Some(5)
            }
        );
    }

    #[test]
    fn opponent_options_sorted_unique() {
        let raw = vec![
            game(1, "A vs. NYK", 1.0),
            game(2, "A @ BOS", 1.0),
            game(3, "A vs. NYK", 1.0),
            game(4, "A v. MIA", 1.0),
        ];
        let records = normalize(&raw, 0.0).unwrap();
        assert_eq!(opponent_options(&records), vec!["BOS", "NYK"]);
    }
}
