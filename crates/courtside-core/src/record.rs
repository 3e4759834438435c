// Raw game-log rows as handed over by a data source.

use serde::{Deserialize, Serialize};

/// A raw stat cell. Stats services and CSV exports disagree on whether
/// numbers arrive as numbers or as text, so both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawStat {
    Number(f64),
    Text(String),
}

impl RawStat {
    /// Coerce to a finite number. Empty, non-numeric, and non-finite input
    /// all yield `None`.
    pub fn coerce(&self) -> Option<f64> {
        let value = match self {
            RawStat::Number(n) => *n,
            RawStat::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()?
            }
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for RawStat {
    fn from(n: f64) -> Self {
        RawStat::Number(n)
    }
}

impl From<&str> for RawStat {
    fn from(s: &str) -> Self {
        RawStat::Text(s.to_string())
    }
}

/// One game as reported by the data source, before any parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGameRecord {
    /// Game date text, expected as `YYYY-MM-DD`.
    pub game_date: String,
    /// Matchup text such as `"LAL vs. BOS"` or `"LAL @ BOS"`.
    pub matchup: String,
    #[serde(default)]
    pub points: Option<RawStat>,
    #[serde(default)]
    pub minutes: Option<RawStat>,
    /// Season label such as `"2023-24"`, set when logs from several seasons
    /// are combined.
    #[serde(default)]
    pub season: Option<String>,
}

impl RawGameRecord {
    /// Convenience constructor used by sources and tests.
    pub fn new(
        game_date: impl Into<String>,
        matchup: impl Into<String>,
        points: Option<RawStat>,
        minutes: Option<RawStat>,
    ) -> Self {
        Self {
            game_date: game_date.into(),
            matchup: matchup.into(),
            points,
            minutes,
            season: None,
        }
    }

    /// Return a copy tagged with the given season label.
    pub fn with_season(mut self, season: impl Into<String>) -> Self {
        self.season = Some(season.into());
        self
    }
}
