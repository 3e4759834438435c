// Game log data sources: the stats service over HTTP, or local CSV files.
//
// Every source fetches one season at a time; `load_multi_season` stitches
// seasons together and tags each row with its season label. Sources also
// serve team rosters so a player can be picked by team and name.

pub mod csv_file;
pub mod roster;
pub mod stats_api;
pub mod teams;

use async_trait::async_trait;
use tracing::{debug, warn};

use courtside_core::record::RawGameRecord;

pub use csv_file::CsvSource;
pub use roster::{resolve_player, LookupError};
pub use stats_api::StatsApiSource;
pub use teams::{find_team, Team};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("request for season {season} failed: {source}")]
    Http {
        season: String,
        source: reqwest::Error,
    },

    #[error("stats service returned HTTP {status} for season {season}")]
    Status { season: String, status: u16 },

    #[error("unexpected payload for season {season}: {message}")]
    Payload { season: String, message: String },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path} has no {column} column")]
    MissingColumn { path: String, column: &'static str },
}

/// One player on a team roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterPlayer {
    pub id: u32,
    pub name: String,
}

/// Anything that can produce team rosters and one season of a player's
/// game log.
#[async_trait]
pub trait GameLogSource: Send + Sync {
    async fn fetch_season(
        &self,
        player_id: u32,
        season: &str,
    ) -> Result<Vec<RawGameRecord>, SourceError>;

    async fn fetch_roster(&self, team: &Team, season: &str)
        -> Result<Vec<RosterPlayer>, SourceError>;
}

/// Fetch every season in `seasons` and concatenate the rows, tagging each
/// with its season label. A season that fails to load is logged and
/// skipped, so total failure yields an empty log rather than an error.
pub async fn load_multi_season(
    source: &dyn GameLogSource,
    player_id: u32,
    seasons: &[String],
) -> Vec<RawGameRecord> {
    let mut all = Vec::new();
    for season in seasons {
        match source.fetch_season(player_id, season).await {
            Ok(rows) => {
                debug!(player_id, season = %season, rows = rows.len(), "loaded season");
                all.extend(rows.into_iter().map(|r| r.with_season(season.as_str())));
            }
            Err(e) => {
                warn!(player_id, season = %season, "skipping season: {e}");
            }
        }
    }
    all
}
