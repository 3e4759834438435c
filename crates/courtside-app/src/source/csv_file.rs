// Local CSV files laid out like the stats service's responses:
//
//   <dir>/<player_id>/<season>.csv        GAME_DATE, MATCHUP, PTS, MIN
//   <dir>/rosters/<season>/<TEAM>.csv     PLAYER, PLAYER_ID
//
// Extra columns are ignored; a missing required column fails the file.

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use courtside_core::record::{RawGameRecord, RawStat};

use super::{GameLogSource, RosterPlayer, SourceError, Team};

const GAME_COLUMNS: &[&str] = &["GAME_DATE", "MATCHUP", "PTS", "MIN"];
const ROSTER_COLUMNS: &[&str] = &["PLAYER", "PLAYER_ID"];

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawCsvGame {
    GAME_DATE: String,
    MATCHUP: String,
    #[serde(default)]
    PTS: Option<String>,
    #[serde(default)]
    MIN: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawCsvRosterEntry {
    PLAYER: String,
    PLAYER_ID: u32,
}

/// Open a CSV reader and make sure the header row names every column in
/// `required`. Rows that fail later are per-row problems; a bad header
/// means the whole file is the wrong shape.
fn checked_reader<R: Read>(
    rdr: R,
    path: &str,
    required: &[&'static str],
) -> Result<csv::Reader<R>, SourceError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader.headers().map_err(|e| SourceError::Csv {
        path: path.to_string(),
        source: e,
    })?;
    if let Some(column) = required.iter().find(|c| !headers.iter().any(|h| h.trim() == **c)) {
        return Err(SourceError::MissingColumn {
            path: path.to_string(),
            column,
        });
    }
    Ok(reader)
}

fn load_games_from_reader<R: Read>(rdr: R, path: &str) -> Result<Vec<RawGameRecord>, SourceError> {
    let mut reader = checked_reader(rdr, path, GAME_COLUMNS)?;
    let mut games = Vec::new();
    for result in reader.deserialize::<RawCsvGame>() {
        match result {
            Ok(raw) => games.push(RawGameRecord::new(
                raw.GAME_DATE,
                raw.MATCHUP.trim(),
                raw.PTS.map(RawStat::Text),
                raw.MIN.map(RawStat::Text),
            )),
            Err(e) => {
                warn!("skipping malformed game row in {path}: {e}");
            }
        }
    }
    Ok(games)
}

fn load_roster_from_reader<R: Read>(rdr: R, path: &str) -> Result<Vec<RosterPlayer>, SourceError> {
    let mut reader = checked_reader(rdr, path, ROSTER_COLUMNS)?;
    let mut players = Vec::new();
    for result in reader.deserialize::<RawCsvRosterEntry>() {
        match result {
            Ok(raw) => players.push(RosterPlayer {
                id: raw.PLAYER_ID,
                name: raw.PLAYER.trim().to_string(),
            }),
            Err(e) => {
                warn!("skipping malformed roster row in {path}: {e}");
            }
        }
    }
    Ok(players)
}

async fn read_text(path: &Path) -> Result<String, SourceError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SourceError::Io {
            path: path.display().to_string(),
            source: e,
        })
}

/// Load one game log CSV file.
pub async fn load_game_log(path: &Path) -> Result<Vec<RawGameRecord>, SourceError> {
    let text = read_text(path).await?;
    load_games_from_reader(text.as_bytes(), &path.display().to_string())
}

/// Load one roster CSV file.
pub async fn load_roster(path: &Path) -> Result<Vec<RosterPlayer>, SourceError> {
    let text = read_text(path).await?;
    load_roster_from_reader(text.as_bytes(), &path.display().to_string())
}

pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn season_path(&self, player_id: u32, season: &str) -> PathBuf {
        self.dir
            .join(player_id.to_string())
            .join(format!("{season}.csv"))
    }

    pub fn roster_path(&self, team: &Team, season: &str) -> PathBuf {
        self.dir
            .join("rosters")
            .join(season)
            .join(format!("{}.csv", team.abbreviation))
    }
}

#[async_trait]
impl GameLogSource for CsvSource {
    async fn fetch_season(
        &self,
        player_id: u32,
        season: &str,
    ) -> Result<Vec<RawGameRecord>, SourceError> {
        load_game_log(&self.season_path(player_id, season)).await
    }

    async fn fetch_roster(
        &self,
        team: &Team,
        season: &str,
    ) -> Result<Vec<RosterPlayer>, SourceError> {
        load_roster(&self.roster_path(team, season)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::find_team;

    #[test]
    fn csv_rows_with_extra_columns() {
        let csv_data = "\
SEASON_ID,GAME_DATE,MATCHUP,WL,MIN,PTS,REB
22023,2024-04-14,LAL @ NOP,W,41,28,8
22023,2024-04-12,LAL vs. MEM,W,35,,6";

        let games = load_games_from_reader(csv_data.as_bytes(), "test.csv").unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].game_date, "2024-04-14");
        assert_eq!(games[0].matchup, "LAL @ NOP");
        assert_eq!(games[0].points, Some(RawStat::Text("28".into())));
        assert_eq!(games[0].minutes, Some(RawStat::Text("41".into())));
        assert_eq!(games[1].points, None);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let csv_data = "\
GAME_DATE,MATCHUP,MIN,PTS
2024-04-14,LAL @ NOP,41,28
2024-04-12";

        let games = load_games_from_reader(csv_data.as_bytes(), "test.csv").unwrap();
        assert_eq!(games.len(), 1);
    }

    #[test]
    fn wrong_header_fails_the_file() {
        let csv_data = "\
DATE,OPP,MIN,PTS
2024-04-14,LAL @ NOP,41,28
2024-04-12,LAL vs. MEM,35,20";

        match load_games_from_reader(csv_data.as_bytes(), "test.csv").unwrap_err() {
            SourceError::MissingColumn { path, column } => {
                assert_eq!(path, "test.csv");
                assert_eq!(column, "GAME_DATE");
            }
            other => panic!("expected MissingColumn, got: {other}"),
        }
    }

    #[test]
    fn empty_file_fails_the_file() {
        assert!(matches!(
            load_games_from_reader("".as_bytes(), "empty.csv"),
            Err(SourceError::MissingColumn { .. })
        ));
    }

    #[test]
    fn roster_rows() {
        let csv_data = "\
TeamID,SEASON,PLAYER,NUM,POSITION,PLAYER_ID
1610612747,2023,LeBron James,23,F,2544
1610612747,2023,Anthony Davis,3,F-C,203076
1610612747,2023,Broken Row,0,G,not-a-number";

        let roster = load_roster_from_reader(csv_data.as_bytes(), "LAL.csv").unwrap();
        assert_eq!(
            roster,
            vec![
                RosterPlayer { id: 2544, name: "LeBron James".into() },
                RosterPlayer { id: 203076, name: "Anthony Davis".into() },
            ]
        );
    }

    #[test]
    fn roster_without_ids_fails() {
        let csv_data = "PLAYER\nLeBron James";
        match load_roster_from_reader(csv_data.as_bytes(), "LAL.csv").unwrap_err() {
            SourceError::MissingColumn { column, .. } => assert_eq!(column, "PLAYER_ID"),
            other => panic!("expected MissingColumn, got: {other}"),
        }
    }

    #[test]
    fn path_layout() {
        let src = CsvSource::new("data/gamelogs");
        assert_eq!(
            src.season_path(2544, "2023-24"),
            PathBuf::from("data/gamelogs/2544/2023-24.csv")
        );
        let lakers = find_team("LAL").unwrap();
        assert_eq!(
            src.roster_path(lakers, "2023-24"),
            PathBuf::from("data/gamelogs/rosters/2023-24/LAL.csv")
        );
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let src = CsvSource::new(std::env::temp_dir().join("courtside_csv_missing_dir"));
        match src.fetch_season(1, "2023-24").await.unwrap_err() {
            SourceError::Io { path, .. } => assert!(path.ends_with("2023-24.csv")),
            other => panic!("expected Io, got: {other}"),
        }
    }

    #[tokio::test]
    async fn wrong_header_season_is_an_error_not_an_empty_log() {
        let dir = std::env::temp_dir().join("courtside_csv_wrong_header");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("7")).unwrap();
        std::fs::write(
            dir.join("7").join("2023-24.csv"),
            "DATE,OPP,MIN,PTS\n2024-04-14,LAL @ NOP,41,28\n2024-04-12,LAL vs. MEM,35,20\n",
        )
        .unwrap();

        let src = CsvSource::new(&dir);
        let result = src.fetch_season(7, "2023-24").await;
        assert!(matches!(result, Err(SourceError::MissingColumn { column: "GAME_DATE", .. })));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
