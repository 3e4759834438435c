// Stats service client for the player game log and team roster endpoints.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use courtside_core::normalize::GAME_DATE_FORMAT;
use courtside_core::record::{RawGameRecord, RawStat};

use super::{GameLogSource, RosterPlayer, SourceError, Team};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const GAME_LOG_ENDPOINT: &str = "playergamelog";
const ROSTER_ENDPOINT: &str = "commonteamroster";

/// Date format used by the game log endpoint, e.g. `"APR 14, 2024"`.
const SERVICE_DATE_FORMAT: &str = "%b %d, %Y";

// The service rejects requests that do not look like they come from a
// browser on its own site.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
const REFERER: &str = "https://www.nba.com/";
const ORIGIN: &str = "https://www.nba.com";

const COL_GAME_DATE: &str = "GAME_DATE";
const COL_MATCHUP: &str = "MATCHUP";
const COL_POINTS: &str = "PTS";
const COL_MINUTES: &str = "MIN";
const COL_PLAYER: &str = "PLAYER";
const COL_PLAYER_ID: &str = "PLAYER_ID";

// ---------------------------------------------------------------------------
// Payload structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "resultSets")]
    result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    headers: Vec<String>,
    #[serde(rename = "rowSet")]
    row_set: Vec<Vec<Value>>,
}

// ---------------------------------------------------------------------------
// StatsApiSource
// ---------------------------------------------------------------------------

pub struct StatsApiSource {
    http: reqwest::Client,
    base_url: String,
    season_type: String,
}

impl StatsApiSource {
    pub fn new(
        base_url: &str,
        season_type: &str,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            season_type: season_type.to_string(),
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    /// GET one endpoint and return the body of a successful response.
    async fn get_body(
        &self,
        endpoint: &str,
        season: &str,
        query: &[(&str, String)],
    ) -> Result<String, SourceError> {
        let http_err = |e: reqwest::Error| SourceError::Http {
            season: season.to_string(),
            source: e,
        };

        let response = self
            .http
            .get(self.endpoint(endpoint))
            .header("Referer", REFERER)
            .header("Origin", ORIGIN)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await
            .map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                season: season.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(http_err)
    }
}

#[async_trait]
impl GameLogSource for StatsApiSource {
    async fn fetch_season(
        &self,
        player_id: u32,
        season: &str,
    ) -> Result<Vec<RawGameRecord>, SourceError> {
        let query = [
            ("PlayerID", player_id.to_string()),
            ("Season", season.to_string()),
            ("SeasonType", self.season_type.clone()),
        ];
        let body = self.get_body(GAME_LOG_ENDPOINT, season, &query).await?;
        let rows = parse_game_log(season, &body)?;
        debug!(player_id, season, rows = rows.len(), "fetched game log");
        Ok(rows)
    }

    async fn fetch_roster(
        &self,
        team: &Team,
        season: &str,
    ) -> Result<Vec<RosterPlayer>, SourceError> {
        let query = [
            ("TeamID", team.id.to_string()),
            ("Season", season.to_string()),
        ];
        let body = self.get_body(ROSTER_ENDPOINT, season, &query).await?;
        let players = parse_roster(season, &body)?;
        debug!(team = team.abbreviation, season, players = players.len(), "fetched roster");
        Ok(players)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Convert the service's `"APR 14, 2024"` dates to `YYYY-MM-DD`. Anything
/// else is passed through untouched so normalization reports it.
fn convert_date(text: &str) -> String {
    NaiveDate::parse_from_str(text.trim(), SERVICE_DATE_FORMAT)
        .map(|d| d.format(GAME_DATE_FORMAT).to_string())
        .unwrap_or_else(|_| text.to_string())
}

fn stat_cell(value: Option<&Value>) -> Option<RawStat> {
    match value? {
        Value::Number(n) => n.as_f64().map(RawStat::Number),
        Value::String(s) => Some(RawStat::Text(s.clone())),
        _ => None,
    }
}

fn text_cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Decode a response body and take its first result set.
fn first_result_set(season: &str, body: &str) -> Result<ResultSet, SourceError> {
    let response: StatsResponse = serde_json::from_str(body)
        .map_err(|e| payload_err(season, format!("invalid JSON: {e}")))?;
    response
        .result_sets
        .into_iter()
        .next()
        .ok_or_else(|| payload_err(season, "no result sets".into()))
}

fn payload_err(season: &str, message: String) -> SourceError {
    SourceError::Payload {
        season: season.to_string(),
        message,
    }
}

impl ResultSet {
    fn column(&self, season: &str, name: &str) -> Result<usize, SourceError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| payload_err(season, format!("missing column {name}")))
    }
}

/// Parse a game log response body into raw records.
pub fn parse_game_log(season: &str, body: &str) -> Result<Vec<RawGameRecord>, SourceError> {
    let set = first_result_set(season, body)?;
    let date_idx = set.column(season, COL_GAME_DATE)?;
    let matchup_idx = set.column(season, COL_MATCHUP)?;
    let points_idx = set.column(season, COL_POINTS)?;
    let minutes_idx = set.column(season, COL_MINUTES)?;

    let records = set
        .row_set
        .iter()
        .map(|row| RawGameRecord {
            game_date: convert_date(&text_cell(row.get(date_idx))),
            matchup: text_cell(row.get(matchup_idx)),
            points: stat_cell(row.get(points_idx)),
            minutes: stat_cell(row.get(minutes_idx)),
            season: None,
        })
        .collect();
    Ok(records)
}

/// Parse a team roster response body. Rows without a usable player id are
/// dropped.
pub fn parse_roster(season: &str, body: &str) -> Result<Vec<RosterPlayer>, SourceError> {
    let set = first_result_set(season, body)?;
    let name_idx = set.column(season, COL_PLAYER)?;
    let id_idx = set.column(season, COL_PLAYER_ID)?;

    let players = set
        .row_set
        .iter()
        .filter_map(|row| {
            let id = match row.get(id_idx)? {
                Value::Number(n) => u32::try_from(n.as_u64()?).ok()?,
                Value::String(s) => s.trim().parse().ok()?,
                _ => return None,
            };
            Some(RosterPlayer {
                id,
                name: text_cell(row.get(name_idx)).trim().to_string(),
            })
        })
        .collect();
    Ok(players)
}
