// Team -> roster -> player resolution.

use tracing::debug;

use super::{find_team, GameLogSource, RosterPlayer, SourceError};

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("unknown team {team:?}")]
    UnknownTeam { team: String },

    #[error("{player:?} is not on the {team} roster for {season}")]
    NotOnRoster {
        player: String,
        team: String,
        season: String,
    },

    #[error("failed to load the {team} roster: {source}")]
    Roster { team: String, source: SourceError },
}

/// Find `player` on `team`'s roster for `season`. Names compare
/// case-insensitively after trimming.
pub async fn resolve_player(
    source: &dyn GameLogSource,
    team: &str,
    player: &str,
    season: &str,
) -> Result<RosterPlayer, LookupError> {
    let team_info = find_team(team).ok_or_else(|| LookupError::UnknownTeam {
        team: team.to_string(),
    })?;

    let roster = source
        .fetch_roster(team_info, season)
        .await
        .map_err(|e| LookupError::Roster {
            team: team_info.full_name.to_string(),
            source: e,
        })?;
    debug!(team = team_info.abbreviation, season, players = roster.len(), "loaded roster");

    let wanted = player.trim();
    roster
        .into_iter()
        .find(|p| p.name.trim().eq_ignore_ascii_case(wanted))
        .ok_or_else(|| LookupError::NotOnRoster {
            player: wanted.to_string(),
            team: team_info.full_name.to_string(),
            season: season.to_string(),
        })
}
