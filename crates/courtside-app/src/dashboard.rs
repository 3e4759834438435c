// A resolved player plus the seasons to load, answering any number of
// report queries through one shared game log cache.

use std::sync::Arc;

use tracing::{debug, info};

use courtside_core::normalize::NormalizeError;

use crate::cache::GameLogCache;
use crate::report::{build_report, DashboardQuery, DashboardReport};
use crate::source::{resolve_player, GameLogSource, LookupError, RosterPlayer};

pub struct Dashboard {
    cache: GameLogCache,
    player: RosterPlayer,
    seasons: Vec<String>,
}

impl Dashboard {
    pub fn new(source: Arc<dyn GameLogSource>, player: RosterPlayer, seasons: Vec<String>) -> Self {
        Self {
            cache: GameLogCache::new(source),
            player,
            seasons,
        }
    }

    /// Look the player up on the team's roster for the most recent of
    /// `seasons`, then build a dashboard for them.
    pub async fn open(
        source: Arc<dyn GameLogSource>,
        team: &str,
        name: &str,
        seasons: Vec<String>,
    ) -> Result<Self, LookupError> {
        let roster_season = seasons.first().cloned().unwrap_or_default();
        let player = resolve_player(source.as_ref(), team, name, &roster_season).await?;
        info!(player = %player.name, id = player.id, team, "resolved player");
        Ok(Self::new(source, player, seasons))
    }

    pub fn player(&self) -> &RosterPlayer {
        &self.player
    }

    pub fn seasons(&self) -> &[String] {
        &self.seasons
    }

    /// Build one report. The game log is loaded at most once per dashboard.
    pub async fn report(&self, query: &DashboardQuery) -> Result<DashboardReport, NormalizeError> {
        let raw = self.cache.load(self.player.id, &self.seasons).await;
        build_report(&self.player.name, &raw, query)
    }

    /// One report per opponent in the loaded log, each using `base` with the
    /// opponent filter swapped in. Opponents come back in alphabetical order.
    pub async fn opponent_breakdown(
        &self,
        base: &DashboardQuery,
    ) -> Result<Vec<DashboardReport>, NormalizeError> {
        let overview = self.report(base).await?;
        let mut reports = Vec::with_capacity(overview.opponent_options.len());
        for opponent in &overview.opponent_options {
            let query = DashboardQuery {
                opponent: Some(opponent.clone()),
                ..base.clone()
            };
            reports.push(self.report(&query).await?);
        }
        debug!(
            opponents = reports.len(),
            cached_loads = self.cache.len().await,
            "built opponent breakdown"
        );
        Ok(reports)
    }
}
