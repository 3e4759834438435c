// Memoized multi-season loads keyed on (player, season list).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use courtside_core::record::RawGameRecord;

use crate::source::{load_multi_season, GameLogSource};

type CacheKey = (u32, Vec<String>);

/// Wraps a source so repeated queries for the same player and seasons reuse
/// the first load. Changing any season in the list is a different key.
pub struct GameLogCache {
    source: Arc<dyn GameLogSource>,
    entries: Mutex<HashMap<CacheKey, Vec<RawGameRecord>>>,
}

impl GameLogCache {
    pub fn new(source: Arc<dyn GameLogSource>) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn load(&self, player_id: u32, seasons: &[String]) -> Vec<RawGameRecord> {
        let key = (player_id, seasons.to_vec());
        if let Some(hit) = self.entries.lock().await.get(&key) {
            debug!(player_id, seasons = ?seasons, "game log cache hit");
            return hit.clone();
        }

        let rows = load_multi_season(self.source.as_ref(), player_id, seasons).await;
        self.entries.lock().await.insert(key, rows.clone());
        rows
    }

    /// Number of distinct (player, seasons) loads held.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
