// Library root: per-game log normalization, window selection, and summary
// statistics for a single player's game log.

pub mod normalize;
pub mod record;
pub mod season;
pub mod series;
pub mod summary;
pub mod window;
