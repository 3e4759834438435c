// Season label helpers ("2023-24" style labels).

use chrono::{Datelike, NaiveDate};

/// Month in which a new season starts (October).
const SEASON_START_MONTH: u32 = 10;

/// Label for the season that starts in `start_year`, e.g. 2023 -> "2023-24".
pub fn season_label(start_year: i32) -> String {
    format!("{}-{:02}", start_year, (start_year + 1).rem_euclid(100))
}

/// The `count` most recent season labels as of `today`, newest first.
///
/// Before October the current season is the one that started the previous
/// calendar year.
pub fn past_seasons(count: usize, today: NaiveDate) -> Vec<String> {
    let mut base_year = today.year();
    if today.month() < SEASON_START_MONTH {
        base_year -= 1;
    }
    (0..count)
        .map(|offset| season_label(base_year - offset as i32))
        .collect()
}

/// Calendar year in which the labelled season ends ("2023-24" -> 2024).
pub fn season_end_year(label: &str) -> Option<i32> {
    let start: i32 = label.trim().get(..4)?.parse().ok()?;
    Some(start + 1)
}
