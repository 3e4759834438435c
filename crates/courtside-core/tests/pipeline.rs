// End-to-end tests for normalize -> select_window -> summarize.

use courtside_core::normalize::{normalize, retain_complete, NormalizeError};
use courtside_core::record::{RawGameRecord, RawStat};
use courtside_core::summary::{summarize, TrendError};
use courtside_core::window::{select_window, ALL_OPPONENTS};

fn raw(date: &str, matchup: &str, pts: &str, min: &str) -> RawGameRecord {
    RawGameRecord::new(date, matchup, Some(RawStat::from(pts)), Some(RawStat::from(min)))
}

#[test]
fn two_game_scenario() {
    let records = vec![
        raw("2024-01-01", "A vs. B", "22", "34"),
        raw("2024-01-03", "A @ B", "18", "30"),
    ];
    let normalized = normalize(&records, 20.0).unwrap();
    let window = select_window(&normalized, Some(ALL_OPPONENTS), 15, None);

    assert_eq!(window.len(), 2);
    assert_eq!(window[0].game_date.to_string(), "2024-01-03");
    assert_eq!(window[1].game_date.to_string(), "2024-01-01");
    assert!(!window[0].is_home());
    assert!(window[1].is_home());

    let summary = summarize(&window);
    assert_eq!(summary.sample_size, 2);
    assert!((summary.mean_points.unwrap() - 20.0).abs() < 1e-9);
    assert!((summary.over_rate.unwrap() - 50.0).abs() < 1e-9);

    let trend = summary.trend.unwrap();
    assert!((trend.slope - 1.0).abs() < 1e-9);
    assert!((trend.intercept - -12.0).abs() < 1e-9);
}

#[test]
fn unmatched_opponent_yields_empty_summary() {
    let records = vec![raw("2024-01-01", "A vs. B", "22", "34")];
    let normalized = normalize(&records, 20.0).unwrap();
    let window = select_window(&normalized, Some("Z"), 15, None);
    let summary = summarize(&window);

    assert_eq!(summary.sample_size, 0);
    assert!(summary.mean_points.is_none());
    assert!(summary.mean_minutes.is_none());
    assert!(summary.over_rate.is_none());
    assert!(matches!(summary.trend, Err(TrendError::InsufficientData { usable: 0, .. })));
}

#[test]
fn empty_log_flows_through() {
    let normalized = normalize(&[], 20.5).unwrap();
    let window = select_window(&normalized, None, 15, None);
    assert!(summarize(&window).is_empty());
}

#[test]
fn bad_date_stops_the_pipeline() {
    let records = vec![raw("Jan 1 2024", "A vs. B", "22", "34")];
    assert!(matches!(
        normalize(&records, 20.0),
        Err(NormalizeError::MalformedDate { row: 0, .. })
    ));
}

#[test]
fn incomplete_rows_dropped_before_windowing() {
    let records = vec![
        raw("2024-01-01", "A vs. B", "22", "34"),
        raw("2024-01-02", "A vs. B", "", "30"),
        raw("2024-01-03", "A vs. B", "18", "30"),
    ];
    let complete = retain_complete(normalize(&records, 20.0).unwrap());
    let window = select_window(&complete, Some("B"), 15, Some(5));
    assert_eq!(window.len(), 2);
    assert!((summarize(&window).over_rate.unwrap() - 50.0).abs() < 1e-9);
}
