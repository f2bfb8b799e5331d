// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Whole-window properties of the streak analyzer.

use challenge_tracker::models::{Activity, ChallengeWindow};
use challenge_tracker::services::{StreakAnalyzer, StreakReport};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

mod common;
use common::activity_on;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap()
}

fn analyze(activities: &[Activity], from: &str, to: &str) -> StreakReport {
    StreakAnalyzer::new(Utc)
        .analyze(
            activities,
            ChallengeWindow::new(date(from), date(to)),
            &now(),
        )
        .unwrap()
}

/// Activities on a fixed pseudo-random subset of days in Q1 2024.
fn sample_history() -> Vec<Activity> {
    let start = date("2024-01-01");
    (0..90u64)
        .filter(|i| (i * 7 + 3) % 5 != 0 && i % 11 != 4)
        .map(|i| {
            let day = start + Duration::days(i as i64);
            activity_on(i + 1, &day.format("%Y-%m-%d").to_string())
        })
        .collect()
}

#[test]
fn test_streaks_and_gaps_partition_the_scanned_range() {
    let activities = sample_history();
    let report = analyze(&activities, "2024-01-01", "2024-03-31");

    let last_active = report.active_dates.last_on_or_before(date("2024-03-31")).unwrap();
    let mut day = date("2024-01-01");
    let mut covered_by_streak = 0u32;
    let mut gaps = 0u32;

    while day <= last_active {
        let holders = report.streaks.iter().filter(|s| s.contains(day)).count();
        if report.active_dates.contains(day) {
            assert_eq!(holders, 1, "{} must be in exactly one streak", day);
            covered_by_streak += 1;
        } else {
            assert_eq!(holders, 0, "{} is a gap and must not be in a streak", day);
            gaps += 1;
        }
        day = day.succ_opt().unwrap();
    }

    let streak_days: u32 = report.streaks.iter().map(|s| s.days).sum();
    assert_eq!(streak_days, covered_by_streak);
    assert_eq!(report.stats.skipped_days, gaps);
    assert_eq!(
        report.stats.longest_streak,
        report.streaks.iter().map(|s| s.days).max().unwrap()
    );
}

#[test]
fn test_streaks_are_chronological_and_separated() {
    let report = analyze(&sample_history(), "2024-01-01", "2024-03-31");

    let real: Vec<_> = report.streaks.iter().filter(|s| !s.is_empty()).collect();
    for pair in real.windows(2) {
        assert!(pair[0].to < pair[1].from);
        assert!(
            !report.active_dates.contains(pair[0].to.succ_opt().unwrap()),
            "streaks are maximal"
        );
    }
    for streak in &real {
        assert_eq!(
            (streak.to - streak.from).num_days() + 1,
            streak.days as i64
        );
    }
}

#[test]
fn test_analysis_is_idempotent() {
    let activities = sample_history();
    let first = analyze(&activities, "2024-01-01", "2024-03-31");
    let second = analyze(&activities, "2024-01-01", "2024-03-31");
    assert_eq!(first, second);
}

#[test]
fn test_same_day_duplicates_only_change_workout_count() {
    let activities = sample_history();
    let mut with_dups = activities.clone();
    with_dups.extend(activities.iter().take(10).cloned());
    with_dups.push(Activity::new(
        10_000,
        "Second session",
        activities[0].start_date.replace("12:00:00", "18:30:00"),
    ));

    let base = analyze(&activities, "2024-01-01", "2024-03-31");
    let dup = analyze(&with_dups, "2024-01-01", "2024-03-31");

    assert_eq!(base.stats.longest_streak, dup.stats.longest_streak);
    assert_eq!(base.stats.skipped_days, dup.stats.skipped_days);
    assert_eq!(base.active_dates, dup.active_dates);
    assert_eq!(base.streaks, dup.streaks);
    assert_eq!(dup.stats.total_workouts, base.stats.total_workouts + 11);
}

#[test]
fn test_single_activity_single_day_window() {
    let report = analyze(&[activity_on(1, "2024-02-29")], "2024-02-29", "2024-02-29");
    assert_eq!(report.stats.longest_streak, 1);
    assert_eq!(report.stats.skipped_days, 0);
}

#[test]
fn test_late_start_counts_every_leading_gap_day() {
    let report = analyze(&[activity_on(1, "2024-01-06")], "2024-01-01", "2024-01-31");

    assert_eq!(report.stats.skipped_days, 5);
    let empty: Vec<_> = report.streaks.iter().filter(|s| s.is_empty()).collect();
    assert_eq!(empty.len(), 1);
    assert_eq!(empty[0].from, date("2024-01-01"));
}

#[test]
fn test_remaining_days_rounds_up_and_goes_negative() {
    let activities = [activity_on(1, "2024-01-01")];

    // 2024-03-15T08:00Z → 2024-03-20T00:00 is 4 days 16 hours.
    assert_eq!(
        analyze(&activities, "2024-01-01", "2024-03-20").stats.remaining_days,
        5
    );
    assert_eq!(
        analyze(&activities, "2024-01-01", "2024-03-01").stats.remaining_days,
        -14
    );
}

#[test]
fn test_leap_day_is_walked() {
    let activities = [
        activity_on(1, "2024-02-28"),
        activity_on(2, "2024-02-29"),
        activity_on(3, "2024-03-01"),
    ];
    let report = analyze(&activities, "2024-02-28", "2024-03-31");
    assert_eq!(report.stats.longest_streak, 3);
    assert_eq!(report.stats.skipped_days, 0);
}
