// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak analysis over a challenge window.
//!
//! Activities are reduced to the set of local calendar days they fall on,
//! then the window is walked one day at a time from its first day up to the
//! last active day, closing a streak at every rest day. The walk never looks
//! past the last active day, so the still-open tail of a running challenge
//! is neither a streak nor a skip.

use crate::models::{Activity, ChallengeWindow, Stats, Streak};
use crate::time_utils::{ceil_days_until, local_date};
use chrono::{DateTime, NaiveDate, TimeZone};
use std::collections::{BTreeMap, BTreeSet};

/// Errors from streak analysis.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreakError {
    #[error("No activities to analyze")]
    NoActivities,

    #[error("Invalid challenge window: {to} is before {from}")]
    InvalidWindow { from: NaiveDate, to: NaiveDate },

    #[error("Activity {id} has an invalid start date: {start_date:?}")]
    InvalidActivity { id: u64, start_date: String },
}

/// Distinct local calendar days with at least one activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityDateSet {
    dates: BTreeSet<NaiveDate>,
}

impl ActivityDateSet {
    /// Collect the local day of every activity.
    ///
    /// Fails on the first activity whose start date does not parse.
    pub fn from_activities<Tz: TimeZone>(
        activities: &[Activity],
        tz: &Tz,
    ) -> Result<Self, StreakError> {
        let mut dates = BTreeSet::new();
        for activity in activities {
            dates.insert(activity_date(activity, tz)?);
        }
        Ok(Self { dates })
    }

    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.dates.insert(date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Latest active day on or before `limit`.
    pub fn last_on_or_before(&self, limit: NaiveDate) -> Option<NaiveDate> {
        self.dates.range(..=limit).next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Days in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }
}

/// Everything the analyzer derives from one run.
#[derive(Debug, Clone, PartialEq)]
pub struct StreakReport {
    pub window: ChallengeWindow,
    pub stats: Stats,
    pub streaks: Vec<Streak>,
    pub active_dates: ActivityDateSet,
}

/// Computes challenge statistics in a fixed time zone.
///
/// Holds no state between calls; the same input always gives the same report.
#[derive(Debug, Clone)]
pub struct StreakAnalyzer<Tz: TimeZone> {
    tz: Tz,
}

impl<Tz: TimeZone> StreakAnalyzer<Tz> {
    /// Analyzer that buckets activities by calendar day in `tz`.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Analyze `activities` over `window`, evaluated at `today`.
    pub fn analyze(
        &self,
        activities: &[Activity],
        window: ChallengeWindow,
        today: &DateTime<Tz>,
    ) -> Result<StreakReport, StreakError> {
        if !window.is_valid() {
            return Err(StreakError::InvalidWindow {
                from: window.from,
                to: window.to,
            });
        }
        if activities.is_empty() {
            return Err(StreakError::NoActivities);
        }

        let active_dates = ActivityDateSet::from_activities(activities, &self.tz)?;
        let (streaks, skipped_days) = scan_streaks(&active_dates, window);

        let stats = Stats {
            longest_streak: streaks.iter().map(|s| s.days).max().unwrap_or(0),
            total_workouts: activities.len() as u32,
            remaining_days: ceil_days_until(window.to, today),
            skipped_days,
        };

        Ok(StreakReport {
            window,
            stats,
            streaks,
            active_dates,
        })
    }

    /// Number of activities on each local day, raw (duplicates included).
    pub fn grouped_by_date(
        &self,
        activities: &[Activity],
    ) -> Result<BTreeMap<NaiveDate, u32>, StreakError> {
        let mut by_date = BTreeMap::new();
        for activity in activities {
            *by_date.entry(activity_date(activity, &self.tz)?).or_insert(0) += 1;
        }
        Ok(by_date)
    }
}

fn activity_date<Tz: TimeZone>(activity: &Activity, tz: &Tz) -> Result<NaiveDate, StreakError> {
    local_date(&activity.start_date, tz).map_err(|_| StreakError::InvalidActivity {
        id: activity.id,
        start_date: activity.start_date.clone(),
    })
}

/// Walk the window day by day and split it into streaks.
///
/// Returns the streaks in chronological order and the number of rest days
/// seen. The walk ends at the last active day inside the window; if there is
/// none at or after `window.from`, nothing is emitted.
fn scan_streaks(dates: &ActivityDateSet, window: ChallengeWindow) -> (Vec<Streak>, u32) {
    let mut streaks = Vec::new();
    let mut skipped_days = 0;

    let Some(last_active) = dates.last_on_or_before(window.to) else {
        return (streaks, skipped_days);
    };

    let mut streak_start = window.from;
    let mut streak_len = 0u32;
    let mut current = window.from;

    while current <= last_active {
        if dates.contains(current) {
            streak_len += 1;
        } else {
            skipped_days += 1;
            // Back-to-back rest days only close one streak. The zero-day
            // marker survives only when the window itself opens on a rest day.
            if streak_len > 0 || streaks.is_empty() {
                streaks.push(Streak {
                    from: streak_start,
                    to: current.pred_opt().unwrap_or(current),
                    days: streak_len,
                });
            }
            streak_len = 0;
            streak_start = current.succ_opt().unwrap_or(current);
        }

        if current == last_active {
            streaks.push(Streak {
                from: streak_start,
                to: current,
                days: streak_len,
            });
            break;
        }

        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }

    (streaks, skipped_days)
}
