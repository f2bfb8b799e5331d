// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Challenge statistics returned to the dashboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Summary numbers for a challenge window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Stats {
    /// Longest run of consecutive active days
    pub longest_streak: u32,
    /// Raw number of activities analyzed (duplicates included)
    pub total_workouts: u32,
    /// Whole days left until the end of the window (negative once it has passed)
    pub remaining_days: i64,
    /// Days without an activity between the window start and the last active day
    pub skipped_days: u32,
}

/// A run of consecutive active days.
///
/// A streak with `days == 0` marks a window that opens on a rest day; its
/// `to` is the day before `from`, i.e. the interval is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Streak {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub from: NaiveDate,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub to: NaiveDate,
    pub days: u32,
}

impl Streak {
    /// True for the zero-day marker emitted when the window starts on a gap.
    pub fn is_empty(&self) -> bool {
        self.days == 0
    }

    /// Whether `date` falls inside this streak.
    pub fn contains(&self, date: NaiveDate) -> bool {
        !self.is_empty() && self.from <= date && date <= self.to
    }
}

/// Inclusive calendar range a challenge runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChallengeWindow {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub from: NaiveDate,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub to: NaiveDate,
}

impl ChallengeWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Calendar year window, Jan 1 through Dec 31.
    pub fn for_year(year: i32) -> Option<Self> {
        Some(Self {
            from: NaiveDate::from_ymd_opt(year, 1, 1)?,
            to: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.from <= self.to
    }
}
