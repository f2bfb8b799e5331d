// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod history;
pub mod strava;
pub mod streak;

pub use history::{FetchError, FetchOptions, HistoryFetcher, ProgressEvent, RetryPolicy};
pub use strava::StravaClient;
pub use streak::{ActivityDateSet, StreakAnalyzer, StreakError, StreakReport};
