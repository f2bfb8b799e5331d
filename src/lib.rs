// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Challenge Tracker: daily workout streaks against a challenge window
//!
//! This crate pulls an athlete's activity history from Strava and reports
//! how consistently they have trained over a fixed calendar window.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::MemoryDb;
use services::{HistoryFetcher, StravaClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: MemoryDb,
    pub fetcher: HistoryFetcher<StravaClient>,
}

impl AppState {
    /// Build state from config with an empty store.
    pub fn new(config: Config) -> Self {
        let fetcher = HistoryFetcher::new(StravaClient::new(config.strava_api_url.clone()))
            .with_policy(services::RetryPolicy::new(config.fetch_max_retries));
        Self {
            config,
            db: MemoryDb::new(),
            fetcher,
        }
    }
}
