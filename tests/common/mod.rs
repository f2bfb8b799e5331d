// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use challenge_tracker::config::Config;
use challenge_tracker::models::Activity;
use challenge_tracker::routes::create_router;
use challenge_tracker::services::history::{PageError, PageRequest, PageTransport};
use challenge_tracker::AppState;
use chrono::DateTime;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// Create a test app with an empty store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config));
    (create_router(state.clone()), state)
}

/// Activity starting at noon UTC on `day` (YYYY-MM-DD).
///
/// Noon keeps the local calendar day the same for any zone within ±11h.
#[allow(dead_code)]
pub fn activity_on(id: u64, day: &str) -> Activity {
    Activity::new(id, format!("Workout {}", id), format!("{}T12:00:00Z", day))
}

/// Activity starting at the given Unix timestamp.
#[allow(dead_code)]
pub fn activity_at(id: u64, epoch: i64) -> Activity {
    let start = DateTime::from_timestamp(epoch, 0).expect("valid timestamp");
    Activity::new(id, format!("Workout {}", id), start.to_rfc3339())
}

type Responder = dyn Fn(&PageRequest, usize) -> Result<Vec<Activity>, PageError> + Send + Sync;

/// Transport that answers from a closure and records every call.
///
/// The closure gets the request and the 0-based call number.
#[derive(Clone)]
#[allow(dead_code)]
pub struct ScriptedTransport {
    responder: Arc<Responder>,
    calls: Arc<Mutex<Vec<(PageRequest, Instant)>>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(
        responder: impl Fn(&PageRequest, usize) -> Result<Vec<Activity>, PageError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(responder),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<(PageRequest, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.calls().into_iter().map(|(r, _)| r).collect()
    }
}

impl PageTransport for ScriptedTransport {
    async fn fetch_page(
        &self,
        _access_token: &str,
        request: PageRequest,
    ) -> Result<Vec<Activity>, PageError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((request, Instant::now()));
            calls.len() - 1
        };
        (self.responder)(&request, call)
    }
}
