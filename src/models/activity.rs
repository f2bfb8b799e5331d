// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity model for storage and API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single recorded workout.
///
/// Deserializes directly from a Strava summary activity. The fields the
/// tracker cares about are lifted out; everything else Strava sends is kept
/// verbatim in `extra` and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Strava activity ID (unique key)
    pub id: u64,
    /// Activity name/title
    #[serde(default)]
    pub name: String,
    /// Start date/time (RFC 3339, as delivered by Strava)
    pub start_date: String,
    /// Sport type (Ride, Run, WeightTraining, etc.)
    #[serde(default)]
    pub sport_type: String,
    /// Distance in meters
    #[serde(default)]
    pub distance: f64,
    /// Moving time in seconds
    #[serde(default)]
    pub moving_time: u64,
    /// Elapsed time in seconds
    #[serde(default)]
    pub elapsed_time: u64,
    /// Any other fields, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Activity {
    /// Build an activity with only the identifying fields set.
    pub fn new(id: u64, name: impl Into<String>, start_date: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            start_date: start_date.into(),
            sport_type: String::new(),
            distance: 0.0,
            moving_time: 0,
            elapsed_time: 0,
            extra: Map::new(),
        }
    }
}

/// Request body for bulk activity writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityBatch {
    pub activities: Vec<Activity>,
}
