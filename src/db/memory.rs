// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process activity store.
//!
//! Activities are keyed by Strava ID, so writing the same activity twice
//! updates it in place instead of adding a second copy.

use crate::models::Activity;
use chrono::DateTime;
use dashmap::DashMap;
use std::cmp::Ordering;
use std::sync::Arc;

/// Shared activity store. Cheap to clone; clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    activities: Arc<DashMap<u64, Activity>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update each activity by ID. Returns how many were written.
    pub fn upsert_activities(&self, activities: &[Activity]) -> usize {
        for activity in activities {
            self.activities.insert(activity.id, activity.clone());
        }
        tracing::debug!(
            written = activities.len(),
            total = self.activities.len(),
            "Activities upserted"
        );
        activities.len()
    }

    pub fn get_activity(&self, id: u64) -> Option<Activity> {
        self.activities.get(&id).map(|a| a.value().clone())
    }

    /// All stored activities, newest first.
    pub fn list_activities(&self) -> Vec<Activity> {
        let mut all: Vec<Activity> = self
            .activities
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(newest_first);
        all
    }

    /// Activities whose name ends with `suffix` (case-insensitive), newest first.
    pub fn list_by_name_suffix(&self, suffix: &str) -> Vec<Activity> {
        let suffix = suffix.to_lowercase();
        let mut matching: Vec<Activity> = self
            .activities
            .iter()
            .filter(|entry| entry.value().name.to_lowercase().ends_with(&suffix))
            .map(|entry| entry.value().clone())
            .collect();
        matching.sort_by(newest_first);
        matching
    }

    pub fn count(&self) -> usize {
        self.activities.len()
    }
}

/// Order by start time descending; unparseable dates sort last, ties by ID.
fn newest_first(a: &Activity, b: &Activity) -> Ordering {
    let ts = |act: &Activity| {
        DateTime::parse_from_rfc3339(&act.start_date)
            .map(|dt| dt.timestamp())
            .ok()
    };
    ts(b).cmp(&ts(a)).then_with(|| b.id.cmp(&a.id))
}
