//! Dashboard statistics math.
//!
//! The domain layer fetches raw counts and rows; everything that decides what
//! a number means lives here.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::Serialize;

use crate::status::EngagementStatus;
use crate::types::{DbId, Timestamp};

/// An active project not contacted for longer than this needs a follow-up.
pub const FOLLOW_UP_AFTER_DAYS: i64 = 7;

/// Number of entries in the recent activity feed.
pub const RECENT_ACTIVITY_LIMIT: i64 = 5;

/// Display format for activity timestamps, e.g. `Mar 4, 2024 3:07 PM`.
pub const ACTIVITY_TIME_FORMAT: &str = "%b %-d, %Y %-I:%M %p";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total: i64,
    pub new_this_month: i64,
    pub by_status: BTreeMap<&'static str, i64>,
    pub completion_rate: i64,
    pub pending_follow_ups: i64,
    pub recent_activity: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    pub total: i64,
    pub active: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub project_id: DbId,
    pub message: String,
    pub timestamp: String,
    pub updated_at: Timestamp,
}

impl ActivityEntry {
    pub fn project_updated(
        project_id: DbId,
        name: &str,
        status: &str,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            project_id,
            message: format!("Project \"{name}\" was updated to {status}"),
            timestamp: updated_at.format(ACTIVITY_TIME_FORMAT).to_string(),
            updated_at,
        }
    }
}

/// `round(completed / total * 100)`, or 0 when there is nothing to complete.
pub fn completion_rate(completed: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as i64
}

/// Cut-off before which an active project's last contact is stale.
pub fn follow_up_cutoff(now: Timestamp) -> Timestamp {
    now - Duration::days(FOLLOW_UP_AFTER_DAYS)
}

/// An active project needs a follow-up when it was never contacted, or was
/// last contacted strictly more than seven days ago.
pub fn needs_follow_up(status: &str, last_contacted: Option<Timestamp>, now: Timestamp) -> bool {
    if status != EngagementStatus::Active.as_str() {
        return false;
    }
    match last_contacted {
        None => true,
        Some(ts) => ts < follow_up_cutoff(now),
    }
}

/// Fold `(status, count)` rows into a per-status map and a grand total.
///
/// Unknown statuses are left out of the map but still count toward the total.
pub fn status_breakdown(rows: &[(String, i64)]) -> (BTreeMap<&'static str, i64>, i64) {
    let mut by_status: BTreeMap<&'static str, i64> = EngagementStatus::ALL
        .iter()
        .map(|s| (s.as_str(), 0))
        .collect();
    let mut total = 0;
    for (status, count) in rows {
        total += count;
        if let Ok(known) = EngagementStatus::parse(status) {
            *by_status.entry(known.as_str()).or_default() += count;
        }
    }
    (by_status, total)
}
