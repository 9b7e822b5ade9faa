//! Shared setup for domain integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use crm_core::clock::ManualClock;
use crm_core::types::{DbId, Timestamp};
use crm_domain::{DomainService, FileStore};
use serde_json::json;
use sqlx::PgPool;
use tempfile::TempDir;

/// Wednesday, 15 May 2024, 12:00 UTC.
pub fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
}

pub struct Harness {
    pub service: DomainService,
    pub clock: Arc<ManualClock>,
    pub uploads: TempDir,
}

/// A service over `pool` with a pinned clock and a scratch upload directory.
pub fn harness(pool: PgPool) -> Harness {
    let clock = Arc::new(ManualClock::new(t0()));
    let uploads = tempfile::tempdir().unwrap();
    let service = DomainService::new(pool, FileStore::new(uploads.path()), clock.clone());
    Harness {
        service,
        clock,
        uploads,
    }
}

pub async fn add_member(service: &DomainService, name: &str) -> DbId {
    service
        .create_team_member(&json!({
            "name": name,
            "email": format!("{}@firm.test", name.to_lowercase()),
            "role": "Advisor",
        }))
        .await
        .unwrap()
        .id
}
