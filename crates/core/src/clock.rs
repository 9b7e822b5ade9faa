//! Injected "current time" capability.
//!
//! Date-bucket filters and statistics depend on "now". Services receive a
//! [`Clock`] instead of calling `Utc::now()` so tests can pin time.

use std::sync::Mutex;

use chrono::{Duration, Utc};

use crate::types::Timestamp;

pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used by tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Move the clock forward and return the new "now".
    pub fn advance(&self, by: Duration) -> Timestamp {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
        *guard
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
