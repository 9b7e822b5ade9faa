//! Domain service layer.
//!
//! [`DomainService`] is the only place business rules run: entity CRUD,
//! client propagation after project changes, the client delete cascade,
//! document file handling, and dashboard statistics. Every operation returns
//! [`DomainResult`] so the HTTP layer can map failures uniformly.

use std::sync::Arc;

use crm_core::clock::Clock;
use crm_core::types::Timestamp;
use crm_db::DbPool;

pub mod clients;
pub mod documents;
pub mod error;
pub mod files;
pub mod projects;
pub mod stats;
pub mod team;

mod propagation;

pub use error::{DomainError, DomainResult};
pub use files::FileStore;

/// Entry point for every domain operation.
///
/// Cheap to clone: the pool, file store, and clock are all shared handles.
#[derive(Debug, Clone)]
pub struct DomainService {
    pool: DbPool,
    files: FileStore,
    clock: Arc<dyn Clock>,
}

impl DomainService {
    pub fn new(pool: DbPool, files: FileStore, clock: Arc<dyn Clock>) -> Self {
        Self { pool, files, clock }
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }
}
