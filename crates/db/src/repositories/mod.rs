//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Reads that never join a transaction take `&PgPool`; anything the domain
//! layer may call inside a transaction takes `impl PgExecutor<'_>` so it
//! accepts either the pool or `&mut *tx`.

pub mod client_repo;
pub mod document_repo;
pub mod project_repo;
pub mod team_member_repo;

pub use client_repo::ClientRepo;
pub use document_repo::DocumentRepo;
pub use project_repo::ProjectRepo;
pub use team_member_repo::TeamMemberRepo;
