//! Row models.
//!
//! Each submodule contains a `FromRow` + `Serialize` struct matching the
//! database row. Inbound payloads are normalized by `crm_core::normalize`
//! before they reach a repository.

pub mod client;
pub mod document;
pub mod project;
pub mod team_member;
