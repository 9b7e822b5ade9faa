//! Domain types and pure business logic for the advisory CRM.
//!
//! Nothing in this crate performs I/O. Payload normalization, filter windows,
//! statistics math, and stored file naming all live here so they can be
//! unit-tested without a database.

pub mod clock;
pub mod error;
pub mod files;
pub mod filters;
pub mod normalize;
pub mod propagation;
pub mod stats;
pub mod status;
pub mod types;
