pub mod client;
pub mod document;
pub mod project;
pub mod stats;
pub mod team_member;
