//! Startup seeding of team members from a JSON file.
//!
//! The file holds an array of team member objects, e.g.
//! `[{"name": "Alex Morgan", "email": "alex@firm.test", "role": "Partner"}]`.

use std::path::Path;

use crm_domain::{DomainError, DomainService};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Seed file {path} is not a JSON array of team members: {reason}")]
    Format { path: String, reason: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Parse the seed file contents into raw member payloads.
pub fn parse_team_seed(path: &str, contents: &str) -> Result<Vec<Value>, SeedError> {
    let value: Value = serde_json::from_str(contents).map_err(|e| SeedError::Format {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    match value {
        Value::Array(members) => Ok(members),
        _ => Err(SeedError::Format {
            path: path.to_string(),
            reason: "top-level value must be an array".to_string(),
        }),
    }
}

/// Insert the team members listed in `path` if the table is still empty.
///
/// Returns how many members were inserted.
pub async fn seed_team_from_file(domain: &DomainService, path: &Path) -> Result<usize, SeedError> {
    let display = path.display().to_string();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: display.clone(),
            source,
        })?;
    let members = parse_team_seed(&display, &contents)?;
    Ok(domain.seed_team_members(&members).await?)
}
