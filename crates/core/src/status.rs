//! Text-valued enums shared by clients and projects.
//!
//! The database stores these as `TEXT`; rows carry the raw string and the
//! API layer parses inbound values through [`EngagementStatus::parse`] and
//! [`ProjectType::parse`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Engagement status
// ---------------------------------------------------------------------------

/// Lifecycle status shared by clients and projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngagementStatus {
    Active,
    Pending,
    Completed,
    OnHold,
}

impl EngagementStatus {
    /// Every known status, in display order.
    pub const ALL: [EngagementStatus; 4] = [
        EngagementStatus::Active,
        EngagementStatus::Pending,
        EngagementStatus::Completed,
        EngagementStatus::OnHold,
    ];

    /// Database / wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::OnHold => "on-hold",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "on-hold" => Ok(Self::OnHold),
            other => Err(CoreError::Validation(format!(
                "Unknown status '{other}'. Must be one of: active, pending, completed, on-hold"
            ))),
        }
    }
}

impl Default for EngagementStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl std::fmt::Display for EngagementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Project type
// ---------------------------------------------------------------------------

/// How a project reached the firm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    /// Tied to a single client with no intermediary.
    Direct,
    /// Introduced by a named external partner.
    Affiliate,
    /// Categorized under a non-partner bucket (marketing, PR, ...).
    Other,
}

impl ProjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Affiliate => "affiliate",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "direct" => Ok(Self::Direct),
            "affiliate" => Ok(Self::Affiliate),
            "other" => Ok(Self::Other),
            other => Err(CoreError::Validation(format!(
                "Unknown project type '{other}'. Must be one of: direct, affiliate, other"
            ))),
        }
    }
}

impl Default for ProjectType {
    fn default() -> Self {
        Self::Direct
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Invoice flag
// ---------------------------------------------------------------------------

/// Stored value for a project that has been invoiced.
pub const INVOICE_YES: &str = "yes";

/// Stored value for a project that has not been invoiced.
pub const INVOICE_NO: &str = "no";
