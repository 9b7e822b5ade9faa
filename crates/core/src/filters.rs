//! Project list filters and last-contacted date buckets.

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};

use crate::error::CoreError;
use crate::normalize::coerce_id;
use crate::status::ProjectType;
use crate::types::{DbId, Timestamp};

/// Sentinel filter value meaning "no constraint".
pub const ALL: &str = "all";

/// Calendar window a project's `lastContacted` must fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactBucket {
    Today,
    Week,
    Month,
    Quarter,
}

impl ContactBucket {
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            other => Err(CoreError::Validation(format!(
                "Unknown lastContacted filter '{other}'. Must be one of: today, week, month, quarter, all"
            ))),
        }
    }

    /// Start of the current bucket (UTC). Weeks start on Sunday.
    pub fn window_start(self, now: Timestamp) -> Timestamp {
        let today = now.date_naive();
        let start = match self {
            Self::Today => today,
            Self::Week => today - Duration::days(i64::from(now.weekday().num_days_from_sunday())),
            Self::Month => first_of_month(today.year(), today.month()),
            Self::Quarter => first_of_month(today.year(), (today.month0() / 3) * 3 + 1),
        };
        start_of_day(start)
    }
}

/// Midnight UTC at the start of `now`'s calendar month.
pub fn start_of_month(now: Timestamp) -> Timestamp {
    let today = now.date_naive();
    start_of_day(first_of_month(today.year(), today.month()))
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // Day 1 exists in every month.
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn start_of_day(date: NaiveDate) -> Timestamp {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// Inclusive `[from, to]` window for `lastContacted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactWindow {
    pub from: Timestamp,
    pub to: Timestamp,
}

/// Raw query-string filters, before normalization.
#[derive(Debug, Clone, Default)]
pub struct ProjectQuery {
    pub status: Option<String>,
    pub assigned_to: Option<String>,
    pub project_type: Option<String>,
    pub last_contacted: Option<String>,
}

/// Normalized, combinable project filter. `None` fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub status: Option<String>,
    pub assigned_to_id: Option<DbId>,
    pub project_type: Option<String>,
    pub contact_bucket: Option<ContactBucket>,
    pub affiliate_partner: Option<String>,
    pub category: Option<String>,
    pub client_id: Option<DbId>,
}

impl ProjectFilter {
    /// Projects introduced by `partner`.
    pub fn affiliate(partner: impl Into<String>) -> Self {
        Self {
            project_type: Some(ProjectType::Affiliate.as_str().to_string()),
            affiliate_partner: Some(partner.into()),
            ..Self::default()
        }
    }

    /// `other` projects in `category`.
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            project_type: Some(ProjectType::Other.as_str().to_string()),
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn client(client_id: DbId) -> Self {
        Self {
            client_id: Some(client_id),
            ..Self::default()
        }
    }

    /// Resolve the bucket against `now`.
    pub fn contact_window(&self, now: Timestamp) -> Option<ContactWindow> {
        self.contact_bucket.map(|bucket| ContactWindow {
            from: bucket.window_start(now),
            to: now,
        })
    }
}

/// Treat empty strings and `"all"` as "no constraint".
fn meaningful(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != ALL)
}

impl TryFrom<ProjectQuery> for ProjectFilter {
    type Error = CoreError;

    fn try_from(query: ProjectQuery) -> Result<Self, Self::Error> {
        let assigned_to_id = meaningful(query.assigned_to)
            .map(|raw| {
                coerce_id(&serde_json::Value::String(raw.clone())).map_err(|_| {
                    CoreError::Validation(format!("assignedTo: '{raw}' is not a valid id"))
                })
            })
            .transpose()?;

        let contact_bucket = meaningful(query.last_contacted)
            .map(|raw| ContactBucket::parse(&raw))
            .transpose()?;

        Ok(Self {
            status: meaningful(query.status),
            assigned_to_id,
            project_type: meaningful(query.project_type),
            contact_bucket,
            ..Self::default()
        })
    }
}
