//! Inbound payload normalization and validation.
//!
//! HTTP bodies arrive as untyped JSON. The functions here coerce them into
//! typed records, collecting every violated constraint into a single
//! [`CoreError::Validation`] rather than stopping at the first one.
//!
//! Two inputs degrade silently instead of failing: an unparseable
//! `lastContacted` becomes `None`, and an unrecognised `hasInvoice` string is
//! stored as given. Both emit a `warn!` so bad client input stays visible.

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::warn;
use validator::{Validate, ValidateLength, ValidationErrors};

use crate::error::CoreError;
use crate::status::{EngagementStatus, ProjectType, INVOICE_NO, INVOICE_YES};
use crate::types::{DbId, Timestamp};

/// Minimum length for name-like fields.
pub const MIN_NAME_LEN: u64 = 2;

const NAME_TOO_SHORT: &str = "must be at least 2 characters";

// ---------------------------------------------------------------------------
// Typed records
// ---------------------------------------------------------------------------

/// A fully normalized project ready for insertion.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewProject {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub name: String,
    pub phone: Option<String>,
    pub contact_name: Option<String>,
    pub project_type: ProjectType,
    pub affiliate_partner: Option<String>,
    pub category: Option<String>,
    pub last_contacted: Option<Timestamp>,
    pub status: EngagementStatus,
    pub active_stage: Option<String>,
    pub has_invoice: String,
    /// `None` means "apply the fallback assignee policy".
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub assigned_to_id: Option<DbId>,
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub client_id: Option<DbId>,
}

/// Partial project update.
///
/// Outer `None` means the field was absent from the payload and must be left
/// untouched. For nullable columns, `Some(None)` means "clear".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub phone: Option<Option<String>>,
    pub contact_name: Option<Option<String>>,
    pub project_type: Option<ProjectType>,
    pub affiliate_partner: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub last_contacted: Option<Option<Timestamp>>,
    pub status: Option<EngagementStatus>,
    pub active_stage: Option<Option<String>>,
    pub has_invoice: Option<String>,
    pub assigned_to_id: Option<DbId>,
    pub client_id: Option<Option<DbId>>,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewClient {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub name: String,
    pub status: EngagementStatus,
    pub last_contacted: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub status: Option<EngagementStatus>,
    pub last_contacted: Option<Option<Timestamp>>,
}

/// Metadata for a document whose file has already been written.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewDocument {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "is required"))]
    pub file_path: String,
    #[validate(length(min = 1, message = "is required"))]
    pub mime_type: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub size_bytes: i64,
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub client_id: DbId,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewTeamMember {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub role: String,
    pub avatar: Option<String>,
}

// ---------------------------------------------------------------------------
// Violation collector
// ---------------------------------------------------------------------------

/// Accumulates field-level validation failures.
#[derive(Debug, Default)]
struct Violations(Vec<String>);

impl Violations {
    fn push(&mut self, field: &str, message: impl std::fmt::Display) {
        self.0.push(format!("{field}: {message}"));
    }

    fn absorb(&mut self, errors: ValidationErrors) {
        for (field, errs) in errors.field_errors() {
            let field = wire_name(&field.to_string());
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                self.push(&field, message);
            }
        }
    }

    fn finish<T>(mut self, value: T) -> Result<T, CoreError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            self.0.sort();
            self.0.dedup();
            Err(CoreError::Validation(self.0.join("; ")))
        }
    }
}

/// Run derive-based validation on a record built outside this module.
pub fn check<T: Validate>(record: T) -> Result<T, CoreError> {
    let mut violations = Violations::default();
    if let Err(errors) = record.validate() {
        violations.absorb(errors);
    }
    violations.finish(record)
}

/// `assigned_to_id` -> `assignedToId`.
fn wire_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    match out.as_str() {
        "projectType" => "type".to_string(),
        _ => out,
    }
}

// ---------------------------------------------------------------------------
// Field access
// ---------------------------------------------------------------------------

/// Presence state of a payload key.
#[derive(Debug, Clone, Copy)]
enum Field<'a> {
    Missing,
    Null,
    Present(&'a Value),
}

struct Payload<'a>(&'a serde_json::Map<String, Value>);

impl<'a> Payload<'a> {
    fn new(body: &'a Value) -> Result<Self, CoreError> {
        body.as_object()
            .map(Payload)
            .ok_or_else(|| CoreError::Validation("Request body must be a JSON object".into()))
    }

    fn get(&self, key: &str) -> Field<'a> {
        match self.0.get(key) {
            None => Field::Missing,
            Some(Value::Null) => Field::Null,
            Some(v) => Field::Present(v),
        }
    }
}

/// Trimmed string from a string or number.
fn text(value: &Value) -> Result<String, &'static str> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err("must be a string"),
    }
}

/// Optional text: empty strings count as absent.
fn optional_text(value: &Value) -> Result<Option<String>, &'static str> {
    text(value).map(|s| if s.is_empty() { None } else { Some(s) })
}

/// Read a nullable text field for a create payload.
fn create_optional_text(p: &Payload<'_>, key: &str, v: &mut Violations) -> Option<String> {
    match p.get(key) {
        Field::Missing | Field::Null => None,
        Field::Present(value) => optional_text(value).unwrap_or_else(|e| {
            v.push(key, e);
            None
        }),
    }
}

/// Read a nullable text field for a patch payload.
fn patch_optional_text(p: &Payload<'_>, key: &str, v: &mut Violations) -> Option<Option<String>> {
    match p.get(key) {
        Field::Missing => None,
        Field::Null => Some(None),
        Field::Present(value) => match optional_text(value) {
            Ok(s) => Some(s),
            Err(e) => {
                v.push(key, e);
                None
            }
        },
    }
}

fn name_field(value: &Value, key: &str, v: &mut Violations) -> Option<String> {
    match text(value) {
        Ok(s) => {
            if !s.validate_length(Some(MIN_NAME_LEN), None, None) {
                v.push(key, NAME_TOO_SHORT);
            }
            Some(s)
        }
        Err(e) => {
            v.push(key, e);
            None
        }
    }
}

fn status_field(value: &Value, v: &mut Violations) -> Option<EngagementStatus> {
    match value.as_str().map(str::trim) {
        Some("") => {
            v.push("status", "must not be empty");
            None
        }
        Some(s) => EngagementStatus::parse(s)
            .map_err(|_| v.push("status", format!("unknown value '{s}'")))
            .ok(),
        None => {
            v.push("status", "must be a string");
            None
        }
    }
}

fn type_field(value: &Value, v: &mut Violations) -> Option<ProjectType> {
    match value.as_str().map(str::trim) {
        Some("") => {
            v.push("type", "must not be empty");
            None
        }
        Some(s) => ProjectType::parse(s)
            .map_err(|_| v.push("type", format!("unknown value '{s}'")))
            .ok(),
        None => {
            v.push("type", "must be a string");
            None
        }
    }
}

fn id_field(value: &Value, key: &str, v: &mut Violations) -> Option<DbId> {
    match coerce_id(value) {
        Ok(id) if id > 0 => Some(id),
        Ok(_) => {
            v.push(key, "must be a positive id");
            None
        }
        Err(e) => {
            v.push(key, e);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Scalar coercions
// ---------------------------------------------------------------------------

/// Coerce the invoice flag to its stored two-valued text form.
///
/// Booleans and numbers map to `yes`/`no`. Strings match `"true"`/`"false"`
/// case-insensitively; any other string is returned unchanged. `null` maps
/// to `no`.
pub fn coerce_invoice_flag(value: &Value) -> String {
    match value {
        Value::Bool(true) => INVOICE_YES.to_string(),
        Value::Bool(false) | Value::Null => INVOICE_NO.to_string(),
        Value::Number(n) => {
            if n.as_f64().is_some_and(|f| f > 0.0) {
                INVOICE_YES.to_string()
            } else {
                INVOICE_NO.to_string()
            }
        }
        Value::String(s) => {
            if s.eq_ignore_ascii_case("true") {
                INVOICE_YES.to_string()
            } else if s.eq_ignore_ascii_case("false") {
                INVOICE_NO.to_string()
            } else {
                if s != INVOICE_YES && s != INVOICE_NO {
                    warn!(value = %s, "Unrecognised hasInvoice value stored as-is");
                }
                s.clone()
            }
        }
        other => {
            warn!(value = %other, "Unrecognised hasInvoice value treated as 'no'");
            INVOICE_NO.to_string()
        }
    }
}

/// Parse a date-like value. Anything unparseable yields `None`.
///
/// Accepts RFC 3339, naive ISO date-times (read as UTC), plain ISO dates
/// (midnight UTC), and epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<Timestamp> {
    let parsed = match value {
        Value::Null => return None,
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    };
    if parsed.is_none() {
        warn!(value = %value, "Unparseable lastContacted value normalized to null");
    }
    parsed
}

fn parse_timestamp_str(s: &str) -> Option<Timestamp> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Accept a numeric id or its string representation.
pub fn coerce_id(value: &Value) -> Result<DbId, &'static str> {
    match value {
        Value::Number(n) => n.as_i64().ok_or("must be an integer"),
        Value::String(s) => s.trim().parse::<DbId>().map_err(|_| "must be an integer"),
        _ => Err("must be an integer"),
    }
}

/// Enforce the type-dependent requirements on a (possibly merged) project.
///
/// `affiliate` needs a partner and `other` needs a category.
pub fn check_type_requirements(
    project_type: &str,
    affiliate_partner: Option<&str>,
    category: Option<&str>,
) -> Result<(), CoreError> {
    let mut v = Violations::default();
    type_requirement_violations(project_type, affiliate_partner, category, &mut v);
    v.finish(())
}

fn type_requirement_violations(
    project_type: &str,
    affiliate_partner: Option<&str>,
    category: Option<&str>,
    v: &mut Violations,
) {
    let blank = |s: Option<&str>| s.map_or(true, |s| s.trim().is_empty());
    if project_type == ProjectType::Affiliate.as_str() && blank(affiliate_partner) {
        v.push("affiliatePartner", "is required for affiliate projects");
    }
    if project_type == ProjectType::Other.as_str() && blank(category) {
        v.push("category", "is required for other projects");
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Normalize a project creation payload.
pub fn new_project(body: &Value) -> Result<NewProject, CoreError> {
    let p = Payload::new(body)?;
    let mut v = Violations::default();

    let name = match p.get("name") {
        Field::Present(value) => name_field(value, "name", &mut v).unwrap_or_default(),
        Field::Missing | Field::Null => {
            v.push("name", "is required");
            String::new()
        }
    };

    let project_type = match p.get("type") {
        Field::Missing => ProjectType::default(),
        Field::Null => {
            v.push("type", "must not be null");
            ProjectType::default()
        }
        Field::Present(value) => type_field(value, &mut v).unwrap_or_default(),
    };

    let status = match p.get("status") {
        Field::Missing => EngagementStatus::default(),
        Field::Null => {
            v.push("status", "must not be null");
            EngagementStatus::default()
        }
        Field::Present(value) => status_field(value, &mut v).unwrap_or_default(),
    };

    let last_contacted = match p.get("lastContacted") {
        Field::Missing | Field::Null => None,
        Field::Present(value) => parse_timestamp(value),
    };

    let has_invoice = match p.get("hasInvoice") {
        Field::Missing => INVOICE_NO.to_string(),
        Field::Null => INVOICE_NO.to_string(),
        Field::Present(value) => coerce_invoice_flag(value),
    };

    let assigned_to_id = match p.get("assignedToId") {
        Field::Missing | Field::Null => None,
        Field::Present(value) => id_field(value, "assignedToId", &mut v),
    };

    let client_id = match p.get("clientId") {
        Field::Missing | Field::Null => None,
        Field::Present(value) => id_field(value, "clientId", &mut v),
    };

    let project = NewProject {
        name,
        phone: create_optional_text(&p, "phone", &mut v),
        contact_name: create_optional_text(&p, "contactName", &mut v),
        project_type,
        affiliate_partner: create_optional_text(&p, "affiliatePartner", &mut v),
        category: create_optional_text(&p, "category", &mut v),
        last_contacted,
        status,
        active_stage: create_optional_text(&p, "activeStage", &mut v),
        has_invoice,
        assigned_to_id,
        client_id,
    };

    type_requirement_violations(
        project.project_type.as_str(),
        project.affiliate_partner.as_deref(),
        project.category.as_deref(),
        &mut v,
    );

    v.finish(project)
}

/// Normalize a partial project update payload.
///
/// Type-dependent requirements are not checked here: they depend on the
/// stored row and are enforced after the patch is merged.
pub fn project_patch(body: &Value) -> Result<ProjectPatch, CoreError> {
    let p = Payload::new(body)?;
    let mut v = Violations::default();
    let mut patch = ProjectPatch::default();

    match p.get("name") {
        Field::Missing => {}
        Field::Null => v.push("name", "must not be null"),
        Field::Present(value) => patch.name = name_field(value, "name", &mut v),
    }

    match p.get("type") {
        Field::Missing => {}
        Field::Null => v.push("type", "must not be null"),
        Field::Present(value) => patch.project_type = type_field(value, &mut v),
    }

    match p.get("status") {
        Field::Missing => {}
        Field::Null => v.push("status", "must not be null"),
        Field::Present(value) => patch.status = status_field(value, &mut v),
    }

    match p.get("lastContacted") {
        Field::Missing => {}
        Field::Null => patch.last_contacted = Some(None),
        Field::Present(value) => patch.last_contacted = Some(parse_timestamp(value)),
    }

    match p.get("hasInvoice") {
        Field::Missing => {}
        Field::Null => patch.has_invoice = Some(INVOICE_NO.to_string()),
        Field::Present(value) => patch.has_invoice = Some(coerce_invoice_flag(value)),
    }

    match p.get("assignedToId") {
        Field::Missing => {}
        Field::Null => v.push("assignedToId", "must not be null"),
        Field::Present(value) => patch.assigned_to_id = id_field(value, "assignedToId", &mut v),
    }

    match p.get("clientId") {
        Field::Missing => {}
        Field::Null => patch.client_id = Some(None),
        Field::Present(value) => {
            if let Some(id) = id_field(value, "clientId", &mut v) {
                patch.client_id = Some(Some(id));
            }
        }
    }

    patch.phone = patch_optional_text(&p, "phone", &mut v);
    patch.contact_name = patch_optional_text(&p, "contactName", &mut v);
    patch.affiliate_partner = patch_optional_text(&p, "affiliatePartner", &mut v);
    patch.category = patch_optional_text(&p, "category", &mut v);
    patch.active_stage = patch_optional_text(&p, "activeStage", &mut v);

    v.finish(patch)
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

pub fn new_client(body: &Value) -> Result<NewClient, CoreError> {
    let p = Payload::new(body)?;
    let mut v = Violations::default();

    let name = match p.get("name") {
        Field::Present(value) => name_field(value, "name", &mut v).unwrap_or_default(),
        Field::Missing | Field::Null => {
            v.push("name", "is required");
            String::new()
        }
    };

    let status = match p.get("status") {
        Field::Missing => EngagementStatus::default(),
        Field::Null => {
            v.push("status", "must not be null");
            EngagementStatus::default()
        }
        Field::Present(value) => status_field(value, &mut v).unwrap_or_default(),
    };

    let last_contacted = match p.get("lastContacted") {
        Field::Missing | Field::Null => None,
        Field::Present(value) => parse_timestamp(value),
    };

    v.finish(NewClient {
        name,
        status,
        last_contacted,
    })
}

pub fn client_patch(body: &Value) -> Result<ClientPatch, CoreError> {
    let p = Payload::new(body)?;
    let mut v = Violations::default();
    let mut patch = ClientPatch::default();

    match p.get("name") {
        Field::Missing => {}
        Field::Null => v.push("name", "must not be null"),
        Field::Present(value) => patch.name = name_field(value, "name", &mut v),
    }

    match p.get("status") {
        Field::Missing => {}
        Field::Null => v.push("status", "must not be null"),
        Field::Present(value) => patch.status = status_field(value, &mut v),
    }

    match p.get("lastContacted") {
        Field::Missing => {}
        Field::Null => patch.last_contacted = Some(None),
        Field::Present(value) => patch.last_contacted = Some(parse_timestamp(value)),
    }

    v.finish(patch)
}

// ---------------------------------------------------------------------------
// Team members
// ---------------------------------------------------------------------------

pub fn new_team_member(body: &Value) -> Result<NewTeamMember, CoreError> {
    let p = Payload::new(body)?;
    let mut v = Violations::default();

    let mut required = |key: &str| match p.get(key) {
        Field::Present(value) => text(value).unwrap_or_else(|e| {
            v.push(key, e);
            String::new()
        }),
        Field::Missing | Field::Null => String::new(),
    };
    let name = required("name");
    let email = required("email");
    let role = required("role");
    let avatar = create_optional_text(&p, "avatar", &mut v);

    let member = NewTeamMember {
        name,
        email,
        role,
        avatar,
    };
    if let Err(errors) = member.validate() {
        v.absorb(errors);
    }
    v.finish(member)
}
