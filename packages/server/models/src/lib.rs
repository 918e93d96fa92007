#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the lead-forge server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the database row types so that the owner id never leaves the
//! server and the wire names can follow the existing browser client
//! (`_id` for lead ids, `camelCase` for envelopes).
//!
//! Request bodies are deserialized loosely and checked by their
//! `validate` methods, which report every problem at once as
//! [`FieldError`]s.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use lead_forge_database_models::{
    Bucket, LeadChanges, LeadRow, NewLead, RecentLead, SummaryStats, UserRow,
};
use lead_forge_filter::{FilterDate, LeadFilters};
use lead_forge_lead_models::{LeadSource, LeadStatus, SortField, SortOrder};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default page size for lead listings.
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 100;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `"OK"`.
    pub status: String,
    /// Human-readable status.
    pub message: String,
}

/// A single invalid input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field as sent by the client.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Success response carrying a message and a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse<T> {
    pub message: String,
    pub data: T,
}

/// Success response carrying only a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageOnly {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Leads
// ---------------------------------------------------------------------------

/// A lead as returned by the API. The owner is never exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiLead {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub city: String,
    pub state: String,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub score: i32,
    pub lead_value: f64,
    pub is_qualified: bool,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LeadRow> for ApiLead {
    fn from(row: LeadRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            city: row.city,
            state: row.state,
            source: row.source,
            status: row.status,
            score: row.score,
            lead_value: row.lead_value,
            is_qualified: row.is_qualified,
            last_activity_at: row.last_activity_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Payload of a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedLead {
    pub id: String,
}

/// Raw query string of `GET /leads`. Every value is kept as text so that
/// bad input yields field errors rather than a generic parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLeadsParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    /// JSON-encoded [`LeadFilters`].
    pub filters: Option<String>,
}

/// Validated paging and sorting for a lead listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// 1-based.
    pub page: u64,
    pub limit: u32,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl ListOptions {
    /// Number of rows before the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(u64::from(self.limit))
    }
}

/// Why the `filters` parameter was rejected.
#[derive(Debug)]
pub enum FilterParamError {
    /// Not JSON at all.
    Syntax(serde_json::Error),
    /// JSON, but not a valid filter object.
    Shape(String),
}

impl ListLeadsParams {
    /// Checks `page`, `limit`, `sortBy` and `sortOrder`, applying defaults
    /// for absent values.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldError`] per invalid parameter.
    pub fn validate(&self) -> Result<ListOptions, Vec<FieldError>> {
        let mut errors = Vec::new();

        let page = match present(self.page.as_deref()) {
            None => Some(1),
            Some(raw) => raw.parse::<u64>().ok().filter(|p| *p >= 1),
        };
        if page.is_none() {
            errors.push(FieldError::new("page", "Page must be a positive integer"));
        }

        let limit = match present(self.limit.as_deref()) {
            None => Some(DEFAULT_LIMIT),
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|l| (1..=MAX_LIMIT).contains(l)),
        };
        if limit.is_none() {
            errors.push(FieldError::new(
                "limit",
                format!("Limit must be between 1 and {MAX_LIMIT}"),
            ));
        }

        let sort_field = match present(self.sort_by.as_deref()) {
            None => Some(SortField::default()),
            Some(raw) => raw.parse::<SortField>().ok(),
        };
        if sort_field.is_none() {
            errors.push(FieldError::new("sortBy", "Invalid sort field"));
        }

        let sort_order = match present(self.sort_order.as_deref()) {
            None => Some(SortOrder::default()),
            Some(raw) => raw.parse::<SortOrder>().ok(),
        };
        if sort_order.is_none() {
            errors.push(FieldError::new("sortOrder", "Sort order must be asc or desc"));
        }

        match (page, limit, sort_field, sort_order) {
            (Some(page), Some(limit), Some(sort_field), Some(sort_order)) => Ok(ListOptions {
                page,
                limit,
                sort_field,
                sort_order,
            }),
            _ => Err(errors),
        }
    }

    /// Decodes the `filters` parameter.
    ///
    /// Returns the typed filters together with the client's JSON, which is
    /// echoed back in the listing. An absent or empty parameter means no
    /// filters.
    ///
    /// # Errors
    ///
    /// Returns [`FilterParamError::Syntax`] for invalid JSON and
    /// [`FilterParamError::Shape`] for JSON that is not a filter object.
    pub fn parse_filters(&self) -> Result<(LeadFilters, serde_json::Value), FilterParamError> {
        let Some(raw) = present(self.filters.as_deref()) else {
            return Ok((LeadFilters::default(), serde_json::json!({})));
        };

        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(FilterParamError::Syntax)?;
        if value.is_null() {
            return Ok((LeadFilters::default(), serde_json::json!({})));
        }
        if !value.is_object() {
            return Err(FilterParamError::Shape(
                "filters must be a JSON object".to_string(),
            ));
        }

        let filters = serde_json::from_value(value.clone())
            .map_err(|e| FilterParamError::Shape(e.to_string()))?;

        Ok((filters, value))
    }
}

/// Page metadata of a lead listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    #[must_use]
    pub fn new(page: u64, limit: u32, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(limit.max(1)));
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Effective sort of a lead listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortInfo {
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

/// Response of `GET /leads`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadListResponse {
    pub data: Vec<ApiLead>,
    pub pagination: Pagination,
    /// The client's filter object, as received.
    pub filters: serde_json::Value,
    pub sort: SortInfo,
}

/// Body of `POST /leads`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLeadRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub score: Option<f64>,
    pub lead_value: Option<f64>,
    pub is_qualified: Option<bool>,
    pub last_activity_at: Option<String>,
}

/// Body of `PUT /leads/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLeadRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub score: Option<f64>,
    pub lead_value: Option<f64>,
    pub is_qualified: Option<bool>,
    pub last_activity_at: Option<String>,
}

struct TextRule {
    field: &'static str,
    label: &'static str,
    length_label: &'static str,
    min: usize,
    max: usize,
}

const FIRST_NAME: TextRule = TextRule {
    field: "first_name",
    label: "First name",
    length_label: "First name",
    min: 1,
    max: 100,
};
const LAST_NAME: TextRule = TextRule {
    field: "last_name",
    label: "Last name",
    length_label: "Last name",
    min: 1,
    max: 100,
};
const PHONE: TextRule = TextRule {
    field: "phone",
    label: "Phone number",
    length_label: "Phone number",
    min: 10,
    max: 20,
};
const COMPANY: TextRule = TextRule {
    field: "company",
    label: "Company",
    length_label: "Company name",
    min: 1,
    max: 200,
};
const CITY: TextRule = TextRule {
    field: "city",
    label: "City",
    length_label: "City",
    min: 1,
    max: 100,
};
const STATE: TextRule = TextRule {
    field: "state",
    label: "State",
    length_label: "State",
    min: 1,
    max: 100,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    Optional,
}

/// Collects field errors while checking one request body.
struct Checker {
    presence: Presence,
    errors: Vec<FieldError>,
}

impl Checker {
    const fn new(presence: Presence) -> Self {
        Self {
            presence,
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    fn missing(&mut self, field: &str, message: impl Into<String>) {
        if self.presence == Presence::Required {
            self.fail(field, message);
        }
    }

    fn text(&mut self, rule: &TextRule, value: Option<&str>) -> Option<String> {
        let Some(raw) = value else {
            self.missing(rule.field, format!("{} is required", rule.label));
            return None;
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            let message = match self.presence {
                Presence::Required => format!("{} is required", rule.label),
                Presence::Optional => format!("{} cannot be empty", rule.label),
            };
            self.fail(rule.field, message);
            return None;
        }

        let len = trimmed.chars().count();
        if len < rule.min || len > rule.max {
            self.fail(
                rule.field,
                format!(
                    "{} must be between {} and {} characters",
                    rule.length_label, rule.min, rule.max
                ),
            );
            return None;
        }

        Some(trimmed.to_string())
    }

    fn email(&mut self, value: Option<&str>) -> Option<String> {
        let Some(raw) = value else {
            self.missing("email", "Valid email is required");
            return None;
        };

        let email = normalize_email(raw);
        if !is_valid_email(&email) {
            self.fail("email", "Valid email is required");
            return None;
        }
        if email.chars().count() > 255 {
            self.fail("email", "Email must not exceed 255 characters");
            return None;
        }

        Some(email)
    }

    fn source(&mut self, value: Option<&str>) -> Option<LeadSource> {
        let Some(raw) = value else {
            self.missing("source", one_of("Source", LeadSource::all()));
            return None;
        };
        let parsed = raw.parse().ok();
        if parsed.is_none() {
            self.fail("source", one_of("Source", LeadSource::all()));
        }
        parsed
    }

    /// Status is optional even on create.
    fn status(&mut self, value: Option<&str>) -> Option<LeadStatus> {
        let parsed = value?.parse().ok();
        if parsed.is_none() {
            self.fail("status", one_of("Status", LeadStatus::all()));
        }
        parsed
    }

    #[allow(clippy::cast_possible_truncation)]
    fn score(&mut self, value: Option<f64>) -> Option<i32> {
        let score = value?;
        if score.is_finite() && score.fract() == 0.0 && (0.0..=100.0).contains(&score) {
            Some(score as i32)
        } else {
            self.fail("score", "Score must be an integer between 0 and 100");
            None
        }
    }

    fn lead_value(&mut self, value: Option<f64>) -> Option<f64> {
        let lead_value = value?;
        if lead_value.is_finite() && lead_value >= 0.0 {
            Some(lead_value)
        } else {
            self.fail("lead_value", "Lead value must be a positive number");
            None
        }
    }

    fn timestamp(&mut self, value: Option<&str>) -> Option<DateTime<Utc>> {
        let parsed = FilterDate::parse(value?).map(|d| d.0);
        if parsed.is_none() {
            self.fail(
                "last_activity_at",
                "last_activity_at must be a valid ISO 8601 date",
            );
        }
        parsed
    }

    fn finish<T>(self, value: T) -> Result<T, Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

impl CreateLeadRequest {
    /// Checks every field and produces the lead to insert. Text is trimmed
    /// and the email lowercased.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldError`] per invalid or missing field.
    pub fn validate(&self) -> Result<NewLead, Vec<FieldError>> {
        let mut check = Checker::new(Presence::Required);

        let first_name = check.text(&FIRST_NAME, self.first_name.as_deref());
        let last_name = check.text(&LAST_NAME, self.last_name.as_deref());
        let email = check.email(self.email.as_deref());
        let phone = check.text(&PHONE, self.phone.as_deref());
        let company = check.text(&COMPANY, self.company.as_deref());
        let city = check.text(&CITY, self.city.as_deref());
        let state = check.text(&STATE, self.state.as_deref());
        let source = check.source(self.source.as_deref());
        let status = check.status(self.status.as_deref());
        let score = check.score(self.score);
        let lead_value = check.lead_value(self.lead_value);
        let last_activity_at = check.timestamp(self.last_activity_at.as_deref());

        let (
            Some(first_name),
            Some(last_name),
            Some(email),
            Some(phone),
            Some(company),
            Some(city),
            Some(state),
            Some(source),
        ) = (
            first_name, last_name, email, phone, company, city, state, source,
        )
        else {
            return Err(check.errors);
        };

        check.finish(NewLead {
            first_name,
            last_name,
            email,
            phone,
            company,
            city,
            state,
            source,
            status: status.unwrap_or_default(),
            score: score.unwrap_or(0),
            lead_value: lead_value.unwrap_or(0.0),
            is_qualified: self.is_qualified.unwrap_or(false),
            last_activity_at,
        })
    }
}

impl UpdateLeadRequest {
    /// Checks the supplied fields and produces the changes to apply.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldError`] per invalid field.
    pub fn validate(&self) -> Result<LeadChanges, Vec<FieldError>> {
        let mut check = Checker::new(Presence::Optional);

        let changes = LeadChanges {
            first_name: check.text(&FIRST_NAME, self.first_name.as_deref()),
            last_name: check.text(&LAST_NAME, self.last_name.as_deref()),
            email: check.email(self.email.as_deref()),
            phone: check.text(&PHONE, self.phone.as_deref()),
            company: check.text(&COMPANY, self.company.as_deref()),
            city: check.text(&CITY, self.city.as_deref()),
            state: check.text(&STATE, self.state.as_deref()),
            source: check.source(self.source.as_deref()),
            status: check.status(self.status.as_deref()),
            score: check.score(self.score),
            lead_value: check.lead_value(self.lead_value),
            is_qualified: self.is_qualified,
            last_activity_at: check.timestamp(self.last_activity_at.as_deref()),
        };

        check.finish(changes)
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Owner-wide totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSummaryTotals {
    pub total_leads: i64,
    pub total_value: f64,
    pub avg_score: f64,
    pub avg_value: f64,
}

/// Count of leads sharing one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiBucket<K> {
    #[serde(rename = "_id")]
    pub id: K,
    pub count: i64,
}

impl<K> From<Bucket<K>> for ApiBucket<K> {
    fn from(bucket: Bucket<K>) -> Self {
        Self {
            id: bucket.key,
            count: bucket.count,
        }
    }
}

/// Per-column breakdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiBreakdowns {
    pub status: Vec<ApiBucket<LeadStatus>>,
    pub source: Vec<ApiBucket<LeadSource>>,
    pub qualified: Vec<ApiBucket<bool>>,
}

/// Entry of the recent leads list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRecentLead {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

impl From<RecentLead> for ApiRecentLead {
    fn from(lead: RecentLead) -> Self {
        Self {
            id: lead.id,
            first_name: lead.first_name,
            last_name: lead.last_name,
            email: lead.email,
            company: lead.company,
            status: lead.status,
            created_at: lead.created_at,
        }
    }
}

/// Response of `GET /leads/stats/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLeadStats {
    pub summary: ApiSummaryTotals,
    pub breakdowns: ApiBreakdowns,
    pub recent_leads: Vec<ApiRecentLead>,
}

impl From<SummaryStats> for ApiLeadStats {
    fn from(stats: SummaryStats) -> Self {
        Self {
            summary: ApiSummaryTotals {
                total_leads: stats.totals.total_leads,
                total_value: stats.totals.total_value,
                avg_score: stats.totals.avg_score,
                avg_value: stats.totals.avg_value,
            },
            breakdowns: ApiBreakdowns {
                status: stats.by_status.into_iter().map(Into::into).collect(),
                source: stats.by_source.into_iter().map(Into::into).collect(),
                qualified: stats.by_qualified.into_iter().map(Into::into).collect(),
            },
            recent_leads: stats.recent.into_iter().map(Into::into).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Minimum password length at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A registration that passed validation. The password is still plain
/// text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    /// # Errors
    ///
    /// Returns one [`FieldError`] per invalid or missing field.
    pub fn validate(&self) -> Result<Registration, Vec<FieldError>> {
        let mut errors = Vec::new();

        let email = self
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| is_valid_email(e));
        if email.is_none() {
            errors.push(FieldError::new("email", "Valid email is required"));
        }

        let password = self
            .password
            .clone()
            .filter(|p| p.chars().count() >= MIN_PASSWORD_LENGTH);
        if password.is_none() {
            errors.push(FieldError::new(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            ));
        }

        let first_name = non_blank(self.first_name.as_deref());
        if first_name.is_none() {
            errors.push(FieldError::new("firstName", "First name is required"));
        }

        let last_name = non_blank(self.last_name.as_deref());
        if last_name.is_none() {
            errors.push(FieldError::new("lastName", "Last name is required"));
        }

        match (email, password, first_name, last_name) {
            (Some(email), Some(password), Some(first_name), Some(last_name)) => Ok(Registration {
                email,
                password,
                first_name,
                last_name,
            }),
            _ => Err(errors),
        }
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns the normalized email and the password.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldError`] per missing field.
    pub fn validate(&self) -> Result<(String, String), Vec<FieldError>> {
        let mut errors = Vec::new();

        let email = self
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| is_valid_email(e));
        if email.is_none() {
            errors.push(FieldError::new("email", "Valid email is required"));
        }

        let password = self.password.clone().filter(|p| !p.is_empty());
        if password.is_none() {
            errors.push(FieldError::new("password", "Password is required"));
        }

        match (email, password) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(errors),
        }
    }
}

/// The signed-in user as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<UserRow> for ApiUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Trims and lowercases an email address.
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn one_of<T: AsRef<str>>(label: &str, allowed: &[T]) -> String {
    let names: Vec<&str> = allowed.iter().map(AsRef::<str>::as_ref).collect();
    format!("{label} must be one of: {}", names.join(", "))
}

/// Treats empty query values as absent.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
