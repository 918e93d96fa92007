#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database row types and write payloads.
//!
//! These types represent the shapes of data as stored in and retrieved from
//! the `SQLite` database. They are distinct from the API response types in
//! `lead_forge_server_models`, which hide the owner and rename fields for
//! the browser client.

use chrono::{DateTime, Utc};
use lead_forge_lead_models::{LeadSource, LeadStatus, SortField, SortOrder};
use serde::{Deserialize, Serialize};

/// A lead as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRow {
    /// Primary key (UUID v4).
    pub id: String,
    /// User that created the lead. Never changes.
    pub owner_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Trimmed and lowercased. Unique per owner.
    pub email: String,
    pub phone: String,
    pub company: String,
    pub city: String,
    pub state: String,
    pub source: LeadSource,
    pub status: LeadStatus,
    /// 0-100.
    pub score: i32,
    /// Non-negative.
    pub lead_value: f64,
    pub is_qualified: bool,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field values for a lead about to be inserted.
///
/// The owner, id and timestamps are supplied by the insert call, never by
/// the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLead {
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
}

/// A partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: Option<LeadSource>,
    pub status: Option<LeadStatus>,
    pub score: Option<i32>,
    pub lead_value: Option<f64>,
    pub is_qualified: Option<bool>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl LeadChanges {
    /// Whether applying these changes would leave the row as it is.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.source.is_none()
            && self.status.is_none()
            && self.score.is_none()
            && self.lead_value.is_none()
            && self.is_qualified.is_none()
            && self.last_activity_at.is_none()
    }
}

/// Ordering and window for a lead listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    /// Number of matching rows to skip.
    pub offset: u64,
    /// Maximum number of rows to return.
    pub limit: u32,
}

/// Owner-wide totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub total_leads: i64,
    pub total_value: f64,
    pub avg_score: f64,
    pub avg_value: f64,
}

/// Number of leads sharing one value of a grouped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket<K> {
    pub key: K,
    pub count: i64,
}

/// Abbreviated lead used in the "recent leads" list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentLead {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

/// Aggregated statistics for one owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub totals: SummaryTotals,
    pub by_status: Vec<Bucket<LeadStatus>>,
    pub by_source: Vec<Bucket<LeadSource>>,
    pub by_qualified: Vec<Bucket<bool>>,
    /// Most recently created first.
    pub recent: Vec<RecentLead>,
}

/// An application user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    /// Primary key (UUID v4). This is the owner id on leads.
    pub id: String,
    /// Lowercased. Unique.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// PHC-format password hash.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Field values for a user about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}
