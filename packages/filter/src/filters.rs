//! Client-supplied filter object, as deserialized from the `filters`
//! query parameter.
//!
//! Every field and operator is optional. Keys that are not listed here
//! (including any attempt to pass an owner) are dropped by `serde`.

use chrono::{DateTime, Datelike as _, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use lead_forge_lead_models::{LeadSource, LeadStatus};
use serde::{Deserialize, Deserializer};

/// The full filter object for a lead listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LeadFilters {
    pub email: Option<StringOps>,
    pub company: Option<StringOps>,
    pub city: Option<StringOps>,
    pub status: Option<EnumOps<LeadStatus>>,
    pub source: Option<EnumOps<LeadSource>>,
    pub score: Option<NumberOps>,
    pub lead_value: Option<NumberOps>,
    pub created_at: Option<DateOps>,
    pub last_activity_at: Option<DateOps>,
    /// Bare boolean. `null` and a missing key both mean "no constraint".
    pub is_qualified: Option<bool>,
}

/// Operators for free-text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StringOps {
    /// Case-insensitive substring.
    pub contains: Option<String>,
    /// Exact value.
    pub equals: Option<String>,
}

/// Operators for enumerated fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnumOps<T> {
    pub equals: Option<T>,
    #[serde(rename = "in")]
    pub any_of: Option<Vec<T>>,
}

impl<T> Default for EnumOps<T> {
    fn default() -> Self {
        Self {
            equals: None,
            any_of: None,
        }
    }
}

/// Operators for numeric fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NumberOps {
    pub equals: Option<f64>,
    pub gt: Option<f64>,
    pub lt: Option<f64>,
    pub gte: Option<f64>,
    pub lte: Option<f64>,
    /// `[lo, hi]`, inclusive on both ends. Any other length is ignored.
    pub between: Option<Vec<f64>>,
}

/// Operators for timestamp fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DateOps {
    /// Calendar day (UTC) containing this instant.
    pub on: Option<FilterDate>,
    pub before: Option<FilterDate>,
    pub after: Option<FilterDate>,
    /// `[lo, hi]`, inclusive on both ends. Any other length is ignored.
    pub between: Option<Vec<FilterDate>>,
}

/// Earliest year a [`FilterDate`] may fall in.
pub const MIN_YEAR: i32 = 0;
/// Latest year a [`FilterDate`] may fall in. Timestamps are stored as
/// four-digit-year text, so later years neither round-trip nor sort.
pub const MAX_YEAR: i32 = 9999;

/// A point in time accepted by date operators.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`), a naive date-time taken as
/// UTC (`2024-05-01T10:00:00`), or a bare date taken as UTC midnight
/// (`2024-05-01`). The UTC year must lie in `MIN_YEAR..=MAX_YEAR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FilterDate(pub DateTime<Utc>);

impl FilterDate {
    /// Parses one of the accepted date formats. Returns `None` for
    /// unrecognized text and for instants outside the supported years.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();

        let parsed = if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            dt.with_timezone(&Utc)
        } else if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
            naive.and_utc()
        } else {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()?
                .and_time(NaiveTime::MIN)
                .and_utc()
        };

        Self::new(parsed)
    }

    /// Wraps `dt` if its year is in `MIN_YEAR..=MAX_YEAR`.
    #[must_use]
    pub fn new(dt: DateTime<Utc>) -> Option<Self> {
        (MIN_YEAR..=MAX_YEAR).contains(&dt.year()).then_some(Self(dt))
    }

    /// Midnight UTC at the start of this instant's calendar day.
    #[must_use]
    pub fn start_of_day(self) -> DateTime<Utc> {
        self.0.date_naive().and_time(NaiveTime::MIN).and_utc()
    }
}

impl<'de> Deserialize<'de> for FilterDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw:?}")))
    }
}
