#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Lead classification types shared across the lead-forge system.
//!
//! Every string form used on the wire and in the database is the
//! `snake_case` name of the variant, so `FacebookAds` round-trips as
//! `facebook_ads` everywhere.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Pipeline stage of a lead.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeadStatus {
    /// Freshly captured, nobody has reached out yet
    #[default]
    New,
    /// First contact made
    Contacted,
    /// Confirmed as a real opportunity
    Qualified,
    /// Opportunity dropped
    Lost,
    /// Converted into a customer
    Won,
}

impl LeadStatus {
    /// Returns every status in pipeline order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::New,
            Self::Contacted,
            Self::Qualified,
            Self::Lost,
            Self::Won,
        ]
    }
}

/// Acquisition channel a lead came from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeadSource {
    /// Organic website sign-up or contact form
    Website,
    /// Paid Facebook campaign
    FacebookAds,
    /// Paid Google campaign
    GoogleAds,
    /// Introduced by an existing contact
    Referral,
    /// Met at a trade show, meetup or similar
    Events,
    /// Anything else
    Other,
}

impl LeadSource {
    /// Returns every source.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Website,
            Self::FacebookAds,
            Self::GoogleAds,
            Self::Referral,
            Self::Events,
            Self::Other,
        ]
    }
}

/// Columns a lead listing may be ordered by.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortField {
    FirstName,
    LastName,
    Email,
    Company,
    Status,
    Source,
    Score,
    LeadValue,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Database column backing this sort key.
    ///
    /// Column names match the `snake_case` serialization, so this is the
    /// only place the allow-list is turned into SQL.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Company => "company",
            Self::Status => "status",
            Self::Source => "source",
            Self::Score => "score",
            Self::LeadValue => "lead_value",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// Sort direction.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL keyword for this direction.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_string_forms_match_serde() {
        for status in LeadStatus::all() {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
            assert_eq!(status.as_ref().parse::<LeadStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn source_uses_snake_case() {
        assert_eq!(LeadSource::FacebookAds.to_string(), "facebook_ads");
        assert_eq!(
            "google_ads".parse::<LeadSource>().unwrap(),
            LeadSource::GoogleAds
        );
        assert!("GoogleAds".parse::<LeadSource>().is_err());
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("pending".parse::<LeadStatus>().is_err());
        assert!(serde_json::from_str::<LeadStatus>("\"pending\"").is_err());
    }

    #[test]
    fn sort_defaults() {
        assert_eq!(SortField::default(), SortField::CreatedAt);
        assert_eq!(SortOrder::default(), SortOrder::Desc);
    }

    #[test]
    fn sort_field_column_matches_name() {
        for name in [
            "first_name",
            "last_name",
            "email",
            "company",
            "status",
            "source",
            "score",
            "lead_value",
            "created_at",
            "updated_at",
        ] {
            let field: SortField = name.parse().unwrap();
            assert_eq!(field.column(), name);
        }
        assert!("owner_id".parse::<SortField>().is_err());
    }
}
