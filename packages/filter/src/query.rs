//! The structured, owner-scoped query produced from [`crate::LeadFilters`].
//!
//! A [`LeadQuery`] can only be created for a concrete owner, and the owner
//! cannot be changed afterwards. Storage backends translate the
//! [`Condition`] list into their native query form.

use chrono::{DateTime, Utc};
use lead_forge_lead_models::{LeadSource, LeadStatus};

/// Free-text lead columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Email,
    Company,
    City,
}

impl TextField {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Company => "company",
            Self::City => "city",
        }
    }
}

/// Numeric lead columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberField {
    Score,
    LeadValue,
}

impl NumberField {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Score => "score",
            Self::LeadValue => "lead_value",
        }
    }
}

/// Timestamp lead columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    CreatedAt,
    LastActivityAt,
}

impl DateField {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::LastActivityAt => "last_activity_at",
        }
    }
}

/// Any combination of lower and upper bounds. Every bound that is set
/// must hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub gt: Option<T>,
    pub gte: Option<T>,
    pub lt: Option<T>,
    pub lte: Option<T>,
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Self {
            gt: None,
            gte: None,
            lt: None,
            lte: None,
        }
    }
}

impl<T: PartialOrd> Bounds<T> {
    /// Whether no bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.gt.is_none() && self.gte.is_none() && self.lt.is_none() && self.lte.is_none()
    }

    /// Whether `value` satisfies every bound that is set.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.gt.as_ref().is_none_or(|b| value > b)
            && self.gte.as_ref().is_none_or(|b| value >= b)
            && self.lt.as_ref().is_none_or(|b| value < b)
            && self.lte.as_ref().is_none_or(|b| value <= b)
    }
}

/// Text predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    /// Case-insensitive literal substring.
    Contains(String),
    Equals(String),
}

/// Enum predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumMatch<T> {
    Equals(T),
    /// Never empty.
    AnyOf(Vec<T>),
}

/// Numeric predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberMatch {
    Equals(f64),
    /// Never unbounded.
    Within(Bounds<f64>),
}

/// One constraint on one lead column.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Text(TextField, TextMatch),
    Status(EnumMatch<LeadStatus>),
    Source(EnumMatch<LeadSource>),
    Number(NumberField, NumberMatch),
    /// Never unbounded. Leads with no value for the column never match.
    Date(DateField, Bounds<DateTime<Utc>>),
    Qualified(bool),
}

/// A conjunction of [`Condition`]s over the leads of a single owner.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadQuery {
    owner_id: String,
    conditions: Vec<Condition>,
}

impl LeadQuery {
    /// Matches every lead of `owner_id`.
    #[must_use]
    pub fn for_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub(crate) fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }
}
