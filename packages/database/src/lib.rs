#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database connection, schema and queries for lead-forge.
//!
//! Uses `switchy_database` over `SQLite` for all storage. Every lead query
//! takes either a [`lead_forge_filter::LeadQuery`] or an explicit owner id,
//! so no function in this crate can read or write another user's leads.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with
//! microsecond precision, which keeps string comparison in SQL equivalent
//! to chronological comparison.

pub mod db;
pub mod leads;
mod sql;
pub mod users;

use chrono::{DateTime, SubsecRound as _, Utc};

/// Storage format for every timestamp column.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(switchy_database::DatabaseError),

    /// A `UNIQUE` constraint rejected the write.
    #[error("Conflict: {message}")]
    Conflict {
        /// Message reported by the database.
        message: String,
    },

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// The database file could not be opened.
    #[error("Failed to open database: {message}")]
    Connection {
        /// Description of what went wrong.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<switchy_database::DatabaseError> for DbError {
    fn from(e: switchy_database::DatabaseError) -> Self {
        let message = e.to_string();
        if message.contains("UNIQUE constraint failed")
            || format!("{e:?}").contains("UNIQUE constraint failed")
        {
            Self::Conflict { message }
        } else {
            Self::Database(e)
        }
    }
}

/// Drops sub-microsecond precision so a value survives a storage
/// round-trip unchanged.
#[must_use]
pub fn truncate_timestamp(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(6)
}

/// Formats a timestamp for storage or comparison in SQL.
#[must_use]
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp.
///
/// # Errors
///
/// Returns [`DbError::Conversion`] if `s` is not RFC 3339.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::Conversion {
            message: format!("Failed to parse timestamp {s:?}: {e}"),
        })
}

/// Builds a `map_err` adapter for a failed column read.
pub(crate) fn conversion<E: std::fmt::Display>(column: &'static str) -> impl FnOnce(E) -> DbError {
    move |e| DbError::Conversion {
        message: format!("Failed to read column {column}: {e}"),
    }
}
