#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Lead filter parsing and query building.
//!
//! The client sends a flat JSON object mapping lead fields to operator
//! objects (see [`LeadFilters`]). [`build_filter_query`] turns it into a
//! [`LeadQuery`]: a storage-agnostic list of typed conditions that is
//! always scoped to a single owner. This crate performs no I/O.

mod builder;
mod filters;
mod query;

pub use builder::build_filter_query;
pub use filters::{DateOps, EnumOps, FilterDate, LeadFilters, NumberOps, StringOps};
pub use query::{
    Bounds, Condition, DateField, EnumMatch, LeadQuery, NumberField, NumberMatch, TextField,
    TextMatch,
};
