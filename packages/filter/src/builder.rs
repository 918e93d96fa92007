//! Translation of [`LeadFilters`] into a [`LeadQuery`].

use chrono::{DateTime, TimeDelta, Utc};

use crate::filters::{DateOps, EnumOps, FilterDate, LeadFilters, NumberOps, StringOps};
use crate::query::{
    Bounds, Condition, DateField, EnumMatch, LeadQuery, NumberField, NumberMatch, TextField,
    TextMatch,
};

/// Builds the owner-scoped query for a filter object.
///
/// Never fails: fields without a usable operator add no condition. The
/// owner scope comes only from `owner_id`.
#[must_use]
pub fn build_filter_query(filters: &LeadFilters, owner_id: &str) -> LeadQuery {
    let mut query = LeadQuery::for_owner(owner_id);

    let text_fields = [
        (TextField::Email, &filters.email),
        (TextField::Company, &filters.company),
        (TextField::City, &filters.city),
    ];
    for (field, ops) in text_fields {
        if let Some(m) = ops.as_ref().and_then(|ops| text_match(field, ops)) {
            query.push(Condition::Text(field, m));
        }
    }

    if let Some(m) = filters.status.as_ref().and_then(enum_match) {
        query.push(Condition::Status(m));
    }
    if let Some(m) = filters.source.as_ref().and_then(enum_match) {
        query.push(Condition::Source(m));
    }

    let number_fields = [
        (NumberField::Score, &filters.score),
        (NumberField::LeadValue, &filters.lead_value),
    ];
    for (field, ops) in number_fields {
        if let Some(m) = ops.as_ref().and_then(number_match) {
            query.push(Condition::Number(field, m));
        }
    }

    let date_fields = [
        (DateField::CreatedAt, &filters.created_at),
        (DateField::LastActivityAt, &filters.last_activity_at),
    ];
    for (field, ops) in date_fields {
        if let Some(bounds) = ops.as_ref().and_then(date_bounds) {
            query.push(Condition::Date(field, bounds));
        }
    }

    if let Some(qualified) = filters.is_qualified {
        query.push(Condition::Qualified(qualified));
    }

    query
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

fn text_match(field: TextField, ops: &StringOps) -> Option<TextMatch> {
    if let Some(needle) = non_empty(ops.contains.as_ref()) {
        return Some(TextMatch::Contains(needle.to_string()));
    }

    non_empty(ops.equals.as_ref()).map(|value| {
        // Stored emails are normalized to lowercase.
        if field == TextField::Email {
            TextMatch::Equals(value.trim().to_lowercase())
        } else {
            TextMatch::Equals(value.to_string())
        }
    })
}

fn enum_match<T: Copy>(ops: &EnumOps<T>) -> Option<EnumMatch<T>> {
    match (&ops.any_of, ops.equals) {
        (Some(values), _) if !values.is_empty() => Some(EnumMatch::AnyOf(values.clone())),
        (_, Some(value)) => Some(EnumMatch::Equals(value)),
        _ => None,
    }
}

fn number_match(ops: &NumberOps) -> Option<NumberMatch> {
    if let Some(value) = ops.equals {
        return Some(NumberMatch::Equals(value));
    }

    let mut bounds = Bounds {
        gt: ops.gt,
        gte: ops.gte,
        lt: ops.lt,
        lte: ops.lte,
    };
    if let Some([lo, hi]) = ops.between.as_deref() {
        bounds.gte = Some(*lo);
        bounds.lte = Some(*hi);
    }

    (!bounds.is_unbounded()).then_some(NumberMatch::Within(bounds))
}

fn date_bounds(ops: &DateOps) -> Option<Bounds<DateTime<Utc>>> {
    if let Some(day) = ops.on {
        let start = day.start_of_day();
        // The last supported day has no representable successor; it is
        // bounded below only.
        let end = start
            .checked_add_signed(TimeDelta::days(1))
            .and_then(FilterDate::new)
            .map(|d| d.0);
        return Some(Bounds {
            gte: Some(start),
            lt: end,
            ..Bounds::default()
        });
    }

    let mut bounds = Bounds {
        lt: ops.before.map(|d| d.0),
        gt: ops.after.map(|d| d.0),
        ..Bounds::default()
    };
    if let Some([lo, hi]) = ops.between.as_deref() {
        bounds.gte = Some(lo.0);
        bounds.lte = Some(hi.0);
    }

    (!bounds.is_unbounded()).then_some(bounds)
}
