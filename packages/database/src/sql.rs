//! Rendering of [`LeadQuery`] values into parameterized `SQLite`.
//!
//! All user-supplied values are bound as `$n` parameters. Column names
//! and keywords only ever come from closed enums.

use chrono::{DateTime, Utc};
use lead_forge_database_models::PageRequest;
use lead_forge_filter::{
    Bounds, Condition, EnumMatch, LeadQuery, NumberMatch, TextField, TextMatch,
};
use switchy_database::DatabaseValue;

use crate::format_timestamp;

/// Positional parameters collected while rendering a statement.
#[derive(Debug, Default)]
pub(crate) struct Bindings {
    values: Vec<DatabaseValue>,
}

impl Bindings {
    /// Appends `value` and returns its placeholder.
    pub(crate) fn bind(&mut self, value: DatabaseValue) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }

    pub(crate) fn into_values(self) -> Vec<DatabaseValue> {
        self.values
    }
}

/// Renders the `WHERE` predicate for `query`. The owner constraint always
/// comes first.
pub(crate) fn render_where(query: &LeadQuery, bindings: &mut Bindings) -> String {
    let owner = bindings.bind(DatabaseValue::String(query.owner_id().to_string()));
    let mut clauses = vec![format!("owner_id = {owner}")];

    for condition in query.conditions() {
        render_condition(condition, bindings, &mut clauses);
    }

    clauses.join(" AND ")
}

fn render_condition(condition: &Condition, bindings: &mut Bindings, clauses: &mut Vec<String>) {
    match condition {
        Condition::Text(field, TextMatch::Contains(needle)) => {
            let pattern = format!("%{}%", escape_like(&fold(needle)));
            let p = bindings.bind(DatabaseValue::String(pattern));
            clauses.push(format!("{} LIKE {p} ESCAPE '\\'", folded_column(*field)));
        }
        Condition::Text(field, TextMatch::Equals(value)) => {
            let p = bindings.bind(DatabaseValue::String(value.clone()));
            clauses.push(format!("{} = {p}", field.column()));
        }
        Condition::Status(m) => {
            clauses.push(render_enum("status", m, bindings, |s| s.to_string()));
        }
        Condition::Source(m) => {
            clauses.push(render_enum("source", m, bindings, |s| s.to_string()));
        }
        Condition::Number(field, NumberMatch::Equals(value)) => {
            let p = bindings.bind(DatabaseValue::Real64(*value));
            clauses.push(format!("{} = {p}", field.column()));
        }
        Condition::Number(field, NumberMatch::Within(bounds)) => {
            render_bounds(field.column(), bounds, bindings, clauses, |v| {
                DatabaseValue::Real64(*v)
            });
        }
        Condition::Date(field, bounds) => {
            render_bounds(field.column(), bounds, bindings, clauses, |v: &DateTime<Utc>| {
                DatabaseValue::String(format_timestamp(v))
            });
        }
        Condition::Qualified(qualified) => {
            let p = bindings.bind(DatabaseValue::Int64(i64::from(*qualified)));
            clauses.push(format!("is_qualified = {p}"));
        }
    }
}

fn render_enum<T>(
    column: &str,
    m: &EnumMatch<T>,
    bindings: &mut Bindings,
    to_text: impl Fn(&T) -> String,
) -> String {
    match m {
        EnumMatch::Equals(value) => {
            let p = bindings.bind(DatabaseValue::String(to_text(value)));
            format!("{column} = {p}")
        }
        EnumMatch::AnyOf(values) => {
            let placeholders: Vec<String> = values
                .iter()
                .map(|v| bindings.bind(DatabaseValue::String(to_text(v))))
                .collect();
            format!("{column} IN ({})", placeholders.join(", "))
        }
    }
}

fn render_bounds<T>(
    column: &str,
    bounds: &Bounds<T>,
    bindings: &mut Bindings,
    clauses: &mut Vec<String>,
    to_value: impl Fn(&T) -> DatabaseValue,
) {
    let ops = [
        (">", &bounds.gt),
        (">=", &bounds.gte),
        ("<", &bounds.lt),
        ("<=", &bounds.lte),
    ];
    for (op, bound) in ops {
        if let Some(v) = bound {
            let p = bindings.bind(to_value(v));
            clauses.push(format!("{column} {op} {p}"));
        }
    }
}

/// Case folding applied to text before it is stored in a `*_folded`
/// column or matched against one. `SQLite`'s `LOWER` and `LIKE` only fold
/// ASCII.
pub(crate) fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// The column holding [`fold`]ed text for `field`.
pub(crate) const fn folded_column(field: TextField) -> &'static str {
    match field {
        TextField::Email => "email_folded",
        TextField::Company => "company_folded",
        TextField::City => "city_folded",
    }
}

/// Renders `ORDER BY` with `id` as the tie-breaker so paging is stable.
pub(crate) fn render_order(page: &PageRequest) -> String {
    let dir = page.sort_order.keyword();
    format!("ORDER BY {} {dir}, id {dir}", page.sort_field.column())
}

/// Escapes `LIKE` wildcards so the needle matches literally under
/// `ESCAPE '\'`.
pub(crate) fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use lead_forge_filter::{LeadFilters, build_filter_query};
    use lead_forge_lead_models::{SortField, SortOrder};

    use super::*;

    fn render(json: &str) -> (String, Vec<DatabaseValue>) {
        let filters: LeadFilters = serde_json::from_str(json).unwrap();
        let query = build_filter_query(&filters, "owner-1");
        let mut bindings = Bindings::default();
        let sql = render_where(&query, &mut bindings);
        (sql, bindings.into_values())
    }

    #[test]
    fn owner_is_always_first_parameter() {
        let (sql, params) = render("{}");
        assert_eq!(sql, "owner_id = $1");
        assert_eq!(params.len(), 1);
        assert!(matches!(&params[0], DatabaseValue::String(s) if s == "owner-1"));
    }

    #[test]
    fn contains_is_case_insensitive_like() {
        let (sql, params) = render(r#"{"company": {"contains": "TeCh"}}"#);
        assert_eq!(sql, "owner_id = $1 AND company_folded LIKE $2 ESCAPE '\\'");
        assert!(matches!(&params[1], DatabaseValue::String(s) if s == "%tech%"));

        let (_, params) = render(r#"{"city": {"contains": "ZÜRICH"}}"#);
        assert!(matches!(&params[1], DatabaseValue::String(s) if s == "%zürich%"));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn status_in_binds_each_value() {
        let (sql, params) = render(r#"{"status": {"in": ["won", "lost"]}}"#);
        assert_eq!(sql, "owner_id = $1 AND status IN ($2, $3)");
        assert!(matches!(&params[1], DatabaseValue::String(s) if s == "won"));
        assert!(matches!(&params[2], DatabaseValue::String(s) if s == "lost"));
    }

    #[test]
    fn numeric_and_date_bounds_render_in_order() {
        let (sql, params) = render(
            r#"{"score": {"between": [10, 50]}, "created_at": {"after": "2024-01-01"}, "is_qualified": true}"#,
        );
        assert_eq!(
            sql,
            "owner_id = $1 AND score >= $2 AND score <= $3 AND created_at > $4 AND is_qualified = $5"
        );
        assert!(matches!(params[1], DatabaseValue::Real64(v) if (v - 10.0).abs() < f64::EPSILON));
        assert!(
            matches!(&params[3], DatabaseValue::String(s) if s == "2024-01-01T00:00:00.000000Z")
        );
        assert!(matches!(params[4], DatabaseValue::Int64(1)));
    }

    #[test]
    fn order_breaks_ties_by_id() {
        let page = PageRequest {
            sort_field: SortField::Score,
            sort_order: SortOrder::Asc,
            offset: 0,
            limit: 10,
        };
        assert_eq!(render_order(&page), "ORDER BY score ASC, id ASC");
    }
}
