//! Lead queries.
//!
//! Every statement here is scoped to one owner, either through a
//! [`LeadQuery`] or through an explicit `owner_id` argument.

use chrono::{DateTime, Utc};
use lead_forge_database_models::{
    Bucket, LeadChanges, LeadRow, NewLead, PageRequest, RecentLead, SummaryStats, SummaryTotals,
};
use lead_forge_filter::LeadQuery;
use lead_forge_lead_models::{LeadSource, LeadStatus};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};
use uuid::Uuid;

use crate::sql::{Bindings, fold, render_order, render_where};
use crate::{DbError, conversion, format_timestamp, parse_timestamp, truncate_timestamp};

/// Number of leads returned in [`SummaryStats::recent`].
pub const RECENT_LEADS_LIMIT: i64 = 5;

const LEAD_COLUMNS: &str = "id, owner_id, first_name, last_name, email, phone, company, city, \
                            state, source, status, score, lead_value, is_qualified, \
                            last_activity_at, created_at, updated_at";

/// Counts the leads matching `query`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn count_leads(db: &dyn Database, query: &LeadQuery) -> Result<u64, DbError> {
    let mut bindings = Bindings::default();
    let predicate = render_where(query, &mut bindings);

    let rows = db
        .query_raw_params(
            &format!("SELECT COUNT(*) AS total FROM leads WHERE {predicate}"),
            &bindings.into_values(),
        )
        .await?;

    let total: i64 = match rows.first() {
        Some(row) => row.to_value("total").map_err(conversion("total"))?,
        None => 0,
    };

    Ok(u64::try_from(total).unwrap_or(0))
}

/// Fetches one page of the leads matching `query`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row cannot be decoded.
pub async fn find_leads(
    db: &dyn Database,
    query: &LeadQuery,
    page: &PageRequest,
) -> Result<Vec<LeadRow>, DbError> {
    let mut bindings = Bindings::default();
    let predicate = render_where(query, &mut bindings);
    let order = render_order(page);
    let limit = bindings.bind(DatabaseValue::Int64(i64::from(page.limit)));
    let offset = bindings.bind(DatabaseValue::Int64(
        i64::try_from(page.offset).unwrap_or(i64::MAX),
    ));

    let sql = format!(
        "SELECT {LEAD_COLUMNS} FROM leads WHERE {predicate} {order} LIMIT {limit} OFFSET {offset}"
    );
    log::debug!("find_leads: {sql}");

    let rows = db.query_raw_params(&sql, &bindings.into_values()).await?;

    rows.iter().map(lead_from_row).collect()
}

/// Fetches a single lead of `owner_id`.
///
/// Returns `None` both when the lead does not exist and when it belongs to
/// another owner.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or the row cannot be decoded.
pub async fn get_lead(
    db: &dyn Database,
    owner_id: &str,
    id: &str,
) -> Result<Option<LeadRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE owner_id = $1 AND id = $2"),
            &[
                DatabaseValue::String(owner_id.to_string()),
                DatabaseValue::String(id.to_string()),
            ],
        )
        .await?;

    rows.first().map(lead_from_row).transpose()
}

/// Whether `owner_id` already has a lead with `email`, ignoring the lead
/// `exclude_id`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn email_taken(
    db: &dyn Database,
    owner_id: &str,
    email: &str,
    exclude_id: Option<&str>,
) -> Result<bool, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT COUNT(*) AS cnt FROM leads WHERE owner_id = $1 AND email = $2 AND id <> $3",
            &[
                DatabaseValue::String(owner_id.to_string()),
                DatabaseValue::String(email.to_string()),
                DatabaseValue::String(exclude_id.unwrap_or_default().to_string()),
            ],
        )
        .await?;

    let count: i64 = match rows.first() {
        Some(row) => row.to_value("cnt").map_err(conversion("cnt"))?,
        None => 0,
    };

    Ok(count > 0)
}

/// Inserts a lead for `owner_id` and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Conflict`] if the owner already has a lead with the
/// same email, or [`DbError`] if the insert fails otherwise.
pub async fn insert_lead(
    db: &dyn Database,
    owner_id: &str,
    lead: &NewLead,
    now: DateTime<Utc>,
) -> Result<LeadRow, DbError> {
    let now = truncate_timestamp(now);
    let row = LeadRow {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        first_name: lead.first_name.clone(),
        last_name: lead.last_name.clone(),
        email: lead.email.clone(),
        phone: lead.phone.clone(),
        company: lead.company.clone(),
        city: lead.city.clone(),
        state: lead.state.clone(),
        source: lead.source,
        status: lead.status,
        score: lead.score,
        lead_value: lead.lead_value,
        is_qualified: lead.is_qualified,
        last_activity_at: lead.last_activity_at.map(truncate_timestamp),
        created_at: now,
        updated_at: now,
    };

    db.exec_raw_params(
        &format!(
            "INSERT INTO leads ({LEAD_COLUMNS}, email_folded, company_folded, city_folded)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                     $18, $19, $20)"
        ),
        &[
            DatabaseValue::String(row.id.clone()),
            DatabaseValue::String(row.owner_id.clone()),
            DatabaseValue::String(row.first_name.clone()),
            DatabaseValue::String(row.last_name.clone()),
            DatabaseValue::String(row.email.clone()),
            DatabaseValue::String(row.phone.clone()),
            DatabaseValue::String(row.company.clone()),
            DatabaseValue::String(row.city.clone()),
            DatabaseValue::String(row.state.clone()),
            DatabaseValue::String(row.source.to_string()),
            DatabaseValue::String(row.status.to_string()),
            DatabaseValue::Int64(i64::from(row.score)),
            DatabaseValue::Real64(row.lead_value),
            DatabaseValue::Int64(i64::from(row.is_qualified)),
            optional_timestamp(row.last_activity_at.as_ref()),
            DatabaseValue::String(format_timestamp(&row.created_at)),
            DatabaseValue::String(format_timestamp(&row.updated_at)),
            DatabaseValue::String(fold(&row.email)),
            DatabaseValue::String(fold(&row.company)),
            DatabaseValue::String(fold(&row.city)),
        ],
    )
    .await?;

    log::debug!("Inserted lead {} for owner {owner_id}", row.id);

    Ok(row)
}

/// Applies `changes` to a lead of `owner_id` and returns the updated row.
///
/// `updated_at` is always refreshed. Returns `None` if the owner has no
/// such lead.
///
/// # Errors
///
/// Returns [`DbError::Conflict`] if the new email is already used by another
/// lead of the owner, or [`DbError`] if the update fails otherwise.
pub async fn update_lead(
    db: &dyn Database,
    owner_id: &str,
    id: &str,
    changes: &LeadChanges,
    now: DateTime<Utc>,
) -> Result<Option<LeadRow>, DbError> {
    let mut bindings = Bindings::default();
    let mut sets = Vec::new();

    let mut set = |column: &str, value: Option<DatabaseValue>| {
        if let Some(value) = value {
            let p = bindings.bind(value);
            sets.push(format!("{column} = {p}"));
        }
    };

    set("first_name", changes.first_name.clone().map(DatabaseValue::String));
    set("last_name", changes.last_name.clone().map(DatabaseValue::String));
    set("email", changes.email.clone().map(DatabaseValue::String));
    set("email_folded", changes.email.as_deref().map(|v| DatabaseValue::String(fold(v))));
    set("phone", changes.phone.clone().map(DatabaseValue::String));
    set("company", changes.company.clone().map(DatabaseValue::String));
    set("company_folded", changes.company.as_deref().map(|v| DatabaseValue::String(fold(v))));
    set("city", changes.city.clone().map(DatabaseValue::String));
    set("city_folded", changes.city.as_deref().map(|v| DatabaseValue::String(fold(v))));
    set("state", changes.state.clone().map(DatabaseValue::String));
    set("source", changes.source.map(|s| DatabaseValue::String(s.to_string())));
    set("status", changes.status.map(|s| DatabaseValue::String(s.to_string())));
    set("score", changes.score.map(|s| DatabaseValue::Int64(i64::from(s))));
    set("lead_value", changes.lead_value.map(DatabaseValue::Real64));
    set(
        "is_qualified",
        changes.is_qualified.map(|q| DatabaseValue::Int64(i64::from(q))),
    );
    set(
        "last_activity_at",
        changes
            .last_activity_at
            .map(|t| DatabaseValue::String(format_timestamp(&truncate_timestamp(t)))),
    );
    set(
        "updated_at",
        Some(DatabaseValue::String(format_timestamp(&truncate_timestamp(
            now,
        )))),
    );

    let owner = bindings.bind(DatabaseValue::String(owner_id.to_string()));
    let lead = bindings.bind(DatabaseValue::String(id.to_string()));

    let affected = db
        .exec_raw_params(
            &format!(
                "UPDATE leads SET {} WHERE owner_id = {owner} AND id = {lead}",
                sets.join(", ")
            ),
            &bindings.into_values(),
        )
        .await?;

    if affected == 0 {
        return Ok(None);
    }

    get_lead(db, owner_id, id).await
}

/// Deletes a lead of `owner_id`. Returns whether a row was removed.
///
/// # Errors
///
/// Returns [`DbError`] if the delete fails.
pub async fn delete_lead(db: &dyn Database, owner_id: &str, id: &str) -> Result<bool, DbError> {
    let affected = db
        .exec_raw_params(
            "DELETE FROM leads WHERE owner_id = $1 AND id = $2",
            &[
                DatabaseValue::String(owner_id.to_string()),
                DatabaseValue::String(id.to_string()),
            ],
        )
        .await?;

    Ok(affected > 0)
}

/// Aggregates totals, breakdowns and the most recent leads for the leads
/// matching `query`.
///
/// An owner with no leads gets zero totals and empty lists.
///
/// # Errors
///
/// Returns [`DbError`] if a query fails or a row cannot be decoded.
pub async fn summary_stats(db: &dyn Database, query: &LeadQuery) -> Result<SummaryStats, DbError> {
    let mut bindings = Bindings::default();
    let predicate = render_where(query, &mut bindings);
    let params = bindings.into_values();

    let rows = db
        .query_raw_params(
            &format!(
                "SELECT COUNT(*) AS total_leads,
                        CAST(COALESCE(SUM(lead_value), 0) AS REAL) AS total_value,
                        CAST(COALESCE(AVG(score), 0) AS REAL) AS avg_score,
                        CAST(COALESCE(AVG(lead_value), 0) AS REAL) AS avg_value
                 FROM leads WHERE {predicate}"
            ),
            &params,
        )
        .await?;

    // The aggregate yields exactly one row, even for an empty set.
    let totals = match rows.first() {
        Some(row) => SummaryTotals {
            total_leads: row.to_value("total_leads").map_err(conversion("total_leads"))?,
            total_value: row.to_value("total_value").map_err(conversion("total_value"))?,
            avg_score: row.to_value("avg_score").map_err(conversion("avg_score"))?,
            avg_value: row.to_value("avg_value").map_err(conversion("avg_value"))?,
        },
        None => SummaryTotals::default(),
    };

    let by_status = breakdown(db, "status", &predicate, &params)
        .await?
        .into_iter()
        .map(|(key, count)| {
            Ok(Bucket {
                key: parse_enum::<LeadStatus>("status", &key)?,
                count,
            })
        })
        .collect::<Result<Vec<_>, DbError>>()?;

    let by_source = breakdown(db, "source", &predicate, &params)
        .await?
        .into_iter()
        .map(|(key, count)| {
            Ok(Bucket {
                key: parse_enum::<LeadSource>("source", &key)?,
                count,
            })
        })
        .collect::<Result<Vec<_>, DbError>>()?;

    let by_qualified = breakdown(db, "is_qualified", &predicate, &params)
        .await?
        .into_iter()
        .map(|(key, count)| Bucket {
            key: key != "0",
            count,
        })
        .collect();

    let rows = db
        .query_raw_params(
            &format!(
                "SELECT id, first_name, last_name, email, company, status, created_at
                 FROM leads WHERE {predicate}
                 ORDER BY created_at DESC, id DESC
                 LIMIT {RECENT_LEADS_LIMIT}"
            ),
            &params,
        )
        .await?;

    let recent = rows
        .iter()
        .map(recent_from_row)
        .collect::<Result<Vec<_>, DbError>>()?;

    Ok(SummaryStats {
        totals,
        by_status,
        by_source,
        by_qualified,
        recent,
    })
}

/// Groups the matching leads by `column`, largest group first. Keys are
/// returned as text.
async fn breakdown(
    db: &dyn Database,
    column: &str,
    predicate: &str,
    params: &[DatabaseValue],
) -> Result<Vec<(String, i64)>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT CAST({column} AS TEXT) AS bucket, COUNT(*) AS cnt
                 FROM leads WHERE {predicate}
                 GROUP BY {column}
                 ORDER BY cnt DESC, bucket"
            ),
            params,
        )
        .await?;

    let mut buckets = Vec::with_capacity(rows.len());
    for row in &rows {
        let key: String = row.to_value("bucket").map_err(conversion("bucket"))?;
        let count: i64 = row.to_value("cnt").map_err(conversion("cnt"))?;
        buckets.push((key, count));
    }
    Ok(buckets)
}

fn parse_enum<T: std::str::FromStr>(column: &str, value: &str) -> Result<T, DbError> {
    value.parse().map_err(|_| DbError::Conversion {
        message: format!("Unknown {column} value {value:?}"),
    })
}

fn optional_timestamp(value: Option<&DateTime<Utc>>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |t| {
        DatabaseValue::String(format_timestamp(t))
    })
}

fn lead_from_row(row: &Row) -> Result<LeadRow, DbError> {
    let source: String = row.to_value("source").map_err(conversion("source"))?;
    let status: String = row.to_value("status").map_err(conversion("status"))?;
    let score: i64 = row.to_value("score").map_err(conversion("score"))?;
    let is_qualified: i64 = row.to_value("is_qualified").map_err(conversion("is_qualified"))?;
    let last_activity_at: Option<String> = row
        .to_value("last_activity_at")
        .map_err(conversion("last_activity_at"))?;
    let created_at: String = row.to_value("created_at").map_err(conversion("created_at"))?;
    let updated_at: String = row.to_value("updated_at").map_err(conversion("updated_at"))?;

    Ok(LeadRow {
        id: row.to_value("id").map_err(conversion("id"))?,
        owner_id: row.to_value("owner_id").map_err(conversion("owner_id"))?,
        first_name: row.to_value("first_name").map_err(conversion("first_name"))?,
        last_name: row.to_value("last_name").map_err(conversion("last_name"))?,
        email: row.to_value("email").map_err(conversion("email"))?,
        phone: row.to_value("phone").map_err(conversion("phone"))?,
        company: row.to_value("company").map_err(conversion("company"))?,
        city: row.to_value("city").map_err(conversion("city"))?,
        state: row.to_value("state").map_err(conversion("state"))?,
        source: parse_enum("source", &source)?,
        status: parse_enum("status", &status)?,
        score: i32::try_from(score).map_err(conversion("score"))?,
        lead_value: row.to_value("lead_value").map_err(conversion("lead_value"))?,
        is_qualified: is_qualified != 0,
        last_activity_at: last_activity_at.as_deref().map(parse_timestamp).transpose()?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn recent_from_row(row: &Row) -> Result<RecentLead, DbError> {
    let status: String = row.to_value("status").map_err(conversion("status"))?;
    let created_at: String = row.to_value("created_at").map_err(conversion("created_at"))?;

    Ok(RecentLead {
        id: row.to_value("id").map_err(conversion("id"))?,
        first_name: row.to_value("first_name").map_err(conversion("first_name"))?,
        last_name: row.to_value("last_name").map_err(conversion("last_name"))?,
        email: row.to_value("email").map_err(conversion("email"))?,
        company: row.to_value("company").map_err(conversion("company"))?,
        status: parse_enum("status", &status)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone as _};
    use lead_forge_database_models::NewUser;
    use lead_forge_filter::{FilterDate, LeadFilters, build_filter_query};
    use lead_forge_lead_models::{SortField, SortOrder};

    use crate::test_support::temp_db;
    use crate::users::insert_user;

    use super::*;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn new_lead(n: u32) -> NewLead {
        NewLead {
            first_name: format!("First{n}"),
            last_name: format!("Last{n}"),
            email: format!("lead{n}@example.com"),
            phone: "5550001111".to_string(),
            company: format!("Company {n}"),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            source: LeadSource::Website,
            status: LeadStatus::New,
            score: 0,
            lead_value: 0.0,
            is_qualified: false,
            last_activity_at: None,
        }
    }

    async fn owner(db: &dyn Database, email: &str) -> String {
        insert_user(
            db,
            &NewUser {
                email: email.to_string(),
                first_name: "Owner".to_string(),
                last_name: "Test".to_string(),
                password_hash: "hash".to_string(),
            },
            base_time(),
        )
        .await
        .unwrap()
        .id
    }

    fn query(owner_id: &str, json: &str) -> LeadQuery {
        let filters: LeadFilters = serde_json::from_str(json).unwrap();
        build_filter_query(&filters, owner_id)
    }

    fn page(offset: u64, limit: u32) -> PageRequest {
        PageRequest {
            sort_field: SortField::CreatedAt,
            sort_order: SortOrder::Asc,
            offset,
            limit,
        }
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;

        let mut lead = new_lead(1);
        lead.lead_value = 1250.5;
        lead.is_qualified = true;
        lead.last_activity_at = Some(base_time());

        let inserted = insert_lead(db.as_ref(), &owner_id, &lead, Utc::now())
            .await
            .unwrap();
        let fetched = get_lead(db.as_ref(), &owner_id, &inserted.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fetched, inserted);
        assert_eq!(fetched.owner_id, owner_id);
    }

    #[tokio::test]
    async fn duplicate_email_for_same_owner_conflicts() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;
        let other_id = owner(db.as_ref(), "other@example.com").await;

        insert_lead(db.as_ref(), &owner_id, &new_lead(1), base_time())
            .await
            .unwrap();

        let err = insert_lead(db.as_ref(), &owner_id, &new_lead(1), base_time())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }), "got {err:?}");

        // Uniqueness is per owner.
        insert_lead(db.as_ref(), &other_id, &new_lead(1), base_time())
            .await
            .unwrap();

        assert!(
            email_taken(db.as_ref(), &owner_id, "lead1@example.com", None)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn email_taken_excludes_the_lead_itself() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;
        let lead = insert_lead(db.as_ref(), &owner_id, &new_lead(1), base_time())
            .await
            .unwrap();

        assert!(
            !email_taken(db.as_ref(), &owner_id, &lead.email, Some(&lead.id))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn status_and_score_filter_selects_matching_leads() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;

        let fixtures = [
            (LeadStatus::Won, 90),
            (LeadStatus::Won, 70),
            (LeadStatus::Won, 75),
            (LeadStatus::Won, 40),
            (LeadStatus::Lost, 95),
            (LeadStatus::New, 80),
            (LeadStatus::New, 10),
            (LeadStatus::Contacted, 71),
            (LeadStatus::Qualified, 69),
            (LeadStatus::Won, 69),
        ];
        for (n, (status, score)) in (0..).zip(fixtures) {
            let mut lead = new_lead(n);
            lead.status = status;
            lead.score = score;
            insert_lead(db.as_ref(), &owner_id, &lead, base_time())
                .await
                .unwrap();
        }

        let q = query(&owner_id, r#"{"status": {"equals": "won"}, "score": {"gte": 70}}"#);
        assert_eq!(count_leads(db.as_ref(), &q).await.unwrap(), 3);

        let mut scores: Vec<i32> = find_leads(db.as_ref(), &q, &page(0, 20))
            .await
            .unwrap()
            .iter()
            .map(|l| l.score)
            .collect();
        scores.sort_unstable();
        assert_eq!(scores, [70, 75, 90]);
    }

    #[tokio::test]
    async fn contains_matches_case_insensitively_and_literally() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;

        for (n, company) in (0..).zip(["TechCorp", "biotech labs", "Acme", "100% Tech_"]) {
            let mut lead = new_lead(n);
            lead.company = company.to_string();
            insert_lead(db.as_ref(), &owner_id, &lead, base_time())
                .await
                .unwrap();
        }

        let q = query(&owner_id, r#"{"company": {"contains": "TECH"}}"#);
        assert_eq!(count_leads(db.as_ref(), &q).await.unwrap(), 3);

        let q = query(&owner_id, r#"{"company": {"contains": "%"}}"#);
        let found = find_leads(db.as_ref(), &q, &page(0, 20)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].company, "100% Tech_");
    }

    #[tokio::test]
    async fn contains_folds_non_ascii_case() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;

        let places = [("ÉCOLE NORMALE", "ZÜRICH"), ("Ecole Libre", "Zurich"), ("Straße AG", "München")];
        for (n, (company, city)) in (0..).zip(places) {
            let mut lead = new_lead(n);
            lead.company = company.to_string();
            lead.city = city.to_string();
            insert_lead(db.as_ref(), &owner_id, &lead, base_time())
                .await
                .unwrap();
        }

        let q = query(&owner_id, r#"{"company": {"contains": "école"}}"#);
        let found = find_leads(db.as_ref(), &q, &page(0, 20)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].company, "ÉCOLE NORMALE");

        let q = query(&owner_id, r#"{"city": {"contains": "zürich"}}"#);
        assert_eq!(count_leads(db.as_ref(), &q).await.unwrap(), 1);

        let q = query(&owner_id, r#"{"city": {"contains": "MÜN"}}"#);
        assert_eq!(count_leads(db.as_ref(), &q).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn contains_sees_updated_text() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;
        let lead = insert_lead(db.as_ref(), &owner_id, &new_lead(1), base_time())
            .await
            .unwrap();

        let changes = LeadChanges {
            company: Some("ÅNGSTRÖM Labs".to_string()),
            ..LeadChanges::default()
        };
        update_lead(db.as_ref(), &owner_id, &lead.id, &changes, base_time())
            .await
            .unwrap()
            .unwrap();

        let q = query(&owner_id, r#"{"company": {"contains": "ångström"}}"#);
        assert_eq!(count_leads(db.as_ref(), &q).await.unwrap(), 1);
        let q = query(&owner_id, r#"{"company": {"contains": "company"}}"#);
        assert_eq!(count_leads(db.as_ref(), &q).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn other_owners_leads_are_invisible() {
        let (_dir, db) = temp_db().await;
        let alice = owner(db.as_ref(), "alice@example.com").await;
        let bob = owner(db.as_ref(), "bob@example.com").await;

        let alices = insert_lead(db.as_ref(), &alice, &new_lead(1), base_time())
            .await
            .unwrap();
        insert_lead(db.as_ref(), &bob, &new_lead(2), base_time())
            .await
            .unwrap();

        let q = query(&bob, "{}");
        let found = find_leads(db.as_ref(), &q, &page(0, 20)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.iter().all(|l| l.owner_id == bob));

        assert!(get_lead(db.as_ref(), &bob, &alices.id).await.unwrap().is_none());
        assert!(!delete_lead(db.as_ref(), &bob, &alices.id).await.unwrap());
        assert!(
            update_lead(
                db.as_ref(),
                &bob,
                &alices.id,
                &LeadChanges::default(),
                base_time()
            )
            .await
            .unwrap()
            .is_none()
        );
    }

    #[tokio::test]
    async fn second_page_of_forty_five() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;

        for n in 0..45 {
            insert_lead(
                db.as_ref(),
                &owner_id,
                &new_lead(n),
                base_time() + TimeDelta::minutes(i64::from(n)),
            )
            .await
            .unwrap();
        }

        let q = query(&owner_id, "{}");
        assert_eq!(count_leads(db.as_ref(), &q).await.unwrap(), 45);

        let found = find_leads(db.as_ref(), &q, &page(20, 20)).await.unwrap();
        let firsts: Vec<&str> = found.iter().map(|l| l.first_name.as_str()).collect();
        let expected: Vec<String> = (20..40).map(|n| format!("First{n}")).collect();
        assert_eq!(firsts, expected);
    }

    #[tokio::test]
    async fn ties_on_sort_key_are_broken_by_id() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;

        for n in 0..6 {
            insert_lead(db.as_ref(), &owner_id, &new_lead(n), base_time())
                .await
                .unwrap();
        }

        let q = query(&owner_id, "{}");
        let mut seen = Vec::new();
        for offset in [0, 2, 4] {
            seen.extend(
                find_leads(db.as_ref(), &q, &page(offset, 2))
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|l| l.id),
            );
        }
        let mut sorted = seen.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(seen.len(), 6);
        assert_eq!(sorted, seen);
    }

    #[tokio::test]
    async fn between_is_inclusive() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;

        for (n, score) in (0..).zip([9, 10, 30, 50, 51]) {
            let mut lead = new_lead(n);
            lead.score = score;
            insert_lead(db.as_ref(), &owner_id, &lead, base_time())
                .await
                .unwrap();
        }

        let q = query(&owner_id, r#"{"score": {"between": [10, 50]}}"#);
        assert_eq!(count_leads(db.as_ref(), &q).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn date_filters_skip_missing_values() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;

        let mut active = new_lead(1);
        active.last_activity_at = Some(Utc.with_ymd_and_hms(2024, 3, 5, 15, 0, 0).unwrap());
        insert_lead(db.as_ref(), &owner_id, &active, base_time())
            .await
            .unwrap();
        insert_lead(db.as_ref(), &owner_id, &new_lead(2), base_time())
            .await
            .unwrap();

        let q = query(&owner_id, r#"{"last_activity_at": {"on": "2024-03-05"}}"#);
        assert_eq!(count_leads(db.as_ref(), &q).await.unwrap(), 1);

        let q = query(&owner_id, r#"{"last_activity_at": {"before": "2030-01-01"}}"#);
        assert_eq!(count_leads(db.as_ref(), &q).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn activity_at_year_limits_round_trip_and_compare() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;

        let earliest = FilterDate::parse("0000-01-01").unwrap().0;
        let latest = FilterDate::parse("9999-12-31T23:59:59.999999Z").unwrap().0;
        let mut ids = Vec::new();
        for (n, at) in [(1, latest), (2, base_time()), (3, earliest)] {
            let mut lead = new_lead(n);
            lead.last_activity_at = Some(at);
            let inserted = insert_lead(db.as_ref(), &owner_id, &lead, base_time())
                .await
                .unwrap();
            let fetched = get_lead(db.as_ref(), &owner_id, &inserted.id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(fetched.last_activity_at, Some(at));
            ids.push(inserted.id);
        }

        let q = query(&owner_id, r#"{"last_activity_at": {"on": "9999-12-31"}}"#);
        let found = find_leads(db.as_ref(), &q, &page(0, 20)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ids[0]);

        let q = query(&owner_id, r#"{"last_activity_at": {"before": "2000-01-01"}}"#);
        let found = find_leads(db.as_ref(), &q, &page(0, 20)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ids[2]);

        let q = query(&owner_id, r#"{"last_activity_at": {"after": "2024-06-01"}}"#);
        let found = find_leads(db.as_ref(), &q, &page(0, 20)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ids[0]);

        let q = query(
            &owner_id,
            r#"{"last_activity_at": {"between": ["0000-01-01", "9999-12-31T23:59:59.999999Z"]}}"#,
        );
        assert_eq!(count_leads(db.as_ref(), &q).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn update_merges_and_refreshes_updated_at() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;
        let lead = insert_lead(db.as_ref(), &owner_id, &new_lead(1), base_time())
            .await
            .unwrap();

        let later = base_time() + TimeDelta::hours(1);
        let changes = LeadChanges {
            status: Some(LeadStatus::Qualified),
            score: Some(88),
            ..LeadChanges::default()
        };
        let updated = update_lead(db.as_ref(), &owner_id, &lead.id, &changes, later)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, LeadStatus::Qualified);
        assert_eq!(updated.score, 88);
        assert_eq!(updated.first_name, lead.first_name);
        assert_eq!(updated.created_at, lead.created_at);
        assert_eq!(updated.updated_at, later);
    }

    #[tokio::test]
    async fn update_to_taken_email_conflicts() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;
        insert_lead(db.as_ref(), &owner_id, &new_lead(1), base_time())
            .await
            .unwrap();
        let second = insert_lead(db.as_ref(), &owner_id, &new_lead(2), base_time())
            .await
            .unwrap();

        let changes = LeadChanges {
            email: Some("lead1@example.com".to_string()),
            ..LeadChanges::default()
        };
        let err = update_lead(db.as_ref(), &owner_id, &second.id, &changes, base_time())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn delete_twice_reports_missing() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;
        let lead = insert_lead(db.as_ref(), &owner_id, &new_lead(1), base_time())
            .await
            .unwrap();

        assert!(delete_lead(db.as_ref(), &owner_id, &lead.id).await.unwrap());
        assert!(!delete_lead(db.as_ref(), &owner_id, &lead.id).await.unwrap());
        assert!(get_lead(db.as_ref(), &owner_id, &lead.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn summary_of_empty_owner_is_zeroed() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;

        let stats = summary_stats(db.as_ref(), &LeadQuery::for_owner(owner_id.as_str()))
            .await
            .unwrap();
        assert_eq!(stats, SummaryStats::default());
    }

    #[tokio::test]
    async fn summary_aggregates_owner_leads() {
        let (_dir, db) = temp_db().await;
        let owner_id = owner(db.as_ref(), "owner@example.com").await;
        let other_id = owner(db.as_ref(), "other@example.com").await;

        let fixtures = [
            (LeadStatus::Won, LeadSource::Referral, 80, 1000.0, true),
            (LeadStatus::Won, LeadSource::Website, 60, 500.0, true),
            (LeadStatus::New, LeadSource::Website, 40, 0.0, false),
        ];
        for (n, (status, source, score, value, qualified)) in (0..).zip(fixtures) {
            let mut lead = new_lead(n);
            lead.status = status;
            lead.source = source;
            lead.score = score;
            lead.lead_value = value;
            lead.is_qualified = qualified;
            insert_lead(
                db.as_ref(),
                &owner_id,
                &lead,
                base_time() + TimeDelta::minutes(i64::from(n)),
            )
            .await
            .unwrap();
        }
        let mut foreign = new_lead(99);
        foreign.lead_value = 1_000_000.0;
        insert_lead(db.as_ref(), &other_id, &foreign, base_time())
            .await
            .unwrap();

        let stats = summary_stats(db.as_ref(), &LeadQuery::for_owner(owner_id.as_str()))
            .await
            .unwrap();

        assert_eq!(stats.totals.total_leads, 3);
        assert!((stats.totals.total_value - 1500.0).abs() < 1e-9);
        assert!((stats.totals.avg_score - 60.0).abs() < 1e-9);
        assert!((stats.totals.avg_value - 500.0).abs() < 1e-9);

        assert_eq!(
            stats.by_status,
            [
                Bucket {
                    key: LeadStatus::Won,
                    count: 2
                },
                Bucket {
                    key: LeadStatus::New,
                    count: 1
                },
            ]
        );
        assert_eq!(
            stats.by_source,
            [
                Bucket {
                    key: LeadSource::Website,
                    count: 2
                },
                Bucket {
                    key: LeadSource::Referral,
                    count: 1
                },
            ]
        );
        assert_eq!(
            stats.by_qualified,
            [Bucket { key: true, count: 2 }, Bucket { key: false, count: 1 }]
        );

        let recent: Vec<&str> = stats.recent.iter().map(|l| l.first_name.as_str()).collect();
        assert_eq!(recent, ["First2", "First1", "First0"]);
    }
}
