//! User accounts and login sessions.

use chrono::{DateTime, TimeDelta, Utc};
use lead_forge_database_models::{NewUser, UserRow};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};
use uuid::Uuid;

use crate::{DbError, conversion, format_timestamp, parse_timestamp, truncate_timestamp};

/// Inserts a user and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Conflict`] if the email is already registered, or
/// [`DbError`] if the insert fails otherwise.
pub async fn insert_user(
    db: &dyn Database,
    user: &NewUser,
    now: DateTime<Utc>,
) -> Result<UserRow, DbError> {
    let row = UserRow {
        id: Uuid::new_v4().to_string(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        password_hash: user.password_hash.clone(),
        created_at: truncate_timestamp(now),
    };

    db.exec_raw_params(
        "INSERT INTO users (id, email, first_name, last_name, password_hash, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
        &[
            DatabaseValue::String(row.id.clone()),
            DatabaseValue::String(row.email.clone()),
            DatabaseValue::String(row.first_name.clone()),
            DatabaseValue::String(row.last_name.clone()),
            DatabaseValue::String(row.password_hash.clone()),
            DatabaseValue::String(format_timestamp(&row.created_at)),
        ],
    )
    .await?;

    log::info!("Registered user {}", row.id);

    Ok(row)
}

/// Looks up a user by (lowercased) email.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn find_user_by_email(
    db: &dyn Database,
    email: &str,
) -> Result<Option<UserRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, email, first_name, last_name, password_hash, created_at
             FROM users WHERE email = $1",
            &[DatabaseValue::String(email.to_string())],
        )
        .await?;

    rows.first().map(user_from_row).transpose()
}

/// Opens a session for `user_id` valid for `ttl` and returns its token.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub async fn create_session(
    db: &dyn Database,
    user_id: &str,
    now: DateTime<Utc>,
    ttl: TimeDelta,
) -> Result<String, DbError> {
    let token = Uuid::new_v4().to_string();

    db.exec_raw_params(
        "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES ($1, $2, $3, $4)",
        &[
            DatabaseValue::String(token.clone()),
            DatabaseValue::String(user_id.to_string()),
            DatabaseValue::String(format_timestamp(&now)),
            DatabaseValue::String(format_timestamp(&(now + ttl))),
        ],
    )
    .await?;

    Ok(token)
}

/// Resolves a session token to its user. Expired and unknown tokens yield
/// `None`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn find_session_user(
    db: &dyn Database,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<UserRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT u.id AS id, u.email AS email, u.first_name AS first_name,
                    u.last_name AS last_name, u.password_hash AS password_hash,
                    u.created_at AS created_at
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = $1 AND s.expires_at > $2",
            &[
                DatabaseValue::String(token.to_string()),
                DatabaseValue::String(format_timestamp(&now)),
            ],
        )
        .await?;

    rows.first().map(user_from_row).transpose()
}

/// Removes a session. Returns whether it existed.
///
/// # Errors
///
/// Returns [`DbError`] if the delete fails.
pub async fn delete_session(db: &dyn Database, token: &str) -> Result<bool, DbError> {
    let affected = db
        .exec_raw_params(
            "DELETE FROM sessions WHERE token = $1",
            &[DatabaseValue::String(token.to_string())],
        )
        .await?;

    Ok(affected > 0)
}

/// Removes every session that expired at or before `now`.
///
/// # Errors
///
/// Returns [`DbError`] if the delete fails.
pub async fn purge_expired_sessions(db: &dyn Database, now: DateTime<Utc>) -> Result<u64, DbError> {
    let purged = db
        .exec_raw_params(
            "DELETE FROM sessions WHERE expires_at <= $1",
            &[DatabaseValue::String(format_timestamp(&now))],
        )
        .await?;

    if purged > 0 {
        log::debug!("Purged {purged} expired sessions");
    }

    Ok(purged)
}

fn user_from_row(row: &Row) -> Result<UserRow, DbError> {
    let created_at: String = row.to_value("created_at").map_err(conversion("created_at"))?;

    Ok(UserRow {
        id: row.to_value("id").map_err(conversion("id"))?,
        email: row.to_value("email").map_err(conversion("email"))?,
        first_name: row.to_value("first_name").map_err(conversion("first_name"))?,
        last_name: row.to_value("last_name").map_err(conversion("last_name"))?,
        password_hash: row
            .to_value("password_hash")
            .map_err(conversion("password_hash"))?,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::test_support::temp_db;

    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            password_hash: "$argon2id$fake".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_find_by_email() {
        let (_dir, db) = temp_db().await;
        let user = insert_user(db.as_ref(), &new_user("jane@example.com"), Utc::now())
            .await
            .unwrap();

        let found = find_user_by_email(db.as_ref(), "jane@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, user);

        assert!(
            find_user_by_email(db.as_ref(), "nobody@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let (_dir, db) = temp_db().await;
        insert_user(db.as_ref(), &new_user("jane@example.com"), Utc::now())
            .await
            .unwrap();

        let err = insert_user(db.as_ref(), &new_user("jane@example.com"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let (_dir, db) = temp_db().await;
        let user = insert_user(db.as_ref(), &new_user("jane@example.com"), Utc::now())
            .await
            .unwrap();

        let now = Utc::now();
        let token = create_session(db.as_ref(), &user.id, now, TimeDelta::hours(1))
            .await
            .unwrap();

        let resolved = find_session_user(db.as_ref(), &token, now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.id, user.id);

        assert!(delete_session(db.as_ref(), &token).await.unwrap());
        assert!(!delete_session(db.as_ref(), &token).await.unwrap());
        assert!(
            find_session_user(db.as_ref(), &token, now)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn expired_sessions_do_not_resolve() {
        let (_dir, db) = temp_db().await;
        let user = insert_user(db.as_ref(), &new_user("jane@example.com"), Utc::now())
            .await
            .unwrap();

        let now = Utc::now();
        let token = create_session(db.as_ref(), &user.id, now, TimeDelta::minutes(5))
            .await
            .unwrap();

        let later = now + TimeDelta::minutes(10);
        assert!(
            find_session_user(db.as_ref(), &token, later)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(purge_expired_sessions(db.as_ref(), later).await.unwrap(), 1);
    }
}
