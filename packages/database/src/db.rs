//! Database connection and schema.

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::DbError;

/// Default path for the lead database.
pub const DEFAULT_DB_PATH: &str = "data/leads.db";

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id            TEXT PRIMARY KEY,
        email         TEXT NOT NULL UNIQUE,
        first_name    TEXT NOT NULL,
        last_name     TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at    TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        token      TEXT PRIMARY KEY,
        user_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        expires_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS leads (
        id               TEXT PRIMARY KEY,
        owner_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        first_name       TEXT NOT NULL,
        last_name        TEXT NOT NULL,
        email            TEXT NOT NULL,
        phone            TEXT NOT NULL,
        company          TEXT NOT NULL,
        city             TEXT NOT NULL,
        state            TEXT NOT NULL,
        source           TEXT NOT NULL,
        status           TEXT NOT NULL DEFAULT 'new',
        score            INTEGER NOT NULL DEFAULT 0 CHECK (score BETWEEN 0 AND 100),
        lead_value       REAL NOT NULL DEFAULT 0 CHECK (lead_value >= 0),
        is_qualified     INTEGER NOT NULL DEFAULT 0,
        last_activity_at TEXT,
        created_at       TEXT NOT NULL,
        updated_at       TEXT NOT NULL,
        email_folded     TEXT NOT NULL,
        company_folded   TEXT NOT NULL,
        city_folded      TEXT NOT NULL,
        UNIQUE(owner_id, email)
    )",
    "CREATE INDEX IF NOT EXISTS idx_leads_owner_created ON leads (owner_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_leads_owner_status ON leads (owner_id, status)",
    "CREATE INDEX IF NOT EXISTS idx_leads_owner_source ON leads (owner_id, source)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions (user_id)",
    "PRAGMA foreign_keys = ON",
];

/// Opens (or creates) the `SQLite` database at `path` and ensures the
/// schema exists.
///
/// # Errors
///
/// Returns [`DbError`] if the parent directory cannot be created, the
/// database cannot be opened, or schema creation fails.
pub async fn open(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Connection {
        message: e.to_string(),
    })?;

    ensure_schema(db.as_ref()).await?;

    log::info!("Opened lead database at {}", path.display());

    Ok(db)
}

/// Creates all tables and indexes if they don't already exist.
///
/// # Errors
///
/// Returns [`DbError::Database`] if a statement fails.
pub async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    for statement in SCHEMA {
        db.exec_raw(statement).await?;
    }
    Ok(())
}
