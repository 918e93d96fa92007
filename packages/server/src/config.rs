//! Server configuration read from environment variables.

use std::path::PathBuf;

use chrono::TimeDelta;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Runtime settings for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `BIND_ADDR`
    pub bind_addr: String,
    /// `PORT`
    pub port: u16,
    /// `DATABASE_PATH`
    pub database_path: PathBuf,
    /// `SESSION_TTL_HOURS`
    pub session_ttl: TimeDelta,
    /// `COOKIE_SECURE`. Set when the server sits behind HTTPS.
    pub cookie_secure: bool,
    /// `ALLOWED_ORIGINS`, comma-separated. CORS with credentials is
    /// enabled for exactly these origins.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment. Missing or
    /// unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_path = lookup("DATABASE_PATH").map_or_else(
            || PathBuf::from(lead_forge_database::db::DEFAULT_DB_PATH),
            PathBuf::from,
        );

        let session_ttl = lookup("SESSION_TTL_HOURS")
            .and_then(|h| h.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .and_then(TimeDelta::try_hours)
            .unwrap_or_else(|| TimeDelta::hours(DEFAULT_SESSION_TTL_HOURS));

        let cookie_secure = lookup("COOKIE_SECURE")
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            bind_addr,
            port,
            database_path,
            session_ttl,
            cookie_secure,
            allowed_origins,
        }
    }
}
