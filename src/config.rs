use anyhow::Context;
use serde::Deserialize;

/// Longest accepted inactivity window: one year.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_minutes: i64,
    pub secure_cookie: bool,
    pub purge_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "mvc_session".into(),
            ttl_minutes: 120,
            secure_cookie: false,
            purge_interval_secs: 600,
        }
    }
}

impl SessionConfig {
    /// Inactivity window for the session layer, kept within
    /// `1..=MAX_SESSION_TTL_MINUTES` even when the struct was built by hand.
    pub fn inactivity(&self) -> time::Duration {
        time::Duration::minutes(self.ttl_minutes.clamp(1, MAX_SESSION_TTL_MINUTES))
    }
}

/// `SESSION_TTL_MINUTES`: unset falls back to the default, anything outside
/// `1..=MAX_SESSION_TTL_MINUTES` is a startup error.
pub fn parse_ttl_minutes(raw: Option<&str>, default: i64) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let minutes = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("SESSION_TTL_MINUTES is not a number: {raw:?}"))?;
    anyhow::ensure!(
        (1..=MAX_SESSION_TTL_MINUTES).contains(&minutes),
        "SESSION_TTL_MINUTES must be between 1 and {MAX_SESSION_TTL_MINUTES}, got {minutes}"
    );
    Ok(minutes)
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let defaults = SessionConfig::default();
        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.cookie_name),
            ttl_minutes: parse_ttl_minutes(
                std::env::var("SESSION_TTL_MINUTES").ok().as_deref(),
                defaults.ttl_minutes,
            )?,
            secure_cookie: std::env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.secure_cookie),
            purge_interval_secs: std::env::var("SESSION_PURGE_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.purge_interval_secs),
        };
        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            session,
        })
    }
}
