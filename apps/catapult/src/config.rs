use std::time::Duration;

use anyhow::{Context, Result};

use crate::feedback::intern::DEFAULT_CUTOFF_MONTHS;
use crate::lever_client::DEFAULT_API_URL;
use crate::user_cache::DEFAULT_USER_TTL;

/// Header set by the identity-aware proxy in front of the app.
pub const DEFAULT_AUTH_EMAIL_HEADER: &str = "x-goog-authenticated-user-email";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub lever_api_url: String,
    pub lever_api_key: String,
    pub lever_timeout_secs: u64,
    /// When unset, users are cached in-process.
    pub redis_url: Option<String>,
    pub user_cache_ttl: Duration,
    pub intern_cutoff_months: u32,
    pub auth: AuthConfig,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub email_header: String,
    /// e.g. "example.com"; empty allows any domain.
    pub company_domain: String,
    /// Lower-cased. Empty means every company user is an admin.
    pub admin_emails: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            lever_api_url: optional_env("LEVER_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            lever_api_key: require_env("LEVER_API_KEY")?,
            lever_timeout_secs: parse_env("LEVER_TIMEOUT_SECS", 30)?,
            redis_url: optional_env("REDIS_URL"),
            user_cache_ttl: Duration::from_secs(parse_env(
                "USER_CACHE_TTL_SECS",
                DEFAULT_USER_TTL.as_secs(),
            )?),
            intern_cutoff_months: parse_env("INTERN_CUTOFF_MONTHS", DEFAULT_CUTOFF_MONTHS)?,
            auth: AuthConfig {
                email_header: optional_env("AUTH_EMAIL_HEADER")
                    .unwrap_or_else(|| DEFAULT_AUTH_EMAIL_HEADER.to_string())
                    .to_lowercase(),
                company_domain: optional_env("COMPANY_DOMAIN")
                    .unwrap_or_default()
                    .to_lowercase(),
                admin_emails: parse_list(&optional_env("ADMIN_EMAILS").unwrap_or_default()),
            },
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

/// Comma-separated, trimmed, lower-cased, empties dropped.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list(" A@x.com, ,b@x.com "),
            vec!["a@x.com".to_string(), "b@x.com".to_string()]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_parse_env_default_when_unset() {
        let value: u32 = parse_env("CATAPULT_TEST_SURELY_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }
}
