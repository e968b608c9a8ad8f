use std::env;

use lettre::message::Mailbox;
use tracing::warn;

use crate::error::ParksError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Site
    pub site_domain: String,
    pub admins: Vec<Admin>,

    // Outbound mail
    pub smtp: SmtpConfig,

    // Nearby transit search radius. Loaded but not used by any page yet.
    pub transit_distance_miles: f64,
}

/// A moderator who receives flagged-story notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Empty means "do not send, log instead".
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub starttls: bool,
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ParksError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: required_env("DATABASE_URL")?,
            database_max_connections: parsed_env("DATABASE_MAX_CONNECTIONS", 10)?,
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: parsed_env("WEB_PORT", 3000)?,
            site_domain: env::var("SITE_DOMAIN").unwrap_or_else(|_| "localhost:3000".to_string()),
            admins: parse_admins(&env::var("ADMINS").unwrap_or_default())?,
            smtp: SmtpConfig {
                host: env::var("SMTP_HOST").unwrap_or_default(),
                port: parsed_env("SMTP_PORT", 587)?,
                username: env::var("SMTP_USERNAME").ok().filter(|s| !s.is_empty()),
                password: env::var("SMTP_PASSWORD").ok().filter(|s| !s.is_empty()),
                starttls: parsed_env("SMTP_STARTTLS", true)?,
            },
            transit_distance_miles: parsed_env("TRANSIT_DISTANCE_MILES", 0.25)?,
        })
    }

    /// Recipient addresses for moderation mail.
    pub fn admin_emails(&self) -> Vec<String> {
        self.admins.iter().map(|a| a.email.clone()).collect()
    }
}

/// Parse `Name <email>, Other <other@example.org>` into admins. Each entry
/// must be a valid mailbox; a bare address is used as its own name.
pub fn parse_admins(raw: &str) -> Result<Vec<Admin>, ParksError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_admin)
        .collect()
}

fn parse_admin(entry: &str) -> Result<Admin, ParksError> {
    let mailbox: Mailbox = entry
        .parse()
        .map_err(|e| ParksError::Config(format!("invalid ADMINS entry {entry:?}: {e}")))?;

    let email = mailbox.email.to_string();
    let name = mailbox
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| email.clone());
    Ok(Admin { name, email })
}

fn required_env(key: &str) -> Result<String, ParksError> {
    env::var(key).map_err(|_| ParksError::Config(format!("{key} environment variable is required")))
}

fn parsed_env<T>(key: &str, default: T) -> Result<T, ParksError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|e| {
            warn!(key, value = raw.as_str(), "Invalid environment value");
            ParksError::Config(format!("{key}: {e}"))
        }),
        _ => Ok(default),
    }
}
