//! Configuration types, built from environment variables.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default backing file, relative to the working directory.
pub const DEFAULT_TASK_FILE: &str = "task.csv";

/// Tasks due within this many days trigger a reminder.
pub const DEFAULT_WARNING_DAYS: i64 = 2;

pub const DEFAULT_COMPANY_DOMAIN: &str = "yourcompany.com";

/// Look up and parse an optional variable, falling back to `default`.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?}: {e}"),
        }),
        None => Ok(default),
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Where the task table lives.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = lookup("TASK_TRACKER_FILE").unwrap_or_else(|| DEFAULT_TASK_FILE.to_string());
        Self {
            path: PathBuf::from(path),
        }
    }
}

/// Dashboard HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: parse_or(&lookup, "TASK_TRACKER_PORT", 8080)?,
        })
    }
}

/// Reminder scan settings.
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// Remind when `deadline - today <= warning_days`.
    pub warning_days: i64,
    /// Appended to the normalised assignee name to form the recipient.
    pub company_domain: String,
    /// Log reminders instead of sending them. No SMTP credentials needed.
    pub dry_run: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            warning_days: DEFAULT_WARNING_DAYS,
            company_domain: DEFAULT_COMPANY_DOMAIN.to_string(),
            dry_run: false,
        }
    }
}

impl ReminderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let warning_days = parse_or(&lookup, "REMINDER_WARNING_DAYS", DEFAULT_WARNING_DAYS)?;
        let company_domain = lookup("REMINDER_COMPANY_DOMAIN")
            .map(|d| d.trim().trim_start_matches('@').to_string())
            .unwrap_or_else(|| DEFAULT_COMPANY_DOMAIN.to_string());
        let dry_run = lookup("REMINDER_DRY_RUN")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            warning_days,
            company_domain,
            dry_run,
        })
    }
}

/// Authenticated SMTP relay for outbound reminders.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

impl SmtpConfig {
    /// Build from environment. Username and password are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string());
        let port = parse_or(&lookup, "SMTP_PORT", 587)?;
        let username =
            lookup("SMTP_USERNAME").ok_or_else(|| ConfigError::MissingEnvVar("SMTP_USERNAME".into()))?;
        let password = lookup("SMTP_PASSWORD")
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("SMTP_PASSWORD".into()))?;
        let from_address = lookup("SMTP_FROM_ADDRESS").unwrap_or_else(|| username.clone());

        Ok(Self {
            host,
            port,
            username,
            password,
            from_address,
        })
    }
}
