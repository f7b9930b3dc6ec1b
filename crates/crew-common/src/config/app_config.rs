//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crew_core::{COMMENT_MAX_CHARS, NOTIFICATION_PREVIEW_CHARS};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub social: SocialConfig,
    pub relay: RelayConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Social layer tuning
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SocialConfig {
    /// Longest accepted comment, in characters
    #[serde(default = "default_comment_max_chars")]
    pub comment_max_chars: usize,
    /// Notifications loaded per page
    #[serde(default = "default_notification_page_size")]
    pub notification_page_size: i64,
    /// Characters of a comment quoted in its notification
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    /// Whether DELETE change events carry the whole old row
    #[serde(default)]
    pub full_delete_payloads: bool,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            comment_max_chars: default_comment_max_chars(),
            notification_page_size: default_notification_page_size(),
            preview_chars: default_preview_chars(),
            full_delete_payloads: false,
        }
    }
}

/// Change relay settings
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// PostgreSQL NOTIFY channel the triggers publish on
    #[serde(default = "default_notify_channel")]
    pub notify_channel: String,
}

// Default value functions
fn default_app_name() -> String {
    "crew-social".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_comment_max_chars() -> usize {
    COMMENT_MAX_CHARS
}

fn default_notification_page_size() -> i64 {
    50
}

fn default_preview_chars() -> usize {
    NOTIFICATION_PREVIEW_CHARS
}

fn default_notify_channel() -> String {
    "crew_changes".to_string()
}

/// Parse an optional variable, falling back to `default` when unset or malformed
fn parsed_or<T: FromStr>(value: Option<String>, default: fn() -> T) -> T {
    value.and_then(|s| s.parse().ok()).unwrap_or_else(default)
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let social = SocialConfig {
            comment_max_chars: parsed_or(
                lookup("SOCIAL_COMMENT_MAX_CHARS"),
                default_comment_max_chars,
            ),
            notification_page_size: parsed_or(
                lookup("SOCIAL_NOTIFICATION_PAGE_SIZE"),
                default_notification_page_size,
            ),
            preview_chars: parsed_or(lookup("SOCIAL_PREVIEW_CHARS"), default_preview_chars),
            full_delete_payloads: lookup("SOCIAL_FULL_DELETE_PAYLOADS")
                .is_some_and(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes")),
        };

        if social.comment_max_chars == 0 || social.comment_max_chars > COMMENT_MAX_CHARS {
            return Err(ConfigError::InvalidValue(
                "SOCIAL_COMMENT_MAX_CHARS",
                format!("must be between 1 and {COMMENT_MAX_CHARS}"),
            ));
        }
        if social.notification_page_size <= 0 {
            return Err(ConfigError::InvalidValue(
                "SOCIAL_NOTIFICATION_PAGE_SIZE",
                "must be positive".to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parsed_or(
                    lookup("DATABASE_MAX_CONNECTIONS"),
                    default_max_connections,
                ),
                min_connections: parsed_or(
                    lookup("DATABASE_MIN_CONNECTIONS"),
                    default_min_connections,
                ),
            },
            redis: RedisConfig {
                url: lookup("REDIS_URL").ok_or(ConfigError::MissingVar("REDIS_URL"))?,
                max_connections: parsed_or(
                    lookup("REDIS_MAX_CONNECTIONS"),
                    default_redis_max_connections,
                ),
            },
            social,
            relay: RelayConfig {
                notify_channel: lookup("RELAY_NOTIFY_CHANNEL")
                    .unwrap_or_else(default_notify_channel),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
