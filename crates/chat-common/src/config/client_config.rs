//! Client configuration
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use std::env;
use std::time::Duration;

use chat_core::AccountType;
use serde::Deserialize;

use crate::telemetry::TracingConfig;

/// Main client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Authentication token
    pub token: String,
    #[serde(default)]
    pub account_type: AccountType,
    #[serde(default)]
    pub env: Environment,
    pub http: HttpConfig,
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

    /// Tracing profile matching this environment
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        match self {
            Self::Development => TracingConfig::development(),
            Self::Staging => TracingConfig::default(),
            Self::Production => TracingConfig::production(),
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://discordapp.com/api/v6".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("chat-client ({}, {})", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    /// Build a configuration with defaults for everything but the credentials
    #[must_use]
    pub fn new(token: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            token: token.into(),
            account_type,
            env: Environment::default(),
            http: HttpConfig::default(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `CHAT_TOKEN` is missing or a value cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let token = env::var("CHAT_TOKEN").map_err(|_| ConfigError::MissingVar("CHAT_TOKEN"))?;
        if token.trim().is_empty() {
            return Err(ConfigError::InvalidValue("CHAT_TOKEN", "token is blank".to_string()));
        }

        let account_type = match env::var("CHAT_ACCOUNT_TYPE") {
            Ok(raw) => AccountType::parse(&raw)
                .ok_or(ConfigError::InvalidValue("CHAT_ACCOUNT_TYPE", raw))?,
            Err(_) => AccountType::default(),
        };

        let timeout_secs = match env::var("CHAT_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CHAT_HTTP_TIMEOUT_SECS", raw))?,
            Err(_) => default_timeout_secs(),
        };

        Ok(Self {
            token,
            account_type,
            env: env::var("APP_ENV")
                .ok()
                .and_then(|s| Environment::parse(&s))
                .unwrap_or_default(),
            http: HttpConfig {
                base_url: env::var("CHAT_API_BASE_URL").unwrap_or_else(|_| default_base_url()),
                timeout_secs,
                user_agent: env::var("CHAT_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
            },
        })
    }

    /// Value for the `Authorization` header
    ///
    /// Bot tokens carry the `Bot ` prefix; client tokens are sent raw.
    #[must_use]
    pub fn authorization(&self) -> String {
        match self.account_type {
            AccountType::Bot => format!("Bot {}", self.token),
            AccountType::Client => self.token.clone(),
        }
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
