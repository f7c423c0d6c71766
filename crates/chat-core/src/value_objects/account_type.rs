//! Account class of the authenticated client

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account class; determines authorization header style and embed limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Bot,
    Client,
}

impl AccountType {
    /// Maximum total embed length for bot accounts
    pub const EMBED_MAX_LENGTH_BOT: usize = 6000;

    /// Maximum total embed length for user (client) accounts
    pub const EMBED_MAX_LENGTH_CLIENT: usize = 2000;

    /// Maximum total embed length this account may send
    #[inline]
    pub const fn embed_max_length(self) -> usize {
        match self {
            Self::Bot => Self::EMBED_MAX_LENGTH_BOT,
            Self::Client => Self::EMBED_MAX_LENGTH_CLIENT,
        }
    }

    /// Parse from a case-insensitive name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bot" => Some(Self::Bot),
            "client" | "user" => Some(Self::Client),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bot => f.write_str("BOT"),
            Self::Client => f.write_str("CLIENT"),
        }
    }
}
