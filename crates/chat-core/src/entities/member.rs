//! Member entity - a user's membership in a guild

use serde::{Deserialize, Serialize};

use crate::value_objects::{Permissions, Snowflake};

/// Guild member with its effective guild-level permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default)]
    pub permissions: Permissions,
}

impl Member {
    /// Create a new Member
    pub fn new(guild_id: Snowflake, user_id: Snowflake, permissions: Permissions) -> Self {
        Self {
            guild_id,
            user_id,
            nickname: None,
            permissions,
        }
    }

    /// Get display name (nickname if set, otherwise fallback)
    pub fn display_name<'a>(&'a self, username: &'a str) -> &'a str {
        self.nickname.as_deref().unwrap_or(username)
    }

    /// Check if this member belongs to the given guild
    #[inline]
    pub fn is_in_guild(&self, guild_id: Snowflake) -> bool {
        self.guild_id == guild_id
    }
}
