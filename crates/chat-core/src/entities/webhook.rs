//! Webhook entity

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Channel webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Webhook {
    /// Execution URL path for this webhook, if the token is known
    pub fn execute_path(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|token| format!("webhooks/{}/{}", self.id, token))
    }
}
