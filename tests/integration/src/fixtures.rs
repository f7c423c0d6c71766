//! Test fixtures and payload builders
//!
//! JSON shapes the mock API answers with, and ids that satisfy client-side checks.

use std::sync::atomic::{AtomicU64, Ordering};

use chat_core::{Permissions, Snowflake};
use chrono::Utc;
use serde_json::{json, Value};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Every text permission a bot typically holds
pub fn text_permissions() -> Permissions {
    Permissions::MESSAGE_READ
        | Permissions::MESSAGE_WRITE
        | Permissions::MESSAGE_HISTORY
        | Permissions::MESSAGE_MANAGE
        | Permissions::MESSAGE_ADD_REACTION
        | Permissions::MESSAGE_ATTACH_FILES
        | Permissions::MESSAGE_EMBED_LINKS
        | Permissions::MANAGE_WEBHOOKS
}

/// Message ids created just now, safe for bulk deletion
pub fn fresh_message_ids(count: usize) -> Vec<String> {
    let base = Snowflake::from_timestamp(Utc::now()).into_inner();
    (0..count)
        .map(|_| (base + unique_suffix()).to_string())
        .collect()
}

/// Message object as returned by the API
pub fn message_json(id: u64, channel_id: u64, content: &str) -> Value {
    json!({
        "id": id.to_string(),
        "channel_id": channel_id.to_string(),
        "author": { "id": "2", "username": "integration-bot", "bot": true },
        "content": content,
        "tts": false,
        "pinned": false,
        "embeds": [],
        "attachments": [],
        "timestamp": "2024-06-01T12:00:00+00:00"
    })
}

/// Webhook object as returned by the API
pub fn webhook_json(id: u64, channel_id: u64, name: &str) -> Value {
    json!({
        "id": id.to_string(),
        "channel_id": channel_id.to_string(),
        "guild_id": "1",
        "name": name,
        "token": format!("token-{id}")
    })
}

/// Platform error body
pub fn error_json(code: i64, message: &str) -> Value {
    json!({ "code": code, "message": message })
}
