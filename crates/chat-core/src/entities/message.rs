//! Message entity - a chat message as returned by the REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::embed::Embed;
use crate::value_objects::Snowflake;

/// Author summary embedded in message payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<MessageAuthor>,
    /// Raw content, mentions unresolved
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tts: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde(default)]
    pub attachments: Vec<MessageAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a plain text message value
    pub fn new(id: Snowflake, channel_id: Snowflake, content: impl Into<String>) -> Self {
        Self {
            id,
            channel_id,
            author: None,
            content: content.into(),
            tts: false,
            pinned: false,
            embeds: Vec::new(),
            attachments: Vec::new(),
            timestamp: None,
            edited_timestamp: None,
        }
    }

    /// Check if message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_timestamp.is_some()
    }

    /// Check if message content is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// True when the message carries embeds but no text
    ///
    /// Sending such a message requires the embed-links capability.
    #[inline]
    pub fn is_embed_only(&self) -> bool {
        self.content.is_empty() && !self.embeds.is_empty()
    }

    /// Get a truncated preview of the message (for logs)
    pub fn preview(&self, max_len: usize) -> &str {
        if self.content.len() <= max_len {
            &self.content
        } else {
            let mut end = max_len;
            while !self.content.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.content[..end]
        }
    }
}

/// File attached to a message that already exists on the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAttachment {
    pub id: Snowflake,
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl MessageAttachment {
    /// Create a new attachment descriptor
    pub fn new(id: Snowflake, filename: impl Into<String>, url: impl Into<String>, size: u64) -> Self {
        Self {
            id,
            filename: filename.into(),
            url: url.into(),
            size,
            proxy_url: None,
            width: None,
            height: None,
        }
    }

    /// Check if attachment has dimensions (is an image/video)
    pub fn is_image(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_creation() {
        let msg = Message::new(Snowflake::new(1), Snowflake::new(100), "Hello, world!");
        assert!(!msg.is_edited());
        assert!(!msg.is_empty());
        assert!(!msg.is_embed_only());
    }

    #[test]
    fn test_embed_only() {
        let mut msg = Message::new(Snowflake::new(1), Snowflake::new(100), "");
        assert!(!msg.is_embed_only());
        msg.embeds.push(Embed::new().title("t"));
        assert!(msg.is_embed_only());
    }

    #[test]
    fn test_message_preview() {
        let msg = Message::new(Snowflake::new(1), Snowflake::new(100), "Hello, world!");
        assert_eq!(msg.preview(5), "Hello");
        assert_eq!(msg.preview(100), "Hello, world!");
    }

    #[test]
    fn test_deserialize_wire_payload() {
        let value = json!({
            "id": "175928847299117063",
            "channel_id": "81384788765712384",
            "author": { "id": "80351110224678912", "username": "Nelly" },
            "content": "Supa Hot",
            "tts": false,
            "embeds": [{ "title": "first" }, { "title": "second" }],
            "attachments": [{
                "id": "1",
                "filename": "cat.png",
                "url": "https://cdn.example/cat.png",
                "size": 42,
                "width": 10,
                "height": 10
            }],
            "timestamp": "2016-04-30T11:18:25.796000+00:00",
            "edited_timestamp": null
        });

        let msg: Message = serde_json::from_value(value).unwrap();
        assert_eq!(msg.id, Snowflake::new(175_928_847_299_117_063));
        assert_eq!(msg.author.as_ref().map(|a| a.username.as_str()), Some("Nelly"));
        assert_eq!(msg.embeds.len(), 2);
        assert_eq!(msg.attachments[0].filename, "cat.png");
        assert!(msg.attachments[0].is_image());
        assert!(!msg.is_edited());
    }
}
