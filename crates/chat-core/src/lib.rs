//! # chat-core
//!
//! Domain layer containing snowflakes, permissions, entity values and domain errors.
//! This crate has zero dependencies on infrastructure (HTTP, runtime, etc.).

pub mod entities;
pub mod error;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Embed, EmbedAuthor, EmbedField, EmbedFooter, EmbedMedia, Emote, Member, Message, MessageAttachment,
    MessageAuthor, Webhook,
};
pub use error::DomainError;
pub use value_objects::{
    AccountStanding, AccountType, Permissions, Snowflake, SnowflakeParseError, VerificationLevel,
};
