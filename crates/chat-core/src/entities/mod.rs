//! Domain entities - values decoded from or sent to the REST API

mod embed;
mod emote;
mod member;
mod message;
mod webhook;

pub use embed::{Embed, EmbedAuthor, EmbedField, EmbedFooter, EmbedMedia};
pub use emote::Emote;
pub use member::Member;
pub use message::{Message, MessageAttachment, MessageAuthor};
pub use webhook::Webhook;
