//! Shared message-channel operations
//!
//! Builds the actions common to every message-bearing channel. Callers such as
//! [`TextChannel`](super::TextChannel) run their permission gate first and then
//! delegate here.

use std::path::Path;
use std::sync::Arc;

use chat_core::{DomainError, Message, Snowflake};

use crate::requests::entity_builder::decode_each;
use crate::requests::route::messages;
use crate::requests::{FailureInfo, MessageAction, RestAction, RestContext};
use crate::requests::Response;

/// Maximum characters of a plain text message
pub const MAX_CONTENT_LENGTH: usize = 2000;

/// Bounds of a single history request
pub const HISTORY_LIMIT_MIN: usize = 1;
pub const HISTORY_LIMIT_MAX: usize = 100;

/// Messages retrieved from a channel, newest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHistory {
    channel_id: Snowflake,
    messages: Vec<Message>,
}

impl MessageHistory {
    pub fn new(channel_id: Snowflake, messages: Vec<Message>) -> Self {
        Self {
            channel_id,
            messages,
        }
    }

    pub fn channel_id(&self) -> Snowflake {
        self.channel_id
    }

    pub fn retrieved(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn message_by_id(&self, id: Snowflake) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

pub(crate) fn require_id(id: &str, what: &str) -> Result<(), DomainError> {
    if id.trim().is_empty() {
        return Err(DomainError::invalid_argument(format!("{what} may not be blank")));
    }
    Ok(())
}

fn decode_message(response: &Response, context: &RestContext) -> Result<Message, FailureInfo> {
    let Some(body) = response.body.as_ref().filter(|b| b.is_object()) else {
        return Err(FailureInfo::decode(response, "expected a message object"));
    };
    context
        .entity_builder()
        .create_message(body)
        .map_err(|e| FailureInfo::decode(response, e))
}

fn decode_messages(response: &Response, context: &RestContext) -> Result<Vec<Message>, FailureInfo> {
    let items = response
        .array()
        .ok_or_else(|| FailureInfo::decode(response, "expected an array of messages"))?;
    Ok(decode_each("message", items, |item| {
        context.entity_builder().create_message(item)
    }))
}

// ============================================================================
// Sending
// ============================================================================

/// Send a plain text message
///
/// # Errors
/// Returns `InvalidArgument` if the text is blank or longer than 2000 characters
pub fn send_text(
    context: &Arc<RestContext>,
    channel_id: Snowflake,
    text: &str,
) -> Result<MessageAction, DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::invalid_argument("Provided text for message may not be blank"));
    }
    if text.chars().count() > MAX_CONTENT_LENGTH {
        return Err(DomainError::invalid_argument(format!(
            "Provided text for message must be less than {MAX_CONTENT_LENGTH} characters in length"
        )));
    }
    let mut action = send_action(context, channel_id);
    action.content(Some(text));
    Ok(action)
}

/// Send a copy of `message`'s content, tts flag and first embed
pub fn send_message(context: &Arc<RestContext>, channel_id: Snowflake, message: &Message) -> MessageAction {
    let mut action = send_action(context, channel_id);
    action.apply_content(message);
    action
}

/// Upload in-memory data, optionally with accompanying message content
///
/// # Errors
/// Same as [`MessageAction::add_file`]
pub fn send_file(
    context: &Arc<RestContext>,
    channel_id: Snowflake,
    data: Vec<u8>,
    name: &str,
    message: Option<&Message>,
) -> Result<MessageAction, DomainError> {
    let mut action = send_action(context, channel_id);
    if let Some(message) = message {
        action.apply_content(message);
    }
    action.add_file(data, name)?;
    Ok(action)
}

/// Upload a file from disk, optionally with accompanying message content
///
/// # Errors
/// Same as [`MessageAction::add_file_path`]
pub fn send_file_path(
    context: &Arc<RestContext>,
    channel_id: Snowflake,
    path: &Path,
    message: Option<&Message>,
) -> Result<MessageAction, DomainError> {
    let mut action = send_action(context, channel_id);
    if let Some(message) = message {
        action.apply_content(message);
    }
    action.add_file_path(path)?;
    Ok(action)
}

fn send_action(context: &Arc<RestContext>, channel_id: Snowflake) -> MessageAction {
    let route = messages::SEND_MESSAGE.compile(&[&channel_id.to_string()]);
    MessageAction::new(Arc::clone(context), route)
}

/// Replace an existing message's content, tts flag and embed
///
/// # Errors
/// Returns `InvalidArgument` if the message id is blank
pub fn edit_message_by_id(
    context: &Arc<RestContext>,
    channel_id: Snowflake,
    message_id: &str,
    message: &Message,
) -> Result<MessageAction, DomainError> {
    require_id(message_id, "Message id")?;
    let route = messages::EDIT_MESSAGE.compile(&[&channel_id.to_string(), message_id]);
    let mut action = MessageAction::new(Arc::clone(context), route);
    action.apply_content(message);
    Ok(action)
}

// ============================================================================
// Retrieval and deletion
// ============================================================================

/// # Errors
/// Returns `InvalidArgument` if the message id is blank
pub fn message_by_id(
    context: &Arc<RestContext>,
    channel_id: Snowflake,
    message_id: &str,
) -> Result<RestAction<Message>, DomainError> {
    require_id(message_id, "Message id")?;
    let route = messages::GET_MESSAGE.compile(&[&channel_id.to_string(), message_id]);
    Ok(RestAction::new(Arc::clone(context), route, decode_message))
}

/// # Errors
/// Returns `InvalidArgument` if the message id is blank
pub fn delete_message_by_id(
    context: &Arc<RestContext>,
    channel_id: Snowflake,
    message_id: &str,
) -> Result<RestAction<()>, DomainError> {
    require_id(message_id, "Message id")?;
    let route = messages::DELETE_MESSAGE.compile(&[&channel_id.to_string(), message_id]);
    Ok(RestAction::empty(Arc::clone(context), route))
}

/// Messages surrounding `message_id`
///
/// # Errors
/// Returns `InvalidArgument` for a blank id or a limit outside 1..=100
pub fn history_around(
    context: &Arc<RestContext>,
    channel_id: Snowflake,
    message_id: &str,
    limit: usize,
) -> Result<RestAction<MessageHistory>, DomainError> {
    require_id(message_id, "Provided message id")?;
    if !(HISTORY_LIMIT_MIN..=HISTORY_LIMIT_MAX).contains(&limit) {
        return Err(DomainError::invalid_argument(format!(
            "Provided limit was out of bounds. Minimum: {HISTORY_LIMIT_MIN}, Max: {HISTORY_LIMIT_MAX}. Provided: {limit}"
        )));
    }

    let route = messages::GET_MESSAGE_HISTORY
        .compile(&[&channel_id.to_string()])
        .with_query("around", message_id)
        .with_query("limit", limit);
    Ok(RestAction::new(Arc::clone(context), route, move |response, context| {
        decode_messages(response, context).map(|messages| MessageHistory::new(channel_id, messages))
    }))
}

// ============================================================================
// Pins
// ============================================================================

/// # Errors
/// Returns `InvalidArgument` if the message id is blank
pub fn pin_message_by_id(
    context: &Arc<RestContext>,
    channel_id: Snowflake,
    message_id: &str,
) -> Result<RestAction<()>, DomainError> {
    require_id(message_id, "Message id")?;
    let route = messages::ADD_PINNED_MESSAGE.compile(&[&channel_id.to_string(), message_id]);
    Ok(RestAction::empty(Arc::clone(context), route))
}

/// # Errors
/// Returns `InvalidArgument` if the message id is blank
pub fn unpin_message_by_id(
    context: &Arc<RestContext>,
    channel_id: Snowflake,
    message_id: &str,
) -> Result<RestAction<()>, DomainError> {
    require_id(message_id, "Message id")?;
    let route = messages::REMOVE_PINNED_MESSAGE.compile(&[&channel_id.to_string(), message_id]);
    Ok(RestAction::empty(Arc::clone(context), route))
}

pub fn pinned_messages(context: &Arc<RestContext>, channel_id: Snowflake) -> RestAction<Vec<Message>> {
    let route = messages::GET_PINNED_MESSAGES.compile(&[&channel_id.to_string()]);
    RestAction::new(Arc::clone(context), route, decode_messages)
}

// ============================================================================
// Reactions
// ============================================================================

/// React to a message with a unicode emoji or an emote reaction code
///
/// # Errors
/// Returns `InvalidArgument` if the message id or reaction code is blank
pub fn add_reaction_by_id(
    context: &Arc<RestContext>,
    channel_id: Snowflake,
    message_id: &str,
    reaction_code: &str,
) -> Result<RestAction<()>, DomainError> {
    require_id(message_id, "Message id")?;
    require_id(reaction_code, "Provided unicode")?;
    let route = messages::ADD_REACTION.compile(&[&channel_id.to_string(), message_id, reaction_code]);
    Ok(RestAction::empty(Arc::clone(context), route))
}
