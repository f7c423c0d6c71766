//! Entity construction from response payloads

use chat_core::{Message, Webhook};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::error::RestResult;

/// Turns raw JSON objects into domain values
pub trait EntityBuilder: Send + Sync {
    /// # Errors
    /// Returns `RestError::Decode` if the payload is not a message object
    fn create_message(&self, json: &Value) -> RestResult<Message>;

    /// # Errors
    /// Returns `RestError::Decode` if the payload is not a webhook object
    fn create_webhook(&self, json: &Value) -> RestResult<Webhook>;
}

/// Serde-backed builder
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEntityBuilder;

impl EntityBuilder for JsonEntityBuilder {
    fn create_message(&self, json: &Value) -> RestResult<Message> {
        Ok(Message::deserialize(json)?)
    }

    fn create_webhook(&self, json: &Value) -> RestResult<Webhook> {
        Ok(Webhook::deserialize(json)?)
    }
}

/// Decode every element of an array, logging and skipping failures
pub fn decode_each<T>(
    entity: &'static str,
    items: &[Value],
    decode: impl Fn(&Value) -> RestResult<T>,
) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match decode(item) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(entity, index, error = %e, "Skipping element that failed to decode");
                None
            }
        })
        .collect()
}
