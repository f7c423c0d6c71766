//! Transport responses and failure descriptions

use std::fmt;

use serde_json::{Map, Value};

/// Raw response produced by a transport
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Option<Value>,
}

impl Response {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// Response without a body (e.g. 204 No Content)
    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as a JSON object
    pub fn object(&self) -> Option<&Map<String, Value>> {
        self.body.as_ref()?.as_object()
    }

    /// Body as a JSON array
    pub fn array(&self) -> Option<&Vec<Value>> {
        self.body.as_ref()?.as_array()
    }
}

/// Description of a request the platform did not accept
///
/// Carried untouched to failure callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureInfo {
    pub status: u16,
    /// Platform error code from the body, if any
    pub code: Option<i64>,
    pub message: Option<String>,
    pub payload: Option<Value>,
}

impl FailureInfo {
    /// Extract failure details from a non-OK response
    pub fn from_response(response: &Response) -> Self {
        let object = response.object();
        Self {
            status: response.status,
            code: object.and_then(|o| o.get("code")).and_then(Value::as_i64),
            message: object
                .and_then(|o| o.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string),
            payload: response.body.clone(),
        }
    }

    /// An OK response whose body could not be turned into the expected value
    pub fn decode(response: &Response, reason: impl fmt::Display) -> Self {
        Self {
            status: response.status,
            code: None,
            message: Some(format!("Failed to decode response: {reason}")),
            payload: response.body.clone(),
        }
    }
}

impl fmt::Display for FailureInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(code) = self.code {
            write!(f, " (code {code})")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}
