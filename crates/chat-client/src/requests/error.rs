//! REST layer error types

use chat_core::DomainError;
use thiserror::Error;

use super::response::FailureInfo;
use super::transport::TransportError;

/// Errors surfaced to the caller of an action
#[derive(Debug, Error)]
pub enum RestError {
    /// Precondition rejected before any request was issued
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// No response could be obtained
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The platform answered with a non-OK status, or an undecodable body
    #[error("Request failed: {0}")]
    Failed(FailureInfo),

    #[error("Failed to decode entity: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request payload could not be encoded
    #[error("Failed to encode request: {0}")]
    Encode(serde_json::Error),

    /// A file attachment could not be read at finalize time
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RestError {
    /// Get the error code
    pub fn code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Transport(e) => e.code(),
            Self::Failed(_) => "REQUEST_FAILED",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Encode(_) => "ENCODE_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the request was rejected before reaching the transport
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Domain(_) | Self::Encode(_) | Self::Io(_))
    }

    pub fn failure(&self) -> Option<&FailureInfo> {
        match self {
            Self::Failed(info) => Some(info),
            _ => None,
        }
    }

    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for REST operations
pub type RestResult<T> = Result<T, RestError>;
