//! Transport seams - the only places a request leaves the process

use async_trait::async_trait;
use chat_core::MessageAttachment;
use thiserror::Error;

use super::body::RequestBody;
use super::response::Response;
use super::route::CompiledRoute;

/// Failure to obtain any response at all
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid request URL: {0}")]
    Url(String),

    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Http(e) if e.is_timeout() => "TRANSPORT_TIMEOUT",
            Self::Http(_) => "TRANSPORT_HTTP",
            Self::Url(_) => "TRANSPORT_URL",
            Self::Unavailable(_) => "TRANSPORT_UNAVAILABLE",
        }
    }
}

/// Submits compiled requests to the platform
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return whatever the platform answered
    ///
    /// Non-OK statuses are responses, not errors.
    async fn submit(
        &self,
        route: &CompiledRoute,
        body: Option<RequestBody>,
    ) -> Result<Response, TransportError>;
}

/// Downloads the bytes of an existing attachment
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    async fn fetch(&self, attachment: &MessageAttachment) -> Result<Vec<u8>, TransportError>;
}
