//! reqwest-backed transport

use async_trait::async_trait;
use chat_common::ClientConfig;
use chat_core::MessageAttachment;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use super::body::{FormPart, RequestBody};
use super::response::Response;
use super::route::{CompiledRoute, Method};
use super::transport::{AttachmentFetcher, Transport, TransportError};

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
        }
    }
}

/// Transport speaking HTTP to the configured API base
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    authorization: String,
}

impl HttpTransport {
    /// Build a transport from client configuration
    ///
    /// # Errors
    /// Returns `TransportError::Url` for an unusable base URL, or
    /// `TransportError::Http` if the client cannot be constructed
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.http.timeout())
            .user_agent(config.http.user_agent.as_str())
            .build()?;

        let base_url = Url::parse(&config.http.base_url)
            .map_err(|e| TransportError::Url(format!("{}: {e}", config.http.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::Url(config.http.base_url.clone()));
        }

        Ok(Self {
            client,
            base_url,
            authorization: config.authorization(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a compiled route against the base URL
    ///
    /// Each path segment is percent-encoded, so reaction codes may be raw unicode.
    ///
    /// # Errors
    /// Returns `TransportError::Url` if the base cannot carry path segments
    pub fn url_for(&self, route: &CompiledRoute) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(route.path().split('/'));
        if !route.query().is_empty() {
            url.query_pairs_mut().extend_pairs(route.query());
        }
        Ok(url)
    }
}

fn to_form(parts: Vec<FormPart>) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for part in parts {
        let mut body = Part::bytes(part.data).mime_str(&part.content_type)?;
        if let Some(filename) = part.filename {
            body = body.file_name(filename);
        }
        form = form.part(part.name, body);
    }
    Ok(form)
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, body), fields(method = %route.method(), path = %route.path()))]
    async fn submit(
        &self,
        route: &CompiledRoute,
        body: Option<RequestBody>,
    ) -> Result<Response, TransportError> {
        let url = self.url_for(route)?;
        let mut request = self
            .client
            .request(route.method().into(), url)
            .header(AUTHORIZATION, &self.authorization);

        request = match body {
            None => request,
            Some(RequestBody::Json(json)) => request.json(&json),
            Some(RequestBody::Multipart(parts)) => request.multipart(to_form(parts)?),
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        let body = if bytes.is_empty() {
            None
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(json) => Some(json),
                Err(e) => {
                    debug!(status, error = %e, "Response body is not JSON");
                    None
                }
            }
        };

        debug!(status, "Request completed");
        Ok(Response::new(status, body))
    }
}

#[async_trait]
impl AttachmentFetcher for HttpTransport {
    #[instrument(skip(self, attachment), fields(attachment_id = %attachment.id, url = %attachment.url))]
    async fn fetch(&self, attachment: &MessageAttachment) -> Result<Vec<u8>, TransportError> {
        let url = Url::parse(&attachment.url)
            .map_err(|e| TransportError::Url(format!("{}: {e}", attachment.url)))?;
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        debug!(size = bytes.len(), "Attachment downloaded");
        Ok(bytes.to_vec())
    }
}
