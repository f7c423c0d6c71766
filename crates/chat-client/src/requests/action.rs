//! Deferred REST actions
//!
//! An action is built inert by a channel or composer and does nothing until
//! `execute()` or `complete()` is awaited. Each execution re-derives the body
//! from the action's current state.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::body::RequestBody;
use super::context::RestContext;
use super::error::{RestError, RestResult};
use super::response::{FailureInfo, Response};
use super::route::CompiledRoute;

type SuccessFn<T> = Box<dyn Fn(T) + Send + Sync>;
type FailureFn = Box<dyn Fn(FailureInfo) + Send + Sync>;
type Decoder<T> = Box<dyn Fn(&Response, &RestContext) -> Result<T, FailureInfo> + Send + Sync>;

/// Success and failure callbacks of an action
pub struct Callbacks<T> {
    success: SuccessFn<T>,
    failure: FailureFn,
}

impl<T> Callbacks<T> {
    pub fn set_success(&mut self, f: impl Fn(T) + Send + Sync + 'static) {
        self.success = Box::new(f);
    }

    pub fn set_failure(&mut self, f: impl Fn(FailureInfo) + Send + Sync + 'static) {
        self.failure = Box::new(f);
    }

    pub fn succeed(&self, value: T) {
        (self.success)(value);
    }

    pub fn fail(&self, failure: FailureInfo) {
        (self.failure)(failure);
    }
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self {
            success: Box::new(|_| {}),
            failure: Box::new(|failure| {
                warn!(status = failure.status, code = ?failure.code, "REST action failed: {failure}");
            }),
        }
    }
}

impl<T> std::fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Callbacks")
    }
}

/// A request that can be finalized and submitted on demand
#[async_trait]
pub trait Action: Send + Sync {
    type Output: Send + 'static;

    fn context(&self) -> &RestContext;

    fn route(&self) -> &CompiledRoute;

    fn callbacks(&self) -> &Callbacks<Self::Output>;

    /// Derive the request body from the current state
    ///
    /// # Errors
    /// Returns a precondition error if the action cannot be sent as is
    fn finalize_body(&self) -> RestResult<Option<RequestBody>>;

    /// Map a response to the action's output, or to a failure
    ///
    /// # Errors
    /// Returns the failure description for non-OK or undecodable responses
    fn handle_response(&self, response: &Response) -> Result<Self::Output, FailureInfo>;

    /// Finalize and submit, returning the raw response
    async fn submit(&self) -> RestResult<Response> {
        let body = self.finalize_body()?;
        let route = self.route();
        debug!(route = %route, has_body = body.is_some(), "Submitting request");
        let response = self.context().transport().submit(route, body).await?;
        debug!(route = %route, status = response.status, "Received response");
        Ok(response)
    }

    /// Submit and invoke exactly one of the callbacks with the outcome
    ///
    /// # Errors
    /// Returns precondition and transport errors; platform failures go to the
    /// failure callback instead.
    async fn execute(&self) -> RestResult<()> {
        let response = self.submit().await?;
        match self.handle_response(&response) {
            Ok(value) => self.callbacks().succeed(value),
            Err(failure) => self.callbacks().fail(failure),
        }
        Ok(())
    }

    /// Submit and return the outcome directly, bypassing the callbacks
    ///
    /// # Errors
    /// Returns `RestError::Failed` for non-OK or undecodable responses, in
    /// addition to precondition and transport errors.
    async fn complete(&self) -> RestResult<Self::Output> {
        let response = self.submit().await?;
        self.handle_response(&response).map_err(RestError::Failed)
    }
}

/// Generic action whose output is produced by a decoder closure
pub struct RestAction<T> {
    context: Arc<RestContext>,
    route: CompiledRoute,
    body: Option<RequestBody>,
    decoder: Decoder<T>,
    callbacks: Callbacks<T>,
}

impl<T: Send + 'static> RestAction<T> {
    /// Create an action that decodes OK responses with `decoder`
    ///
    /// Non-OK responses never reach the decoder.
    pub fn new(
        context: Arc<RestContext>,
        route: CompiledRoute,
        decoder: impl Fn(&Response, &RestContext) -> Result<T, FailureInfo> + Send + Sync + 'static,
    ) -> Self {
        Self {
            context,
            route,
            body: None,
            decoder: Box::new(decoder),
            callbacks: Callbacks::default(),
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_json(self, json: Value) -> Self {
        self.with_body(RequestBody::Json(json))
    }

    pub fn on_success(&mut self, f: impl Fn(T) + Send + Sync + 'static) -> &mut Self {
        self.callbacks.set_success(f);
        self
    }

    pub fn on_failure(&mut self, f: impl Fn(FailureInfo) + Send + Sync + 'static) -> &mut Self {
        self.callbacks.set_failure(f);
        self
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }
}

impl RestAction<()> {
    /// Action whose only interesting outcome is the status
    pub fn empty(context: Arc<RestContext>, route: CompiledRoute) -> Self {
        Self::new(context, route, |_, _| Ok(()))
    }
}

#[async_trait]
impl<T: Send + 'static> Action for RestAction<T> {
    type Output = T;

    fn context(&self) -> &RestContext {
        &self.context
    }

    fn route(&self) -> &CompiledRoute {
        &self.route
    }

    fn callbacks(&self) -> &Callbacks<T> {
        &self.callbacks
    }

    fn finalize_body(&self) -> RestResult<Option<RequestBody>> {
        Ok(self.body.clone())
    }

    fn handle_response(&self, response: &Response) -> Result<T, FailureInfo> {
        if response.is_ok() {
            (self.decoder)(response, &self.context)
        } else {
            Err(FailureInfo::from_response(response))
        }
    }
}

impl<T> std::fmt::Debug for RestAction<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestAction")
            .field("route", &self.route)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}
