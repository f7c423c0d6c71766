//! REST context - collaborators shared by every action
//!
//! Holds the transport, entity construction, permission evaluation, clock and
//! attachment fetching used by channels and actions.

use std::sync::Arc;

use chat_common::ClientConfig;
use chat_core::{AccountType, DomainError};

use super::entity_builder::{EntityBuilder, JsonEntityBuilder};
use super::error::RestResult;
use super::http::HttpTransport;
use super::transport::{AttachmentFetcher, Transport};
use crate::clock::{Clock, SystemClock};
use crate::entities::{OverwritePermissionChecker, PermissionChecker};

/// Dependency container handed to every action
pub struct RestContext {
    account_type: AccountType,
    transport: Arc<dyn Transport>,
    fetcher: Arc<dyn AttachmentFetcher>,
    entity_builder: Arc<dyn EntityBuilder>,
    permission_checker: Arc<dyn PermissionChecker>,
    clock: Arc<dyn Clock>,
}

impl RestContext {
    /// Context talking to the real API through `HttpTransport`
    ///
    /// # Errors
    /// Returns `RestError::Transport` if the HTTP client cannot be built
    pub fn from_config(config: &ClientConfig) -> RestResult<Arc<Self>> {
        let http = Arc::new(HttpTransport::new(config)?);
        Ok(RestContextBuilder::new()
            .account_type(config.account_type)
            .transport(http.clone())
            .fetcher(http)
            .build()?)
    }

    pub fn builder() -> RestContextBuilder {
        RestContextBuilder::new()
    }

    #[inline]
    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn fetcher(&self) -> &dyn AttachmentFetcher {
        self.fetcher.as_ref()
    }

    pub fn entity_builder(&self) -> &dyn EntityBuilder {
        self.entity_builder.as_ref()
    }

    pub fn permission_checker(&self) -> &dyn PermissionChecker {
        self.permission_checker.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

impl std::fmt::Debug for RestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestContext")
            .field("account_type", &self.account_type)
            .field("transport", &"dyn Transport")
            .field("collaborators", &"...")
            .finish()
    }
}

/// Builder for `RestContext`
///
/// Transport and fetcher are required; the rest default to the serde entity
/// builder, overwrite-based permission checks and the system clock.
pub struct RestContextBuilder {
    account_type: AccountType,
    transport: Option<Arc<dyn Transport>>,
    fetcher: Option<Arc<dyn AttachmentFetcher>>,
    entity_builder: Option<Arc<dyn EntityBuilder>>,
    permission_checker: Option<Arc<dyn PermissionChecker>>,
    clock: Option<Arc<dyn Clock>>,
}

impl RestContextBuilder {
    pub fn new() -> Self {
        Self {
            account_type: AccountType::default(),
            transport: None,
            fetcher: None,
            entity_builder: None,
            permission_checker: None,
            clock: None,
        }
    }

    pub fn account_type(mut self, account_type: AccountType) -> Self {
        self.account_type = account_type;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn AttachmentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn entity_builder(mut self, builder: Arc<dyn EntityBuilder>) -> Self {
        self.entity_builder = Some(builder);
        self
    }

    pub fn permission_checker(mut self, checker: Arc<dyn PermissionChecker>) -> Self {
        self.permission_checker = Some(checker);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the RestContext
    ///
    /// # Errors
    /// Returns `DomainError::InvalidState` if the transport or fetcher is missing
    pub fn build(self) -> Result<Arc<RestContext>, DomainError> {
        Ok(Arc::new(RestContext {
            account_type: self.account_type,
            transport: self
                .transport
                .ok_or_else(|| DomainError::invalid_state("transport is required"))?,
            fetcher: self
                .fetcher
                .ok_or_else(|| DomainError::invalid_state("fetcher is required"))?,
            entity_builder: self
                .entity_builder
                .unwrap_or_else(|| Arc::new(JsonEntityBuilder)),
            permission_checker: self
                .permission_checker
                .unwrap_or_else(|| Arc::new(OverwritePermissionChecker)),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        }))
    }
}

impl Default for RestContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
