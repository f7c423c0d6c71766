//! In-memory collaborators for tests
//!
//! Enabled for unit tests and, through the `testing` feature, for downstream crates.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{AccountType, Member, MessageAttachment, Permissions, Snowflake};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;

use crate::clock::Clock;
use crate::entities::{Guild, TextChannel};
use crate::requests::{
    AttachmentFetcher, CompiledRoute, FormPart, Method, RequestBody, Response, RestContext,
    Transport, TransportError,
};

/// A request captured by [`RecordingTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl RecordedRequest {
    pub fn json(&self) -> Option<&Value> {
        self.body.as_ref()?.json()
    }

    pub fn part(&self, name: &str) -> Option<&FormPart> {
        self.body.as_ref()?.part(name)
    }
}

/// Transport that records requests and replays queued responses
///
/// With an empty queue every request is answered with `204 No Content`.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<Result<Response, String>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next request
    pub fn respond_with(&self, response: Response) {
        self.responses.lock().push_back(Ok(response));
    }

    /// Fail the next request without a response
    pub fn fail_with(&self, reason: impl Into<String>) {
        self.responses.lock().push_back(Err(reason.into()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn submit(
        &self,
        route: &CompiledRoute,
        body: Option<RequestBody>,
    ) -> Result<Response, TransportError> {
        self.requests.lock().push(RecordedRequest {
            method: route.method(),
            path: route.path().to_string(),
            query: route.query().to_vec(),
            body,
        });
        match self.responses.lock().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(reason)) => Err(TransportError::Unavailable(reason)),
            None => Ok(Response::empty(204)),
        }
    }
}

/// Fetcher serving attachment bytes by URL
#[derive(Debug, Default)]
pub struct StaticFetcher {
    files: HashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    #[must_use]
    pub fn with_file(mut self, url: impl Into<String>, data: Vec<u8>) -> Self {
        self.files.insert(url.into(), data);
        self
    }
}

#[async_trait]
impl AttachmentFetcher for StaticFetcher {
    async fn fetch(&self, attachment: &MessageAttachment) -> Result<Vec<u8>, TransportError> {
        self.files
            .get(&attachment.url)
            .cloned()
            .ok_or_else(|| TransportError::Unavailable(format!("no attachment at {}", attachment.url)))
    }
}

/// Clock frozen at a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Bot context over a recording transport and an empty fetcher
pub fn test_context(transport: Arc<RecordingTransport>) -> Arc<RestContext> {
    test_context_with(transport, StaticFetcher::default(), AccountType::Bot)
}

#[allow(clippy::missing_panics_doc)]
pub fn test_context_with(
    transport: Arc<RecordingTransport>,
    fetcher: StaticFetcher,
    account_type: AccountType,
) -> Arc<RestContext> {
    RestContext::builder()
        .account_type(account_type)
        .transport(transport)
        .fetcher(Arc::new(fetcher))
        .build()
        .expect("transport and fetcher are set")
}

/// Guild fixture whose connected account holds the given permissions
pub struct TestGuild {
    pub transport: Arc<RecordingTransport>,
    pub context: Arc<RestContext>,
    pub guild: Arc<Guild>,
}

impl TestGuild {
    pub const GUILD_ID: u64 = 1;
    pub const SELF_USER_ID: u64 = 2;

    #[allow(clippy::missing_panics_doc)]
    pub fn new(permissions: Permissions) -> Self {
        Self::with_ids(Self::GUILD_ID, Self::SELF_USER_ID, permissions)
    }

    pub fn with_ids(guild_id: u64, self_user_id: u64, permissions: Permissions) -> Self {
        let transport = Arc::new(RecordingTransport::new());
        let context = test_context(Arc::clone(&transport));
        Self::build(transport, context, guild_id, self_user_id, permissions)
    }

    pub fn with_transport(
        transport: Arc<RecordingTransport>,
        permissions: Permissions,
        account_type: AccountType,
    ) -> Self {
        let context = test_context_with(Arc::clone(&transport), StaticFetcher::default(), account_type);
        Self::build(transport, context, Self::GUILD_ID, Self::SELF_USER_ID, permissions)
    }

    #[allow(clippy::missing_panics_doc)]
    pub fn with_clock(permissions: Permissions, clock: impl Clock + 'static) -> Self {
        let transport = Arc::new(RecordingTransport::new());
        let context = RestContext::builder()
            .transport(transport.clone())
            .fetcher(Arc::new(StaticFetcher::default()))
            .clock(Arc::new(clock))
            .build()
            .expect("transport and fetcher are set");
        Self::build(transport, context, Self::GUILD_ID, Self::SELF_USER_ID, permissions)
    }

    fn build(
        transport: Arc<RecordingTransport>,
        context: Arc<RestContext>,
        guild_id: u64,
        self_user_id: u64,
        permissions: Permissions,
    ) -> Self {
        let guild_id = Snowflake::new(guild_id);
        let self_member = Member::new(guild_id, Snowflake::new(self_user_id), permissions);
        let guild = Guild::new(Arc::clone(&context), guild_id, "test guild", self_member)
            .expect("self member belongs to the guild");
        Self {
            transport,
            context,
            guild,
        }
    }

    pub fn channel(&self, id: u64, name: &str, position: i32) -> Arc<TextChannel> {
        self.guild.create_text_channel(Snowflake::new(id), name, position)
    }

    pub fn self_member(&self) -> Member {
        self.guild.self_member()
    }

    /// Add permissions to the connected account's member
    pub fn grant(&self, permissions: Permissions) {
        let mut member = self.guild.self_member();
        member.permissions |= permissions;
        // Same guild by construction
        let _ = self.guild.upsert_member(member);
    }
}
