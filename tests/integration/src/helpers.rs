//! Test helpers for integration tests
//!
//! Provides an in-process mock of the platform API that records every request
//! it receives, plus a client wired to it through the real HTTP transport.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chat_client::{Guild, RestContext, TextChannel};
use chat_common::{ClientConfig, TracingConfig};
use chat_core::{AccountType, Member, Permissions, Snowflake};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::debug;

/// Path prefix the mock API is mounted under
pub const API_PREFIX: &str = "/api/v6";

/// Largest request body the mock accepts
const MAX_BODY: usize = 16 * 1024 * 1024;

/// A multipart field received by the mock
#[derive(Debug, Clone)]
pub struct CapturedPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl CapturedPart {
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// A request received by the mock
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    /// Path relative to the API prefix, percent-encoding preserved
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
    pub content_type: Option<String>,
    /// Raw body when it was not multipart
    pub raw_body: Option<String>,
    pub parts: Vec<CapturedPart>,
}

impl CapturedRequest {
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(self.raw_body.as_deref()?).ok()
    }

    pub fn part(&self, name: &str) -> Option<&CapturedPart> {
        self.parts.iter().find(|part| part.name == name)
    }
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<CapturedRequest>>,
    responses: Mutex<VecDeque<(StatusCode, Option<Value>)>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
}

type SharedState = Arc<MockState>;

/// In-process mock of the platform REST API
pub struct MockApi {
    pub addr: SocketAddr,
    state: SharedState,
    _handle: JoinHandle<()>,
}

impl MockApi {
    /// Start the mock on an ephemeral port
    pub async fn start() -> Result<Self> {
        let state = SharedState::default();
        let app = Router::new()
            .route("/cdn/:name", get(serve_file))
            .fallback(capture)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    /// API base URL to configure the client with
    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, API_PREFIX)
    }

    /// Public URL of a file served with [`MockApi::serve`]
    pub fn file_url(&self, name: &str) -> String {
        format!("http://{}/cdn/{}", self.addr, name)
    }

    /// Queue the response for the next API request
    ///
    /// With an empty queue the mock answers `204 No Content`.
    pub fn respond_with(&self, status: StatusCode, body: Option<Value>) {
        self.state.responses.lock().push_back((status, body));
    }

    /// Serve `data` at [`MockApi::file_url`]
    pub fn serve(&self, name: &str, data: Vec<u8>) {
        self.state.files.lock().insert(name.to_string(), data);
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<CapturedRequest> {
        self.state.requests.lock().last().cloned()
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn capture(State(state): State<SharedState>, request: Request) -> Response {
    let method = request.method().to_string();
    let uri = request.uri().clone();
    let headers = request.headers().clone();
    let content_type = header_value(&headers, header::CONTENT_TYPE);

    let path = uri.path();
    let path = path
        .strip_prefix(API_PREFIX)
        .unwrap_or(path)
        .trim_start_matches('/')
        .to_string();

    let mut parts = Vec::new();
    let mut raw_body = None;
    if content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
    {
        let mut multipart = match Multipart::from_request(request, &state).await {
            Ok(multipart) => multipart,
            Err(rejection) => return rejection.into_response(),
        };
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(str::to_string);
            let field_type = field.content_type().map(str::to_string);
            let Ok(data) = field.bytes().await else {
                return StatusCode::BAD_REQUEST.into_response();
            };
            parts.push(CapturedPart {
                name,
                filename,
                content_type: field_type,
                data: data.to_vec(),
            });
        }
    } else {
        let Ok(bytes) = to_bytes(request.into_body(), MAX_BODY).await else {
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        };
        if !bytes.is_empty() {
            raw_body = Some(String::from_utf8_lossy(&bytes).into_owned());
        }
    }

    debug!(%method, %path, parts = parts.len(), "Mock API captured request");
    state.requests.lock().push(CapturedRequest {
        method,
        path,
        query: uri.query().map(str::to_string),
        authorization: header_value(&headers, header::AUTHORIZATION),
        user_agent: header_value(&headers, header::USER_AGENT),
        content_type,
        raw_body,
        parts,
    });

    let next = state.responses.lock().pop_front();
    match next {
        Some((status, Some(body))) => (status, Json(body)).into_response(),
        Some((status, None)) => status.into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn serve_file(State(state): State<SharedState>, Path(name): Path<String>) -> Response {
    match state.files.lock().get(&name).cloned() {
        Some(data) => Body::from(data).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Initialize tracing once for the test binary, honoring `RUST_LOG` and `.env`
pub fn init_test_tracing() {
    dotenvy::dotenv().ok();
    let _ = chat_common::try_init_tracing_with_config(TracingConfig::development());
}

/// Client configuration pointing at `base_url`
pub fn test_config(base_url: &str, account_type: AccountType) -> ClientConfig {
    let mut config = ClientConfig::new("secret-token", account_type);
    config.http.base_url = base_url.to_string();
    config
}

/// A guild with one text channel, talking to a running [`MockApi`]
pub struct TestClient {
    pub api: MockApi,
    pub context: Arc<RestContext>,
    pub guild: Arc<Guild>,
    pub channel: Arc<TextChannel>,
}

impl TestClient {
    pub const GUILD_ID: u64 = 1;
    pub const SELF_USER_ID: u64 = 2;
    pub const CHANNEL_ID: u64 = 10;

    /// Start a mock API and a bot client whose member holds `permissions`
    pub async fn start(permissions: Permissions) -> Result<Self> {
        Self::start_as(permissions, AccountType::Bot).await
    }

    pub async fn start_as(permissions: Permissions, account_type: AccountType) -> Result<Self> {
        init_test_tracing();

        let api = MockApi::start().await?;
        let context = RestContext::from_config(&test_config(&api.base_url(), account_type))?;

        let guild_id = Snowflake::new(Self::GUILD_ID);
        let self_member = Member::new(guild_id, Snowflake::new(Self::SELF_USER_ID), permissions);
        let guild = Guild::new(Arc::clone(&context), guild_id, "integration", self_member)?;
        let channel = guild.create_text_channel(Snowflake::new(Self::CHANNEL_ID), "general", 0);

        Ok(Self {
            api,
            context,
            guild,
            channel,
        })
    }
}
