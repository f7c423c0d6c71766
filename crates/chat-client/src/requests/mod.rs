//! Request pipeline - routes, bodies, transport and deferred actions

mod action;
mod body;
mod context;
pub mod entity_builder;
mod error;
mod http;
mod message_action;
mod response;
pub mod route;
mod transport;

pub use action::{Action, Callbacks, RestAction};
pub use body::{FormPart, RequestBody, APPLICATION_JSON, OCTET_STREAM};
pub use context::{RestContext, RestContextBuilder};
pub use entity_builder::{EntityBuilder, JsonEntityBuilder};
pub use error::{RestError, RestResult};
pub use http::HttpTransport;
pub use message_action::{AttachmentData, MessageAction, MAX_FILE_SIZE};
pub use response::{FailureInfo, Response};
pub use route::{CompiledRoute, Method, Route};
pub use transport::{AttachmentFetcher, Transport, TransportError};
