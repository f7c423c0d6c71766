//! # chat-client
//!
//! REST command layer of the chat client.
//!
//! Channels validate permissions and arguments synchronously and hand back
//! inert actions; an action performs its request only when executed.
//!
//! ```ignore
//! let context = RestContext::from_config(&ClientConfig::from_env()?)?;
//! let mut action = channel.send_message("hello")?;
//! action.on_success(|message| tracing::info!(id = %message.id, "sent"));
//! action.execute().await?;
//! ```

pub mod clock;
pub mod entities;
pub mod requests;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use clock::{Clock, SystemClock};
pub use entities::{
    Guild, MemberPermissionExt, MessageHistory, OverwritePermissionChecker, PermissionChecker,
    PermissionOverwrite, TextChannel,
};
pub use requests::{
    Action, AttachmentFetcher, FailureInfo, HttpTransport, MessageAction, RequestBody, Response,
    RestAction, RestContext, RestError, RestResult, Transport, TransportError,
};
