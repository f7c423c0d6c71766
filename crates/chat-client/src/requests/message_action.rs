//! Message composition - builds send and edit requests
//!
//! `MessageAction` accumulates content, an embed, attachments and flags, then
//! encodes them at execution time as either a JSON body or a multipart form.

use std::fmt::{self, Write as _};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{DomainError, Embed, Message};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::action::{Action, Callbacks};
use super::body::{FormPart, RequestBody};
use super::context::RestContext;
use super::error::{RestError, RestResult};
use super::response::{FailureInfo, Response};
use super::route::CompiledRoute;

/// Per-file upload ceiling (8 MiB, inclusive)
pub const MAX_FILE_SIZE: u64 = 8 << 20;

const EDIT_ATTACHMENT_ERROR: &str =
    "Cannot add files to an existing message! Edit-Message does not support this operation!";

/// Byte source of a registered attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentData {
    Bytes(Vec<u8>),
    /// Read when the request body is finalized
    Path(PathBuf),
}

impl AttachmentData {
    fn read(&self) -> std::io::Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::Path(path) => fs::read(path),
        }
    }
}

/// Builder for a message send or edit
pub struct MessageAction {
    context: Arc<RestContext>,
    route: CompiledRoute,
    content: String,
    embed: Option<Embed>,
    attachments: Vec<(String, AttachmentData)>,
    nonce: Option<String>,
    tts: bool,
    override_fields: bool,
    callbacks: Callbacks<Message>,
}

impl MessageAction {
    pub fn new(context: Arc<RestContext>, route: CompiledRoute) -> Self {
        Self {
            context,
            route,
            content: String::new(),
            embed: None,
            attachments: Vec::new(),
            nonce: None,
            tts: false,
            override_fields: false,
            callbacks: Callbacks::default(),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// True when there is no text and no embed with counted text
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.embed.as_ref().map_or(true, Embed::is_empty)
    }

    /// Whether this action edits an existing message
    #[inline]
    pub fn is_edit(&self) -> bool {
        self.route.is_edit()
    }

    pub fn content_str(&self) -> &str {
        &self.content
    }

    pub fn embed_ref(&self) -> Option<&Embed> {
        self.embed.as_ref()
    }

    /// Registered attachment names, in registration order
    pub fn attachment_names(&self) -> impl Iterator<Item = &str> {
        self.attachments.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_tts(&self) -> bool {
        self.tts
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Replace the content; `None` or an empty string clears it
    pub fn content(&mut self, content: Option<&str>) -> &mut Self {
        self.content.clear();
        if let Some(content) = content {
            self.content.push_str(content);
        }
        self
    }

    pub fn append(&mut self, text: &str) -> &mut Self {
        self.content.push_str(text);
        self
    }

    /// Append the byte range `range` of `text`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the range is out of bounds or splits a character
    pub fn append_range(&mut self, text: &str, range: Range<usize>) -> Result<&mut Self, DomainError> {
        let slice = text.get(range.clone()).ok_or_else(|| {
            DomainError::invalid_argument(format!(
                "Range {}..{} is not a valid character range of a {} byte string",
                range.start,
                range.end,
                text.len()
            ))
        })?;
        self.content.push_str(slice);
        Ok(self)
    }

    pub fn append_char(&mut self, c: char) -> &mut Self {
        self.content.push(c);
        self
    }

    /// Append formatted text, e.g. `action.append_format(format_args!("{n} items"))`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if a formatted value fails to render
    pub fn append_format(&mut self, args: fmt::Arguments<'_>) -> Result<&mut Self, DomainError> {
        let mut formatted = String::new();
        formatted
            .write_fmt(args)
            .map_err(|_| DomainError::invalid_argument("Format arguments could not be rendered"))?;
        self.content.push_str(&formatted);
        Ok(self)
    }

    // =========================================================================
    // Embed and flags
    // =========================================================================

    /// Set or clear the embed
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the embed is too long for the account type
    pub fn embed(&mut self, embed: Option<Embed>) -> Result<&mut Self, DomainError> {
        if let Some(embed) = &embed {
            let account_type = self.context.account_type();
            if !embed.is_sendable(account_type) {
                return Err(DomainError::invalid_argument(format!(
                    "Provided Message contains an embed with a length greater than {} characters, which is the max for {} accounts!",
                    account_type.embed_max_length(),
                    account_type
                )));
            }
        }
        self.embed = embed;
        Ok(self)
    }

    pub fn tts(&mut self, tts: bool) -> &mut Self {
        self.tts = tts;
        self
    }

    pub fn nonce(&mut self, nonce: Option<&str>) -> &mut Self {
        self.nonce = nonce.map(str::to_string);
        self
    }

    /// Emit every field, null-marked when unset, so an edit replaces them
    pub fn override_fields(&mut self, override_fields: bool) -> &mut Self {
        self.override_fields = override_fields;
        self
    }

    /// Restore the unset baseline so the action can be reused
    pub fn reset(&mut self) -> &mut Self {
        self.content.clear();
        self.nonce = None;
        self.embed = None;
        self.tts = false;
        self.override_fields = false;
        self.attachments.clear();
        self
    }

    // =========================================================================
    // Attachments
    // =========================================================================

    /// Attach in-memory data under `name`, replacing an attachment of the same name
    ///
    /// # Errors
    /// Returns `Precondition` on edits, `InvalidArgument` for a blank name or
    /// data above the size ceiling
    pub fn add_file(&mut self, data: impl Into<Vec<u8>>, name: &str) -> Result<&mut Self, DomainError> {
        self.check_edit()?;
        check_name(name)?;
        let data = data.into();
        check_size(data.len() as u64)?;
        self.register(name, AttachmentData::Bytes(data));
        Ok(self)
    }

    /// Attach a file from disk under its own file name
    ///
    /// # Errors
    /// Same as [`MessageAction::add_file_path_as`]
    pub fn add_file_path(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, DomainError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| DomainError::invalid_argument("File Name may not be blank"))?
            .to_string();
        self.add_file_path_as(path, &name)
    }

    /// Attach a file from disk under `name`; the bytes are read at execution time
    ///
    /// # Errors
    /// Returns `Precondition` on edits, `InvalidArgument` for a blank name, a
    /// missing or unreadable file, or one above the size ceiling
    pub fn add_file_path_as(&mut self, path: impl AsRef<Path>, name: &str) -> Result<&mut Self, DomainError> {
        self.check_edit()?;
        check_name(name)?;

        let path = path.as_ref();
        let unreadable = || {
            DomainError::invalid_argument(format!(
                "Provided file either does not exist or cannot be read from! ({})",
                path.display()
            ))
        };
        let metadata = fs::metadata(path).map_err(|_| unreadable())?;
        if !metadata.is_file() || fs::File::open(path).is_err() {
            return Err(unreadable());
        }
        check_size(metadata.len())?;

        self.register(name, AttachmentData::Path(path.to_path_buf()));
        Ok(self)
    }

    pub fn clear_files(&mut self) -> &mut Self {
        self.attachments.clear();
        self
    }

    fn register(&mut self, name: &str, data: AttachmentData) {
        match self.attachments.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = data,
            None => self.attachments.push((name.to_string(), data)),
        }
    }

    fn check_edit(&self) -> Result<(), DomainError> {
        if self.is_edit() {
            return Err(DomainError::Precondition(EDIT_ATTACHMENT_ERROR.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Seeding from an existing message
    // =========================================================================

    /// Copy content, tts and the first embed of `message`
    ///
    /// The embed is taken as is, without the length check of [`MessageAction::embed`].
    pub fn apply_content(&mut self, message: &Message) -> &mut Self {
        self.content(Some(message.content.as_str())).tts(message.tts);
        if let Some(embed) = message.embeds.first() {
            self.embed = Some(embed.clone());
        }
        self
    }

    /// Seed from `message`, re-downloading each of its attachments
    ///
    /// An attachment that cannot be fetched or registered is logged and skipped.
    pub async fn apply(&mut self, message: &Message) -> &mut Self {
        self.apply_content(message);

        let context = Arc::clone(&self.context);
        for attachment in &message.attachments {
            let data = match context.fetcher().fetch(attachment).await {
                Ok(data) => data,
                Err(e) => {
                    warn!(
                        message_id = %message.id,
                        attachment_id = %attachment.id,
                        filename = %attachment.filename,
                        error = %e,
                        "Failed to download attachment, skipping"
                    );
                    continue;
                }
            };
            if let Err(e) = self.add_file(data, &attachment.filename) {
                warn!(
                    message_id = %message.id,
                    filename = %attachment.filename,
                    error = %e,
                    "Attachment could not be added, skipping"
                );
            }
        }
        self
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    pub fn on_success(&mut self, f: impl Fn(Message) + Send + Sync + 'static) -> &mut Self {
        self.callbacks.set_success(f);
        self
    }

    pub fn on_failure(&mut self, f: impl Fn(FailureInfo) + Send + Sync + 'static) -> &mut Self {
        self.callbacks.set_failure(f);
        self
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    /// JSON payload in key order embed, content, nonce, tts
    ///
    /// # Errors
    /// Returns the serializer error if the embed cannot be encoded
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        let mut payload = Map::new();
        let embed = self.embed.as_ref().map(serde_json::to_value).transpose()?;

        if self.override_fields {
            payload.insert("embed".into(), embed.unwrap_or(Value::Null));
            payload.insert(
                "content".into(),
                if self.content.is_empty() {
                    Value::Null
                } else {
                    Value::String(self.content.clone())
                },
            );
            payload.insert(
                "nonce".into(),
                self.nonce.clone().map_or(Value::Null, Value::String),
            );
        } else {
            if let Some(embed) = embed {
                payload.insert("embed".into(), embed);
            }
            if !self.content.is_empty() {
                payload.insert("content".into(), Value::String(self.content.clone()));
            }
            if let Some(nonce) = &self.nonce {
                payload.insert("nonce".into(), Value::String(nonce.clone()));
            }
        }
        payload.insert("tts".into(), Value::Bool(self.tts));

        Ok(Value::Object(payload))
    }

    fn as_multipart(&self) -> RestResult<RequestBody> {
        let mut parts = Vec::with_capacity(self.attachments.len() + 1);
        for (index, (name, data)) in self.attachments.iter().enumerate() {
            parts.push(FormPart::file(format!("file{index}"), name.as_str(), data.read()?));
        }
        if !self.is_empty() {
            let payload = self.to_json().map_err(RestError::Encode)?;
            parts.push(FormPart::json("payload_json", &payload));
        }
        Ok(RequestBody::Multipart(parts))
    }
}

fn check_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::invalid_argument("Name may not be blank"));
    }
    Ok(())
}

fn check_size(len: u64) -> Result<(), DomainError> {
    if len > MAX_FILE_SIZE {
        return Err(DomainError::invalid_argument(
            "File may not exceed the maximum file length of 8MB!",
        ));
    }
    Ok(())
}

impl fmt::Write for MessageAction {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.content.push_str(s);
        Ok(())
    }
}

#[async_trait]
impl Action for MessageAction {
    type Output = Message;

    fn context(&self) -> &RestContext {
        &self.context
    }

    fn route(&self) -> &CompiledRoute {
        &self.route
    }

    fn callbacks(&self) -> &Callbacks<Message> {
        &self.callbacks
    }

    fn finalize_body(&self) -> RestResult<Option<RequestBody>> {
        if !self.attachments.is_empty() {
            debug!(files = self.attachments.len(), "Encoding message as multipart");
            return self.as_multipart().map(Some);
        }
        if self.is_empty() {
            return Err(DomainError::invalid_state("Cannot build a message without content!").into());
        }
        let payload = self.to_json().map_err(RestError::Encode)?;
        Ok(Some(RequestBody::Json(payload)))
    }

    fn handle_response(&self, response: &Response) -> Result<Message, FailureInfo> {
        if !response.is_ok() {
            return Err(FailureInfo::from_response(response));
        }
        let body = response.body.as_ref().filter(|body| body.is_object());
        let Some(body) = body else {
            return Err(FailureInfo::decode(response, "expected a message object"));
        };
        self.context
            .entity_builder()
            .create_message(body)
            .map_err(|e| FailureInfo::decode(response, e))
    }
}

impl fmt::Debug for MessageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageAction")
            .field("route", &self.route)
            .field("content", &self.content)
            .field("embed", &self.embed)
            .field("attachments", &self.attachments.len())
            .field("nonce", &self.nonce)
            .field("tts", &self.tts)
            .field("override_fields", &self.override_fields)
            .finish_non_exhaustive()
    }
}
