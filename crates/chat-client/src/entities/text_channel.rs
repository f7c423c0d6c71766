//! Text channel - permission-gated construction of channel actions
//!
//! Every operation checks the connected account's permissions and argument
//! contracts synchronously, then returns an inert action. Nothing is sent
//! until the action is executed.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Weak};

use chat_core::{DomainError, Emote, Member, Message, Permissions, Snowflake, Webhook};
use chrono::Duration;
use parking_lot::RwLock;
use serde_json::json;
use tracing::debug;

use super::guild::Guild;
use super::message_channel::{self, require_id, MessageHistory};
use super::permission::{MemberPermissionExt, PermissionOverwrite};
use crate::requests::entity_builder::decode_each;
use crate::requests::route::{channels, messages, webhooks};
use crate::requests::{FailureInfo, MessageAction, RestAction, RestContext};

/// Bulk deletion accepts between 2 and 100 message ids
pub const BULK_DELETE_MIN: usize = 2;
pub const BULK_DELETE_MAX: usize = 100;

/// Messages older than this cannot be bulk deleted
pub const BULK_DELETE_MAX_AGE_DAYS: i64 = 14;

#[derive(Debug)]
struct ChannelState {
    name: String,
    topic: Option<String>,
    position: i32,
    last_message_id: Option<Snowflake>,
    overwrites: HashMap<Snowflake, PermissionOverwrite>,
}

/// Guild text channel
pub struct TextChannel {
    id: Snowflake,
    guild_id: Snowflake,
    guild: Weak<Guild>,
    context: Arc<RestContext>,
    state: RwLock<ChannelState>,
}

impl TextChannel {
    pub(crate) fn new(id: Snowflake, guild: &Arc<Guild>, name: String, position: i32) -> Self {
        Self {
            id,
            guild_id: guild.id(),
            guild: Arc::downgrade(guild),
            context: Arc::clone(guild.context()),
            state: RwLock::new(ChannelState {
                name,
                topic: None,
                position,
                last_message_id: None,
                overwrites: HashMap::new(),
            }),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> Snowflake {
        self.id
    }

    #[inline]
    pub fn guild_id(&self) -> Snowflake {
        self.guild_id
    }

    /// Owning guild
    ///
    /// # Errors
    /// Returns `InvalidState` if the guild has been dropped
    pub fn guild(&self) -> Result<Arc<Guild>, DomainError> {
        self.guild
            .upgrade()
            .ok_or_else(|| DomainError::invalid_state("Guild of this TextChannel is no longer available"))
    }

    pub fn name(&self) -> String {
        self.state.read().name.clone()
    }

    pub fn topic(&self) -> Option<String> {
        self.state.read().topic.clone()
    }

    /// Position as reported by the platform, not the index in the sorted list
    pub fn position_raw(&self) -> i32 {
        self.state.read().position
    }

    pub fn as_mention(&self) -> String {
        format!("<#{}>", self.id)
    }

    pub fn is_nsfw(&self) -> bool {
        let state = self.state.read();
        state.name == "nsfw" || state.name.starts_with("nsfw-")
    }

    pub fn has_latest_message(&self) -> bool {
        self.state.read().last_message_id.is_some()
    }

    /// # Errors
    /// Returns `InvalidState` if no message has been seen in this channel
    pub fn latest_message_id(&self) -> Result<Snowflake, DomainError> {
        self.state
            .read()
            .last_message_id
            .ok_or_else(|| DomainError::invalid_state("No last message id found."))
    }

    pub fn overwrite_for(&self, user_id: Snowflake) -> Option<PermissionOverwrite> {
        self.state.read().overwrites.get(&user_id).copied()
    }

    // =========================================================================
    // Setters (applied by entity construction)
    // =========================================================================

    pub fn set_name(&self, name: impl Into<String>) -> &Self {
        self.state.write().name = name.into();
        self
    }

    pub fn set_topic(&self, topic: Option<String>) -> &Self {
        self.state.write().topic = topic;
        self
    }

    pub fn set_position(&self, position: i32) -> &Self {
        self.state.write().position = position;
        self
    }

    pub fn set_last_message_id(&self, id: Option<Snowflake>) -> &Self {
        self.state.write().last_message_id = id;
        self
    }

    pub fn set_overwrite(&self, user_id: Snowflake, overwrite: PermissionOverwrite) -> &Self {
        self.state.write().overwrites.insert(user_id, overwrite);
        self
    }

    pub fn remove_overwrite(&self, user_id: Snowflake) -> Option<PermissionOverwrite> {
        self.state.write().overwrites.remove(&user_id)
    }

    // =========================================================================
    // Membership and hierarchy
    // =========================================================================

    /// Guild members able to read this channel
    ///
    /// # Errors
    /// Returns `InvalidState` if the guild has been dropped
    pub fn members(&self) -> Result<Vec<Member>, DomainError> {
        let guild = self.guild()?;
        let checker = self.context.permission_checker();
        Ok(guild
            .members()
            .into_iter()
            .filter(|member| checker.has(member, self, Permissions::MESSAGE_READ))
            .collect())
    }

    /// Whether the connected account can read and write here
    ///
    /// # Errors
    /// Returns `InvalidState` if the guild has been dropped
    pub fn can_talk(&self) -> Result<bool, DomainError> {
        let guild = self.guild()?;
        self.can_talk_as(&guild.self_member())
    }

    /// # Errors
    /// Returns `InvalidArgument` if the member is from another guild
    pub fn can_talk_as(&self, member: &Member) -> Result<bool, DomainError> {
        if !member.is_in_guild(self.guild_id) {
            return Err(DomainError::invalid_argument(
                "Provided Member is not from the Guild that this TextChannel is part of.",
            ));
        }
        Ok(self.context.permission_checker().has(
            member,
            self,
            Permissions::MESSAGE_READ | Permissions::MESSAGE_WRITE,
        ))
    }

    /// Hierarchy comparison: higher position first, then earlier creation first
    ///
    /// Equal positions put the earlier-created channel first. Older clients of
    /// this API put the later-created one first; that order is not followed.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the channels belong to different guilds
    pub fn compare_to(&self, other: &TextChannel) -> Result<Ordering, DomainError> {
        if std::ptr::eq(self, other) {
            return Ok(Ordering::Equal);
        }
        if self.guild_id != other.guild_id {
            return Err(DomainError::invalid_argument(
                "Cannot compare TextChannels that aren't from the same guild!",
            ));
        }
        Ok(hierarchy_order(self, other))
    }

    /// Index of this channel in the guild's sorted text channel list
    ///
    /// # Errors
    /// Returns `InvalidState` if the guild has been dropped or the channel was
    /// disposed
    pub fn position(&self) -> Result<usize, DomainError> {
        let guild = self.guild()?;
        guild
            .text_channels()
            .iter()
            .position(|channel| std::ptr::eq(channel.as_ref(), self))
            .ok_or_else(|| {
                DomainError::invalid_state(format!(
                    "TextChannel {} is not registered in guild {}",
                    self.id, self.guild_id
                ))
            })
    }

    /// Remove this channel from its guild; returns whether it was registered
    pub fn dispose(&self) -> bool {
        let removed = self
            .guild
            .upgrade()
            .and_then(|guild| guild.remove_text_channel(self))
            .is_some();
        self.state.write().overwrites.clear();
        debug!(channel_id = %self.id, removed, "Text channel disposed");
        removed
    }

    // =========================================================================
    // Permission gate
    // =========================================================================

    fn check_permission(&self, permissions: Permissions) -> Result<(), DomainError> {
        let guild = self.guild()?;
        self.context
            .permission_checker()
            .check(&guild.self_member(), self, permissions)
    }

    fn check_permission_because(&self, permissions: Permissions, reason: &str) -> Result<(), DomainError> {
        self.check_permission(permissions).map_err(|e| match e {
            DomainError::MissingPermission { permission, .. } => {
                DomainError::missing_permission_because(permission, reason)
            }
            other => other,
        })
    }

    /// Guild verification gate of new messages; edits are not subject to it
    fn check_verification(&self) -> Result<(), DomainError> {
        let guild = self.guild()?;
        if guild.check_verification() {
            Ok(())
        } else {
            Err(DomainError::Verification(guild.verification_level()))
        }
    }

    /// READ and WRITE, plus EMBED_LINKS for embed-only messages
    fn check_send(&self, message: Option<&Message>) -> Result<(), DomainError> {
        self.check_permission(Permissions::MESSAGE_READ)?;
        self.check_permission(Permissions::MESSAGE_WRITE)?;
        if message.is_some_and(Message::is_embed_only) {
            self.check_permission(Permissions::MESSAGE_EMBED_LINKS)?;
        }
        Ok(())
    }

    fn check_attach(&self) -> Result<(), DomainError> {
        self.check_send(None)?;
        self.check_permission(Permissions::MESSAGE_ATTACH_FILES)
    }

    // =========================================================================
    // Channel operations
    // =========================================================================

    /// Webhooks of this channel; malformed entries are skipped
    ///
    /// # Errors
    /// Returns `MissingPermission` without MANAGE_WEBHOOKS
    pub fn webhooks(&self) -> Result<RestAction<Vec<Webhook>>, DomainError> {
        self.check_permission(Permissions::MANAGE_WEBHOOKS)?;

        let route = channels::GET_WEBHOOKS.compile(&[&self.id.to_string()]);
        Ok(RestAction::new(Arc::clone(&self.context), route, |response, context| {
            let items = response
                .array()
                .ok_or_else(|| FailureInfo::decode(response, "expected an array of webhooks"))?;
            Ok(decode_each("webhook", items, |item| {
                context.entity_builder().create_webhook(item)
            }))
        }))
    }

    /// # Errors
    /// Returns `InvalidArgument` for a blank id, `MissingPermission` without
    /// MANAGE_WEBHOOKS
    pub fn delete_webhook_by_id(&self, webhook_id: &str) -> Result<RestAction<()>, DomainError> {
        require_id(webhook_id, "webhook id")?;

        // Evaluated on the member directly, independent of the configured checker
        let guild = self.guild()?;
        if !guild
            .self_member()
            .has_permission(self, Permissions::MANAGE_WEBHOOKS)
        {
            return Err(DomainError::missing_permission(Permissions::MANAGE_WEBHOOKS));
        }

        let route = webhooks::DELETE_WEBHOOK.compile(&[webhook_id]);
        Ok(RestAction::empty(Arc::clone(&self.context), route))
    }

    /// Delete 2 to 100 messages younger than two weeks in one request
    ///
    /// # Errors
    /// Returns `MissingPermission` without MESSAGE_MANAGE, `InvalidArgument`
    /// for a bad count or a blank, malformed or too old id
    pub fn delete_messages_by_ids<I, S>(&self, message_ids: I) -> Result<RestAction<()>, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_permission_because(
            Permissions::MESSAGE_MANAGE,
            "Must have MESSAGE_MANAGE in order to bulk delete messages in this channel regardless of author.",
        )?;

        let ids: Vec<String> = message_ids.into_iter().map(Into::into).collect();
        if !(BULK_DELETE_MIN..=BULK_DELETE_MAX).contains(&ids.len()) {
            return Err(DomainError::invalid_argument(format!(
                "Must provide at least {BULK_DELETE_MIN} or at most {BULK_DELETE_MAX} messages to be deleted."
            )));
        }

        let cutoff = Snowflake::from_timestamp(
            self.context.clock().now() - Duration::days(BULK_DELETE_MAX_AGE_DAYS),
        );
        for id in &ids {
            require_id(id, "Message id in message_ids")?;
            let snowflake = Snowflake::parse(id).map_err(|e| {
                DomainError::InvalidSnowflake(format!("Message id provided is not a valid snowflake. Id: {id} ({e})"))
            })?;
            if snowflake <= cutoff {
                return Err(DomainError::invalid_argument(format!(
                    "Message id provided was older than 2 weeks. Id: {id}"
                )));
            }
        }

        debug!(channel_id = %self.id, count = ids.len(), "Bulk delete prepared");
        let route = messages::DELETE_MESSAGES.compile(&[&self.id.to_string()]);
        Ok(RestAction::empty(Arc::clone(&self.context), route).with_json(json!({ "messages": ids })))
    }

    /// # Errors
    /// Returns `InvalidArgument` for an empty slice, otherwise as
    /// [`TextChannel::delete_messages_by_ids`]
    pub fn delete_messages(&self, messages: &[Message]) -> Result<RestAction<()>, DomainError> {
        if messages.is_empty() {
            return Err(DomainError::invalid_argument("Messages collection may not be empty"));
        }
        self.delete_messages_by_ids(messages.iter().map(|m| m.id.to_string()))
    }

    /// # Errors
    /// Returns `InvalidArgument` for a blank id, `MissingPermission` without
    /// MESSAGE_MANAGE
    pub fn clear_reactions_by_id(&self, message_id: &str) -> Result<RestAction<()>, DomainError> {
        require_id(message_id, "Message ID")?;
        self.check_permission(Permissions::MESSAGE_MANAGE)?;

        let route = messages::REMOVE_ALL_REACTIONS.compile(&[&self.id.to_string(), message_id]);
        Ok(RestAction::empty(Arc::clone(&self.context), route))
    }

    // =========================================================================
    // Gated message operations
    // =========================================================================

    /// # Errors
    /// Returns `Verification` if the guild's verification level blocks the
    /// account, `MissingPermission` without READ and WRITE, `InvalidArgument`
    /// for blank or oversized text
    pub fn send_message(&self, text: &str) -> Result<MessageAction, DomainError> {
        self.check_verification()?;
        self.check_send(None)?;
        message_channel::send_text(&self.context, self.id, text)
    }

    /// # Errors
    /// Returns `Verification` if the guild's verification level blocks the
    /// account, `MissingPermission` without READ and WRITE, or without
    /// EMBED_LINKS for an embed-only message
    pub fn send_message_from(&self, message: &Message) -> Result<MessageAction, DomainError> {
        self.check_verification()?;
        self.check_send(Some(message))?;
        Ok(message_channel::send_message(&self.context, self.id, message))
    }

    /// # Errors
    /// Returns `Verification` if the guild's verification level blocks the
    /// account, `MissingPermission` without READ, WRITE and ATTACH_FILES, or
    /// the attachment errors of [`MessageAction::add_file`]
    pub fn send_file(
        &self,
        data: impl Into<Vec<u8>>,
        name: &str,
        message: Option<&Message>,
    ) -> Result<MessageAction, DomainError> {
        self.check_verification()?;
        self.check_attach()?;
        message_channel::send_file(&self.context, self.id, data.into(), name, message)
    }

    /// # Errors
    /// Returns `Verification` if the guild's verification level blocks the
    /// account, `MissingPermission` without READ, WRITE and ATTACH_FILES, or
    /// the attachment errors of [`MessageAction::add_file_path`]
    pub fn send_file_path(
        &self,
        path: impl AsRef<Path>,
        message: Option<&Message>,
    ) -> Result<MessageAction, DomainError> {
        self.check_verification()?;
        self.check_attach()?;
        message_channel::send_file_path(&self.context, self.id, path.as_ref(), message)
    }

    /// # Errors
    /// Returns `MissingPermission` without READ and HISTORY
    pub fn message_by_id(&self, message_id: &str) -> Result<RestAction<Message>, DomainError> {
        self.check_permission(Permissions::MESSAGE_READ)?;
        self.check_permission(Permissions::MESSAGE_HISTORY)?;
        message_channel::message_by_id(&self.context, self.id, message_id)
    }

    /// # Errors
    /// Returns `InvalidArgument` for a blank id, `MissingPermission` without READ
    pub fn delete_message_by_id(&self, message_id: &str) -> Result<RestAction<()>, DomainError> {
        require_id(message_id, "messageId")?;
        self.check_permission(Permissions::MESSAGE_READ)?;
        message_channel::delete_message_by_id(&self.context, self.id, message_id)
    }

    /// # Errors
    /// Returns `MissingPermission` without READ and HISTORY, `InvalidArgument`
    /// for a limit outside 1..=100
    pub fn history_around(
        &self,
        message_id: &str,
        limit: usize,
    ) -> Result<RestAction<MessageHistory>, DomainError> {
        self.check_permission(Permissions::MESSAGE_READ)?;
        self.check_permission(Permissions::MESSAGE_HISTORY)?;
        message_channel::history_around(&self.context, self.id, message_id, limit)
    }

    /// # Errors
    /// Returns `MissingPermission` without READ and MESSAGE_MANAGE
    pub fn pin_message_by_id(&self, message_id: &str) -> Result<RestAction<()>, DomainError> {
        self.check_pin_permissions("pin")?;
        message_channel::pin_message_by_id(&self.context, self.id, message_id)
    }

    /// # Errors
    /// Returns `MissingPermission` without READ and MESSAGE_MANAGE
    pub fn unpin_message_by_id(&self, message_id: &str) -> Result<RestAction<()>, DomainError> {
        self.check_pin_permissions("unpin")?;
        message_channel::unpin_message_by_id(&self.context, self.id, message_id)
    }

    fn check_pin_permissions(&self, verb: &str) -> Result<(), DomainError> {
        self.check_permission_because(
            Permissions::MESSAGE_READ,
            &format!("You cannot {verb} a message in a channel you can't access. (MESSAGE_READ)"),
        )?;
        self.check_permission_because(
            Permissions::MESSAGE_MANAGE,
            "You need MESSAGE_MANAGE to pin or unpin messages.",
        )
    }

    /// # Errors
    /// Returns `MissingPermission` without READ
    pub fn pinned_messages(&self) -> Result<RestAction<Vec<Message>>, DomainError> {
        self.check_permission_because(
            Permissions::MESSAGE_READ,
            "Cannot get the pinned message of a channel without MESSAGE_READ access.",
        )?;
        Ok(message_channel::pinned_messages(&self.context, self.id))
    }

    /// # Errors
    /// Returns `MissingPermission` without ADD_REACTION and HISTORY
    pub fn add_reaction_by_id(&self, message_id: &str, unicode: &str) -> Result<RestAction<()>, DomainError> {
        self.check_permission(Permissions::MESSAGE_ADD_REACTION)?;
        self.check_permission(Permissions::MESSAGE_HISTORY)?;
        message_channel::add_reaction_by_id(&self.context, self.id, message_id, unicode)
    }

    /// # Errors
    /// Returns `MissingPermission` without ADD_REACTION and HISTORY
    pub fn add_emote_reaction_by_id(&self, message_id: &str, emote: &Emote) -> Result<RestAction<()>, DomainError> {
        self.check_permission(Permissions::MESSAGE_ADD_REACTION)?;
        self.check_permission(Permissions::MESSAGE_HISTORY)?;
        message_channel::add_reaction_by_id(&self.context, self.id, message_id, &emote.reaction_code())
    }

    /// # Errors
    /// Returns `MissingPermission` without READ and WRITE, or without
    /// EMBED_LINKS for an embed-only message
    pub fn edit_message_by_id(&self, message_id: &str, message: &Message) -> Result<MessageAction, DomainError> {
        self.check_send(Some(message))?;
        message_channel::edit_message_by_id(&self.context, self.id, message_id, message)
    }
}

/// Sort key of text channels within a guild
pub(crate) fn hierarchy_order(a: &TextChannel, b: &TextChannel) -> Ordering {
    b.position_raw()
        .cmp(&a.position_raw())
        .then_with(|| a.id.timestamp().cmp(&b.id.timestamp()))
        .then_with(|| a.id.cmp(&b.id))
}

impl PartialEq for TextChannel {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TextChannel {}

impl fmt::Display for TextChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TC:{}({})", self.state.read().name, self.id)
    }
}

impl fmt::Debug for TextChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextChannel")
            .field("id", &self.id)
            .field("guild_id", &self.guild_id)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}
