//! Guild container - member and text channel indexes

use std::fmt;
use std::sync::Arc;

use chat_core::{
    AccountStanding, AccountType, DomainError, Member, Permissions, Snowflake, VerificationLevel,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use super::text_channel::{hierarchy_order, TextChannel};
use crate::requests::RestContext;

/// A guild as seen by the connected account
pub struct Guild {
    id: Snowflake,
    name: RwLock<String>,
    verification_level: RwLock<VerificationLevel>,
    self_member_id: Snowflake,
    self_standing: RwLock<AccountStanding>,
    context: Arc<RestContext>,
    members: DashMap<Snowflake, Member>,
    text_channels: DashMap<Snowflake, Arc<TextChannel>>,
}

impl Guild {
    /// Create a guild whose connected account is `self_member`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `self_member` belongs to another guild
    pub fn new(
        context: Arc<RestContext>,
        id: Snowflake,
        name: impl Into<String>,
        self_member: Member,
    ) -> Result<Arc<Self>, DomainError> {
        if !self_member.is_in_guild(id) {
            return Err(DomainError::invalid_argument(
                "Self member is not from the Guild being created",
            ));
        }
        let members = DashMap::new();
        let self_member_id = self_member.user_id;
        members.insert(self_member_id, self_member);

        Ok(Arc::new(Self {
            id,
            name: RwLock::new(name.into()),
            verification_level: RwLock::new(VerificationLevel::default()),
            self_member_id,
            self_standing: RwLock::new(AccountStanding::default()),
            context,
            members,
            text_channels: DashMap::new(),
        }))
    }

    #[inline]
    pub fn id(&self) -> Snowflake {
        self.id
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    pub fn context(&self) -> &Arc<RestContext> {
        &self.context
    }

    // =========================================================================
    // Verification
    // =========================================================================

    pub fn verification_level(&self) -> VerificationLevel {
        *self.verification_level.read()
    }

    pub fn set_verification_level(&self, level: VerificationLevel) -> &Self {
        *self.verification_level.write() = level;
        self
    }

    /// Email, phone and join facts of the connected user account
    pub fn self_standing(&self) -> AccountStanding {
        *self.self_standing.read()
    }

    pub fn set_self_standing(&self, standing: AccountStanding) -> &Self {
        *self.self_standing.write() = standing;
        self
    }

    /// Whether the connected account may send messages under the guild's
    /// verification level
    ///
    /// Bot accounts always pass. Without a recorded creation time the
    /// account's age is taken from its user id.
    pub fn check_verification(&self) -> bool {
        if self.context.account_type() == AccountType::Bot {
            return true;
        }
        let mut standing = self.self_standing();
        standing
            .created_at
            .get_or_insert_with(|| self.self_member_id.created_at());
        let level = self.verification_level();
        let permitted = level.permits(&standing, self.context.clock().now());
        if !permitted {
            debug!(guild_id = %self.id, %level, "Verification level blocks sending");
        }
        permitted
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Member of the connected account
    ///
    /// Falls back to a member without permissions if the entry is gone.
    pub fn self_member(&self) -> Member {
        self.members
            .get(&self.self_member_id)
            .map(|member| member.value().clone())
            .unwrap_or_else(|| Member::new(self.id, self.self_member_id, Permissions::empty()))
    }

    pub fn member(&self, user_id: Snowflake) -> Option<Member> {
        self.members.get(&user_id).map(|member| member.value().clone())
    }

    pub fn members(&self) -> Vec<Member> {
        self.members.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Insert or replace a member
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the member belongs to another guild
    pub fn upsert_member(&self, member: Member) -> Result<(), DomainError> {
        if !member.is_in_guild(self.id) {
            return Err(DomainError::invalid_argument(
                "Provided Member is not from this Guild",
            ));
        }
        self.members.insert(member.user_id, member);
        Ok(())
    }

    /// Remove a member; the connected account's own member is never removed
    pub fn remove_member(&self, user_id: Snowflake) -> Option<Member> {
        if user_id == self.self_member_id {
            return None;
        }
        self.members.remove(&user_id).map(|(_, member)| member)
    }

    // =========================================================================
    // Text channels
    // =========================================================================

    /// Register a text channel
    ///
    /// An id that is already registered keeps its channel handle, which is
    /// updated with `name` and `position` and returned.
    pub fn create_text_channel(
        self: &Arc<Self>,
        id: Snowflake,
        name: impl Into<String>,
        position: i32,
    ) -> Arc<TextChannel> {
        let name = name.into();
        match self.text_channels.entry(id) {
            Entry::Occupied(entry) => {
                let channel = Arc::clone(entry.get());
                drop(entry);
                channel.set_name(name).set_position(position);
                debug!(guild_id = %self.id, channel_id = %id, "Text channel updated");
                channel
            }
            Entry::Vacant(entry) => {
                let channel = Arc::new(TextChannel::new(id, self, name, position));
                entry.insert(Arc::clone(&channel));
                debug!(guild_id = %self.id, channel_id = %id, "Text channel registered");
                channel
            }
        }
    }

    pub fn text_channel(&self, id: Snowflake) -> Option<Arc<TextChannel>> {
        self.text_channels.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Text channels in hierarchy order
    pub fn text_channels(&self) -> Vec<Arc<TextChannel>> {
        let mut channels: Vec<_> = self
            .text_channels
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        channels.sort_by(|a, b| hierarchy_order(a, b));
        channels
    }

    /// Unregister `channel`, but only if it is the handle registered under its id
    pub(crate) fn remove_text_channel(&self, channel: &TextChannel) -> Option<Arc<TextChannel>> {
        self.text_channels
            .remove_if(&channel.id(), |_, registered| std::ptr::eq(registered.as_ref(), channel))
            .map(|(_, channel)| channel)
    }
}

impl fmt::Debug for Guild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guild")
            .field("id", &self.id)
            .field("name", &*self.name.read())
            .field("members", &self.members.len())
            .field("text_channels", &self.text_channels.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Guild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G:{}({})", self.name.read(), self.id)
    }
}
