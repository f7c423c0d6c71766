//! Permission evaluation for members in text channels

use chat_core::{DomainError, Member, Permissions};
use tracing::debug;

use super::text_channel::TextChannel;

/// Per-member channel permission overwrite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionOverwrite {
    pub allow: Permissions,
    pub deny: Permissions,
}

impl PermissionOverwrite {
    pub fn new(allow: Permissions, deny: Permissions) -> Self {
        Self { allow, deny }
    }
}

/// Decides whether a member holds permissions in a channel
pub trait PermissionChecker: Send + Sync {
    fn has(&self, member: &Member, channel: &TextChannel, permissions: Permissions) -> bool;

    /// Fail with the first missing permission of `permissions`
    ///
    /// # Errors
    /// Returns `DomainError::MissingPermission` naming the single missing flag
    fn check(
        &self,
        member: &Member,
        channel: &TextChannel,
        permissions: Permissions,
    ) -> Result<(), DomainError> {
        for flag in permissions.iter() {
            if !self.has(member, channel, flag) {
                debug!(
                    user_id = %member.user_id,
                    channel_id = %channel.id(),
                    permission = %flag,
                    "Permission check failed"
                );
                return Err(DomainError::missing_permission(flag));
            }
        }
        Ok(())
    }
}

/// Base member permissions with the channel's per-member overwrite applied
#[derive(Debug, Clone, Copy, Default)]
pub struct OverwritePermissionChecker;

impl PermissionChecker for OverwritePermissionChecker {
    fn has(&self, member: &Member, channel: &TextChannel, permissions: Permissions) -> bool {
        member.has_permission(channel, permissions)
    }
}

/// Direct permission evaluation on a member, bypassing any configured checker
pub trait MemberPermissionExt {
    fn effective_permissions(&self, channel: &TextChannel) -> Permissions;

    fn has_permission(&self, channel: &TextChannel, permissions: Permissions) -> bool {
        self.effective_permissions(channel).has(permissions)
    }
}

impl MemberPermissionExt for Member {
    fn effective_permissions(&self, channel: &TextChannel) -> Permissions {
        if !self.is_in_guild(channel.guild_id()) {
            return Permissions::empty();
        }
        if self.permissions.contains(Permissions::ADMINISTRATOR) {
            return Permissions::all();
        }
        match channel.overwrite_for(self.user_id) {
            Some(overwrite) => self.permissions.with_overwrite(overwrite.allow, overwrite.deny),
            None => self.permissions,
        }
    }
}
