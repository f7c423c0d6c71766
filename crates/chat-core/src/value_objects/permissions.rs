//! Permission bitflags mirroring the platform's capability bits
//!
//! Bit positions match the platform so raw values from the wire can be used
//! directly.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Platform permission flags
    ///
    /// Serialized as string in JSON for JavaScript safety.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        const CREATE_INSTANT_INVITE = 1 << 0;
        const KICK_MEMBERS          = 1 << 1;
        const BAN_MEMBERS           = 1 << 2;
        /// Bypass all permission checks
        const ADMINISTRATOR         = 1 << 3;
        const MANAGE_CHANNEL        = 1 << 4;
        const MANAGE_SERVER         = 1 << 5;
        /// Add new reactions to messages
        const MESSAGE_ADD_REACTION  = 1 << 6;
        const VIEW_AUDIT_LOGS       = 1 << 7;
        /// See the channel and read its messages
        const MESSAGE_READ          = 1 << 10;
        /// Send messages
        const MESSAGE_WRITE         = 1 << 11;
        const MESSAGE_TTS           = 1 << 12;
        /// Delete or pin other users' messages, bulk delete, clear reactions
        const MESSAGE_MANAGE        = 1 << 13;
        /// Links sent are auto-embedded; required to send embeds without content
        const MESSAGE_EMBED_LINKS   = 1 << 14;
        /// Upload files
        const MESSAGE_ATTACH_FILES  = 1 << 15;
        /// Read messages sent before joining / fetch history
        const MESSAGE_HISTORY       = 1 << 16;
        const MESSAGE_MENTION_EVERYONE = 1 << 17;
        const MESSAGE_EXT_EMOJI     = 1 << 18;
        const NICKNAME_CHANGE       = 1 << 26;
        const NICKNAME_MANAGE       = 1 << 27;
        const MANAGE_ROLES          = 1 << 28;
        /// Create, edit and delete webhooks
        const MANAGE_WEBHOOKS       = 1 << 29;
        const MANAGE_EMOTES         = 1 << 30;

        /// Default text permissions for @everyone
        const DEFAULT_TEXT = Self::MESSAGE_READ.bits()
            | Self::MESSAGE_WRITE.bits()
            | Self::MESSAGE_HISTORY.bits()
            | Self::MESSAGE_ADD_REACTION.bits()
            | Self::MESSAGE_EMBED_LINKS.bits()
            | Self::MESSAGE_ATTACH_FILES.bits();
    }
}

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// Administrators bypass all permission checks.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.contains(permission)
    }

    /// Check if the permission set has any of the given permissions
    #[inline]
    pub fn has_any(&self, permissions: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.intersects(permissions)
    }

    /// Apply a channel overwrite: deny bits are removed first, then allow bits added
    #[inline]
    #[must_use]
    pub fn with_overwrite(self, allow: Permissions, deny: Permissions) -> Self {
        (self - deny) | allow
    }

    /// Parse from string representation (decimal number)
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.parse::<u64>().map(Permissions::from_bits_truncate)
    }

    /// Names of all individual permissions that are set
    pub fn list(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.list().join(", "))
    }
}

// Serialize as string for JSON (JavaScript BigInt safety)
impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

// Deserialize from string or number
impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PermissionsVisitor;

        impl Visitor<'_> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing permission bits")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_truncate(value as u64))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_truncate(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                value
                    .parse::<u64>()
                    .map(Permissions::from_bits_truncate)
                    .map_err(|_| de::Error::custom("invalid permissions string"))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}

impl From<u64> for Permissions {
    fn from(bits: u64) -> Self {
        Permissions::from_bits_truncate(bits)
    }
}

impl From<Permissions> for u64 {
    fn from(perms: Permissions) -> Self {
        perms.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_text_permissions() {
        let default = Permissions::DEFAULT_TEXT;
        assert!(default.contains(Permissions::MESSAGE_READ));
        assert!(default.contains(Permissions::MESSAGE_WRITE));
        assert!(default.contains(Permissions::MESSAGE_HISTORY));
        assert!(!default.contains(Permissions::MESSAGE_MANAGE));
        assert!(!default.contains(Permissions::MANAGE_WEBHOOKS));
    }

    #[test]
    fn test_administrator_bypass() {
        let admin = Permissions::ADMINISTRATOR;
        assert!(admin.has(Permissions::MESSAGE_READ));
        assert!(admin.has(Permissions::MANAGE_WEBHOOKS));
        assert!(admin.has(Permissions::MESSAGE_MANAGE | Permissions::MESSAGE_HISTORY));
    }

    #[test]
    fn test_has_requires_every_bit() {
        let perms = Permissions::MESSAGE_READ | Permissions::MESSAGE_WRITE;
        assert!(perms.has(Permissions::MESSAGE_READ));
        assert!(perms.has(Permissions::MESSAGE_READ | Permissions::MESSAGE_WRITE));
        assert!(!perms.has(Permissions::MESSAGE_READ | Permissions::MESSAGE_MANAGE));
    }

    #[test]
    fn test_has_any() {
        let perms = Permissions::MESSAGE_READ;
        assert!(perms.has_any(Permissions::MESSAGE_READ | Permissions::MANAGE_SERVER));
        assert!(!Permissions::MESSAGE_WRITE.has_any(Permissions::MESSAGE_READ));
    }

    #[test]
    fn test_overwrite_deny_then_allow() {
        let base = Permissions::MESSAGE_READ | Permissions::MESSAGE_WRITE;
        let result = base.with_overwrite(Permissions::MESSAGE_MANAGE, Permissions::MESSAGE_WRITE);
        assert!(result.contains(Permissions::MESSAGE_READ));
        assert!(result.contains(Permissions::MESSAGE_MANAGE));
        assert!(!result.contains(Permissions::MESSAGE_WRITE));

        // allow wins over deny for the same bit
        let both = base.with_overwrite(Permissions::MESSAGE_WRITE, Permissions::MESSAGE_WRITE);
        assert!(both.contains(Permissions::MESSAGE_WRITE));
    }

    #[test]
    fn test_serialize_json() {
        let perms = Permissions::MESSAGE_READ | Permissions::MESSAGE_WRITE;
        let json = serde_json::to_string(&perms).unwrap();
        assert_eq!(json, "\"3072\"");
    }

    #[test]
    fn test_deserialize_string_and_number() {
        let perms: Permissions = serde_json::from_str("\"3072\"").unwrap();
        assert!(perms.contains(Permissions::MESSAGE_READ | Permissions::MESSAGE_WRITE));

        let perms: Permissions = serde_json::from_str("536870912").unwrap();
        assert_eq!(perms, Permissions::MANAGE_WEBHOOKS);
    }

    #[test]
    fn test_list_and_display() {
        let perms = Permissions::MESSAGE_READ | Permissions::MANAGE_WEBHOOKS;
        let list = perms.list();
        assert_eq!(list, vec!["MESSAGE_READ", "MANAGE_WEBHOOKS"]);
        assert_eq!(perms.to_string(), "MESSAGE_READ, MANAGE_WEBHOOKS");
    }

    #[test]
    fn test_platform_bit_positions() {
        assert_eq!(Permissions::ADMINISTRATOR.bits(), 0x8);
        assert_eq!(Permissions::MESSAGE_READ.bits(), 0x400);
        assert_eq!(Permissions::MESSAGE_WRITE.bits(), 0x800);
        assert_eq!(Permissions::MESSAGE_MANAGE.bits(), 0x2000);
        assert_eq!(Permissions::MESSAGE_HISTORY.bits(), 0x10000);
        assert_eq!(Permissions::MANAGE_WEBHOOKS.bits(), 0x2000_0000);
    }
}
