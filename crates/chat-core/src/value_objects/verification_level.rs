//! Guild verification level - gate on who may post in a guild
//!
//! Bot accounts are never subject to it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Guild verification level as keyed by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerificationLevel {
    #[default]
    None,
    /// Verified email
    Low,
    /// Verified email and an account older than 5 minutes
    Medium,
    /// Medium, plus a guild membership older than 10 minutes
    High,
    /// Verified phone number
    VeryHigh,
    /// Level not known to this client
    Unknown,
}

/// What the platform knows about the connected user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountStanding {
    pub created_at: Option<DateTime<Utc>>,
    pub joined_at: Option<DateTime<Utc>>,
    pub email_verified: bool,
    pub phone_verified: bool,
}

impl VerificationLevel {
    /// Minimum account age at MEDIUM and above
    pub const MIN_ACCOUNT_AGE_MINUTES: i64 = 5;

    /// Minimum membership age at HIGH and above
    pub const MIN_MEMBERSHIP_AGE_MINUTES: i64 = 10;

    pub fn from_key(key: i64) -> Self {
        match key {
            0 => Self::None,
            1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            4 => Self::VeryHigh,
            _ => Self::Unknown,
        }
    }

    pub fn key(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::VeryHigh => 4,
            Self::Unknown => -1,
        }
    }

    /// Whether an account with `standing` may post at this level at `now`
    ///
    /// A phone-verified account passes every level and an unknown level lets
    /// everyone through. A missing timestamp never satisfies an age requirement.
    pub fn permits(self, standing: &AccountStanding, now: DateTime<Utc>) -> bool {
        if standing.phone_verified {
            return true;
        }
        let older_than = |at: Option<DateTime<Utc>>, minutes: i64| {
            at.is_some_and(|at| now - at >= Duration::minutes(minutes))
        };

        match self {
            Self::None | Self::Unknown => true,
            Self::Low => standing.email_verified,
            Self::Medium => {
                standing.email_verified && older_than(standing.created_at, Self::MIN_ACCOUNT_AGE_MINUTES)
            }
            Self::High => {
                standing.email_verified
                    && older_than(standing.created_at, Self::MIN_ACCOUNT_AGE_MINUTES)
                    && older_than(standing.joined_at, Self::MIN_MEMBERSHIP_AGE_MINUTES)
            }
            Self::VeryHigh => false,
        }
    }
}

impl fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::VeryHigh => "VERY_HIGH",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

impl Serialize for VerificationLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.key())
    }
}

impl<'de> Deserialize<'de> for VerificationLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::from_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn veteran() -> AccountStanding {
        AccountStanding {
            created_at: Some(now() - Duration::days(30)),
            joined_at: Some(now() - Duration::days(1)),
            email_verified: true,
            phone_verified: false,
        }
    }

    #[test]
    fn test_key_roundtrip_and_unknown() {
        for key in 0..=4 {
            assert_eq!(VerificationLevel::from_key(key).key(), key);
        }
        assert_eq!(VerificationLevel::from_key(9), VerificationLevel::Unknown);
        assert_eq!(VerificationLevel::VeryHigh.to_string(), "VERY_HIGH");
    }

    #[test]
    fn test_unverified_account() {
        let standing = AccountStanding::default();
        assert!(VerificationLevel::None.permits(&standing, now()));
        assert!(VerificationLevel::Unknown.permits(&standing, now()));
        assert!(!VerificationLevel::Low.permits(&standing, now()));
        assert!(!VerificationLevel::VeryHigh.permits(&standing, now()));
    }

    #[test]
    fn test_age_requirements() {
        let mut standing = veteran();
        assert!(VerificationLevel::High.permits(&standing, now()));

        standing.joined_at = Some(now() - Duration::minutes(9));
        assert!(!VerificationLevel::High.permits(&standing, now()));
        assert!(VerificationLevel::Medium.permits(&standing, now()));

        standing.created_at = Some(now() - Duration::minutes(4));
        assert!(!VerificationLevel::Medium.permits(&standing, now()));
        assert!(VerificationLevel::Low.permits(&standing, now()));

        standing.created_at = None;
        assert!(!VerificationLevel::Medium.permits(&standing, now()));
    }

    #[test]
    fn test_phone_passes_every_level() {
        let standing = AccountStanding {
            phone_verified: true,
            ..AccountStanding::default()
        };
        assert!(VerificationLevel::VeryHigh.permits(&standing, now()));
        assert!(!VerificationLevel::VeryHigh.permits(&veteran(), now()));
    }

    #[test]
    fn test_serde_as_integer() {
        let json = serde_json::to_string(&VerificationLevel::High).unwrap();
        assert_eq!(json, "3");
        let level: VerificationLevel = serde_json::from_str("4").unwrap();
        assert_eq!(level, VerificationLevel::VeryHigh);
    }
}
