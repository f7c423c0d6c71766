//! Value objects - immutable types that represent domain concepts

mod account_type;
mod permissions;
mod snowflake;
mod verification_level;

pub use account_type::AccountType;
pub use permissions::Permissions;
pub use snowflake::{Snowflake, SnowflakeParseError};
pub use verification_level::{AccountStanding, VerificationLevel};
