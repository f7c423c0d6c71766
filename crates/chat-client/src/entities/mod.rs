//! Channel-side entities and permission evaluation

mod guild;
pub mod message_channel;
mod permission;
mod text_channel;

pub use guild::Guild;
pub use message_channel::MessageHistory;
pub use permission::{MemberPermissionExt, OverwritePermissionChecker, PermissionChecker, PermissionOverwrite};
pub use text_channel::{TextChannel, BULK_DELETE_MAX, BULK_DELETE_MAX_AGE_DAYS, BULK_DELETE_MIN};
