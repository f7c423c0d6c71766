//! Domain errors - precondition failures raised before any request is issued

use thiserror::Error;

use crate::value_objects::{Permissions, VerificationLevel};

/// Domain layer errors
///
/// Every variant is raised synchronously, before any I/O, and is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    /// Caller supplied out-of-contract input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid snowflake: {0}")]
    InvalidSnowflake(String),

    // =========================================================================
    // State Errors
    // =========================================================================
    /// The action or entity cannot perform the request in its current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The request kind does not support the attempted mutation
    #[error("Precondition failed: {0}")]
    Precondition(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Missing permission: {permission}")]
    MissingPermission {
        permission: Permissions,
        reason: Option<String>,
    },

    /// The connected account does not meet the guild's verification level
    #[error("Verification level {0} prevents this account from sending messages in the guild")]
    Verification(VerificationLevel),
}

impl DomainError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a missing permission error
    pub fn missing_permission(permission: Permissions) -> Self {
        Self::MissingPermission {
            permission,
            reason: None,
        }
    }

    /// Create a missing permission error with an explanatory reason
    pub fn missing_permission_because(permission: Permissions, reason: impl Into<String>) -> Self {
        Self::MissingPermission {
            permission,
            reason: Some(reason.into()),
        }
    }

    /// Get an error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::InvalidSnowflake(_) => "INVALID_SNOWFLAKE",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Precondition(_) => "PRECONDITION_FAILED",
            Self::MissingPermission { .. } => "MISSING_PERMISSIONS",
            Self::Verification(_) => "VERIFICATION_LEVEL",
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::InvalidSnowflake(_))
    }

    /// Check if this is a state error (including edit preconditions)
    pub fn is_state(&self) -> bool {
        matches!(self, Self::InvalidState(_) | Self::Precondition(_))
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::MissingPermission { .. } | Self::Verification(_))
    }
}
