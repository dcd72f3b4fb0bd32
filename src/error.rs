//! Access-Control Error Types

use thiserror::Error;

/// Access-control error types.
///
/// Authorization failures are fail-closed: any ambiguity or missing data
/// resolves to [`AclError::Forbidden`], never to an implicit grant. The
/// `Forbidden` message is constant so callers cannot learn which role the
/// actor actually holds.
#[derive(Debug, Error)]
pub enum AclError {
    /// Acting user is not authorized for this operation.
    #[error("Not authorized for this channel operation")]
    Forbidden,

    /// Referenced user does not exist.
    #[error("User not found")]
    UserNotFound,

    /// Referenced channel does not exist.
    #[error("Channel not found")]
    ChannelNotFound,

    /// Referenced membership relation does not exist.
    #[error("Relation not found")]
    RelationNotFound,

    /// A relation of this kind already exists for the (user, channel) pair.
    #[error("User already holds this role in the channel")]
    AlreadyRelated,

    /// Database error.
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

/// Result type for access-control operations.
pub type AclResult<T> = Result<T, AclError>;

impl AclError {
    /// Machine-readable error code, for the enclosing API layer to map onto
    /// its transport (403/404/409/500).
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ChannelNotFound => "CHANNEL_NOT_FOUND",
            Self::RelationNotFound => "RELATION_NOT_FOUND",
            Self::AlreadyRelated => "ALREADY_RELATED",
            Self::Database(_) => "INTERNAL_ERROR",
        }
    }
}
