//! Domain error types.

use thiserror::Error;

/// Value object validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} is too long ({len} > {max})")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("playback position must be a finite, non-negative number of seconds")]
    InvalidPlaybackPosition,
}

/// Credential verification failures (AuthFailure).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no credential presented")]
    MissingToken,

    #[error("credential is malformed or its signature is invalid")]
    InvalidToken,

    #[error("credential has expired")]
    TokenExpired,

    #[error("failed to issue credential: {0}")]
    IssueFailed(String),
}

/// Playback state transitions refused by the room.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// AuthorityViolation: the actor is not the room's host.
    #[error("user '{0}' is not the host of this room")]
    NotHost(String),

    #[error("room has been closed")]
    RoomClosed,
}

/// Collaborator store failures (PersistenceFailure).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("store call timed out after {0} ms")]
    Timeout(u64),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Direct delivery failures. Room fan-out never fails as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),

    #[error("connection '{0}' is closed")]
    ChannelClosed(String),
}
