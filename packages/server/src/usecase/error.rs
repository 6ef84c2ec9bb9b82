//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{PlaybackError, StoreError};

/// Room Session Manager の join が失敗した理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("room '{0}' is not known")]
    UnknownRoom(String),

    #[error("room '{0}' has been closed")]
    RoomClosed(String),

    #[error("failed to resolve room: {0}")]
    Store(#[from] StoreError),
}

/// ホスト限定の再生操作が拒否・無視された理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackControlError {
    #[error("room '{0}' is not live")]
    UnknownRoom(String),

    #[error(transparent)]
    Denied(#[from] PlaybackError),
}

/// chat / reaction / gift の中継が破棄された理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivityError {
    #[error("room '{0}' is not known")]
    UnknownRoom(String),

    #[error("activity was not persisted: {0}")]
    Persistence(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    #[error("room password must not be empty")]
    EmptyPassword,

    #[error("failed to create room record: {0}")]
    Store(#[from] StoreError),
}

/// パスワード付き入室（HTTP）の失敗理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnterRoomError {
    #[error("room '{0}' does not exist")]
    NotFound(String),

    #[error("room '{0}' is no longer active")]
    Inactive(String),

    #[error("wrong room password")]
    WrongPassword,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloseRoomError {
    #[error("room '{0}' is not known")]
    UnknownRoom(String),

    #[error(transparent)]
    Denied(#[from] PlaybackError),

    #[error("failed to resolve room: {0}")]
    Store(#[from] StoreError),
}
