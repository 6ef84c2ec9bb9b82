//! Events fanned out to room members.

use super::{
    entity::RoomState,
    value_object::{
        Emoji, GiftType, MessageContent, MovieId, PlaybackPosition, Timestamp, UserId, Username,
        VideoUrl,
    },
};

/// Server→client events. The wire names live in the WebSocket DTO layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    UserJoined {
        user_id: UserId,
        username: Username,
    },
    RoomState(RoomState),
    UserLeft {
        user_id: UserId,
        username: Username,
    },
    Play {
        current_time: PlaybackPosition,
    },
    Pause {
        current_time: PlaybackPosition,
    },
    Seek {
        current_time: PlaybackPosition,
    },
    ChatMessage {
        user_id: UserId,
        username: Username,
        message: MessageContent,
        timestamp: Timestamp,
    },
    Reaction {
        user_id: UserId,
        username: Username,
        emoji: Emoji,
        timestamp: Timestamp,
    },
    Gift {
        user_id: UserId,
        username: Username,
        gift_type: GiftType,
        timestamp: Timestamp,
    },
    RoomClosed,
    WatchStart {
        movie_id: MovieId,
        video_url: VideoUrl,
    },
    WatchEnd,
}

impl RoomEvent {
    /// Wire name of the event, used for logging.
    pub fn name(&self) -> &'static str {
        match self {
            RoomEvent::UserJoined { .. } => "user-joined",
            RoomEvent::RoomState(_) => "room-state",
            RoomEvent::UserLeft { .. } => "user-left",
            RoomEvent::Play { .. } => "play",
            RoomEvent::Pause { .. } => "pause",
            RoomEvent::Seek { .. } => "seek",
            RoomEvent::ChatMessage { .. } => "chat-message",
            RoomEvent::Reaction { .. } => "reaction",
            RoomEvent::Gift { .. } => "gift",
            RoomEvent::RoomClosed => "room-closed",
            RoomEvent::WatchStart { .. } => "watch-start",
            RoomEvent::WatchEnd => "watch-end",
        }
    }
}
