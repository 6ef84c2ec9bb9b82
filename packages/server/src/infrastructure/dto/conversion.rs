//! Conversion logic between DTOs and domain entities.

use watchroom_shared::time::timestamp_to_rfc3339;

use crate::domain::{MovieId, RoomEvent, RoomRecord, RoomState};
use crate::infrastructure::dto::{http as http_dto, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

impl From<dto::MovieIdDto> for MovieId {
    fn from(value: dto::MovieIdDto) -> Self {
        match value {
            dto::MovieIdDto::Number(id) => MovieId::Numeric(id),
            dto::MovieIdDto::Text(id) => MovieId::Text(id),
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&MovieId> for dto::MovieIdDto {
    fn from(model: &MovieId) -> Self {
        match model {
            MovieId::Numeric(id) => dto::MovieIdDto::Number(*id),
            MovieId::Text(id) => dto::MovieIdDto::Text(id.clone()),
        }
    }
}

impl From<&RoomState> for dto::RoomStateDto {
    fn from(state: &RoomState) -> Self {
        Self {
            room_id: state.room_id().as_str().to_string(),
            host_id: state.host_id().as_str().to_string(),
            is_playing: state.is_playing(),
            current_time: state.current_time().seconds(),
            video_url: state.media().map(|m| m.video_url.as_str().to_string()),
            movie_id: state.media().map(|m| (&m.movie_id).into()),
            participants: state
                .participants()
                .iter()
                .map(|p| dto::ParticipantDto {
                    user_id: p.user_id.as_str().to_string(),
                    username: p.username.as_str().to_string(),
                    connection_id: p.connection_id.to_string(),
                })
                .collect(),
        }
    }
}

impl From<&RoomEvent> for dto::ServerMessage {
    fn from(event: &RoomEvent) -> Self {
        match event {
            RoomEvent::UserJoined { user_id, username } => {
                dto::ServerMessage::UserJoined(dto::UserPresence {
                    user_id: user_id.as_str().to_string(),
                    username: username.as_str().to_string(),
                })
            }
            RoomEvent::RoomState(state) => dto::ServerMessage::RoomState(state.into()),
            RoomEvent::UserLeft { user_id, username } => {
                dto::ServerMessage::UserLeft(dto::UserPresence {
                    user_id: user_id.as_str().to_string(),
                    username: username.as_str().to_string(),
                })
            }
            RoomEvent::Play { current_time } => dto::ServerMessage::Play(dto::PlaybackUpdate {
                current_time: current_time.seconds(),
            }),
            RoomEvent::Pause { current_time } => dto::ServerMessage::Pause(dto::PlaybackUpdate {
                current_time: current_time.seconds(),
            }),
            RoomEvent::Seek { current_time } => dto::ServerMessage::Seek(dto::PlaybackUpdate {
                current_time: current_time.seconds(),
            }),
            RoomEvent::ChatMessage {
                user_id,
                username,
                message,
                timestamp,
            } => dto::ServerMessage::ChatMessage(dto::ChatBroadcast {
                user_id: user_id.as_str().to_string(),
                username: username.as_str().to_string(),
                message: message.as_str().to_string(),
                timestamp: timestamp_to_rfc3339(timestamp.value()),
            }),
            RoomEvent::Reaction {
                user_id,
                username,
                emoji,
                timestamp,
            } => dto::ServerMessage::Reaction(dto::ReactionBroadcast {
                user_id: user_id.as_str().to_string(),
                username: username.as_str().to_string(),
                emoji: emoji.as_str().to_string(),
                timestamp: timestamp_to_rfc3339(timestamp.value()),
            }),
            RoomEvent::Gift {
                user_id,
                username,
                gift_type,
                timestamp,
            } => dto::ServerMessage::Gift(dto::GiftBroadcast {
                user_id: user_id.as_str().to_string(),
                username: username.as_str().to_string(),
                gift_type: gift_type.as_str().to_string(),
                timestamp: timestamp_to_rfc3339(timestamp.value()),
            }),
            RoomEvent::RoomClosed => dto::ServerMessage::RoomClosed,
            RoomEvent::WatchStart {
                movie_id,
                video_url,
            } => dto::ServerMessage::WatchStart(dto::WatchStartBroadcast {
                movie_id: movie_id.into(),
                video_url: video_url.as_str().to_string(),
            }),
            RoomEvent::WatchEnd => dto::ServerMessage::WatchEnd,
        }
    }
}

impl From<&RoomRecord> for http_dto::RoomRecordDto {
    fn from(record: &RoomRecord) -> Self {
        Self {
            id: record.id.0,
            room_id: record.room_id.as_str().to_string(),
            host_id: record.host_id.as_str().to_string(),
            is_active: record.is_active,
            created_at: timestamp_to_rfc3339(record.created_at.value()),
            closed_at: record.closed_at.map(|t| timestamp_to_rfc3339(t.value())),
        }
    }
}
