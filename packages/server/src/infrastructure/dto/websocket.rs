//! WebSocket event frames.
//!
//! Every frame is one JSON object, adjacently tagged:
//! `{"event": "play", "data": {"roomId": "abc123", "currentTime": 42.0}}`.
//! Events without a payload (`room-closed`, `watch-end` server→client) omit
//! `data`.

use serde::{Deserialize, Serialize};

/// Movie id as sent by clients: TMDB ids are numeric, others are strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MovieIdDto {
    Number(i64),
    Text(String),
}

// ========================================
// client → server
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom(RoomUserPayload),
    LeaveRoom(RoomUserPayload),
    Play(PlaybackPayload),
    Pause(PlaybackPayload),
    Seek(PlaybackPayload),
    ChatMessage(ChatMessagePayload),
    Reaction(ReactionPayload),
    Gift(GiftPayload),
    CloseRoom(RoomOnlyPayload),
    WatchStart(WatchStartPayload),
    WatchEnd(RoomOnlyPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUserPayload {
    pub room_id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackPayload {
    pub room_id: String,
    pub current_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub room_id: String,
    pub message: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionPayload {
    pub room_id: String,
    pub emoji: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftPayload {
    pub room_id: String,
    pub gift_type: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOnlyPayload {
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchStartPayload {
    pub room_id: String,
    pub movie_id: MovieIdDto,
    pub video_url: String,
}

// ========================================
// server → client
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    UserJoined(UserPresence),
    RoomState(RoomStateDto),
    UserLeft(UserPresence),
    Play(PlaybackUpdate),
    Pause(PlaybackUpdate),
    Seek(PlaybackUpdate),
    ChatMessage(ChatBroadcast),
    Reaction(ReactionBroadcast),
    Gift(GiftBroadcast),
    RoomClosed,
    WatchStart(WatchStartBroadcast),
    WatchEnd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPresence {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub user_id: String,
    pub username: String,
    pub connection_id: String,
}

/// Full room snapshot sent to a joining connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStateDto {
    pub room_id: String,
    pub host_id: String,
    pub is_playing: bool,
    pub current_time: f64,
    pub video_url: Option<String>,
    pub movie_id: Option<MovieIdDto>,
    pub participants: Vec<ParticipantDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackUpdate {
    pub current_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBroadcast {
    pub user_id: String,
    pub username: String,
    pub message: String,
    /// RFC 3339, assigned by the server.
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionBroadcast {
    pub user_id: String,
    pub username: String,
    pub emoji: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftBroadcast {
    pub user_id: String,
    pub username: String,
    pub gift_type: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchStartBroadcast {
    pub movie_id: MovieIdDto,
    pub video_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_play_frame() {
        // テスト項目: play イベントのフレームが正しくパースされる
        // given (前提条件):
        let frame = r#"{"event":"play","data":{"roomId":"abc123","currentTime":10}}"#;

        // when (操作):
        let parsed: ClientMessage = serde_json::from_str(frame).unwrap();

        // then (期待する結果):
        assert_eq!(
            parsed,
            ClientMessage::Play(PlaybackPayload {
                room_id: "abc123".to_string(),
                current_time: 10.0,
            })
        );
    }

    #[test]
    fn test_parse_watch_start_with_numeric_movie_id() {
        // テスト項目: 数値の movieId を含む watch-start がパースされる
        // given (前提条件):
        let frame = r#"{"event":"watch-start","data":{"roomId":"abc123","movieId":550,"videoUrl":"https://v/1.mp4"}}"#;

        // when (操作):
        let parsed: ClientMessage = serde_json::from_str(frame).unwrap();

        // then (期待する結果):
        match parsed {
            ClientMessage::WatchStart(payload) => {
                assert_eq!(payload.movie_id, MovieIdDto::Number(550));
                assert_eq!(payload.video_url, "https://v/1.mp4");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        // テスト項目: 未知のイベント名はパースエラーになる
        // given (前提条件):
        let frame = r#"{"event":"self-destruct","data":{"roomId":"abc123"}}"#;

        // when (操作):
        let parsed = serde_json::from_str::<ClientMessage>(frame);

        // then (期待する結果):
        assert!(parsed.is_err());
    }

    #[test]
    fn test_room_closed_has_no_data() {
        // テスト項目: room-closed はデータなしのフレームとして送信される
        // given (前提条件):
        let message = ServerMessage::RoomClosed;

        // when (操作):
        let json = serde_json::to_value(&message).unwrap();

        // then (期待する結果):
        assert_eq!(json, serde_json::json!({"event": "room-closed"}));
    }

    #[test]
    fn test_user_joined_uses_camel_case() {
        // テスト項目: user-joined のペイロードは camelCase で出力される
        // given (前提条件):
        let message = ServerMessage::UserJoined(UserPresence {
            user_id: "U2".to_string(),
            username: "bob".to_string(),
        });

        // when (操作):
        let json = serde_json::to_value(&message).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({"event": "user-joined", "data": {"userId": "U2", "username": "bob"}})
        );
    }
}
