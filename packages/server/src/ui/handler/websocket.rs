//! WebSocket connection handlers.
//!
//! 認証はアップグレード前に行い、失敗した場合は 401 を返す。
//! 接続後のイベントで発生したエラーはクライアントには返さず、ログにのみ残す。

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionId, Emoji, GiftType, MessageContent, PlaybackPosition, RoomId, UserId,
        Username, ValueObjectError, VideoUrl,
    },
    infrastructure::dto::websocket::{ClientMessage, PlaybackPayload},
    ui::state::AppState,
    usecase::{Activity, ActivityError, CloseRoomError, JoinError, PlaybackControlError},
};

use super::auth::{authenticate, bearer_token};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // ヘッダーを優先し、無ければクエリパラメータ（ブラウザはヘッダーを設定できない）
    let token = bearer_token(&headers).or(query.token);
    let user_id = authenticate(&state, token).inspect_err(|_| {
        tracing::warn!("Rejected WebSocket handshake: invalid or missing credential");
    })?;

    let connection_id = ConnectionId::generate();
    tracing::info!("User '{}' connected as '{}'", user_id, connection_id);

    Ok(ws.on_upgrade(move |socket| {
        handle_socket(
            socket,
            state,
            Session {
                user_id,
                connection_id,
            },
        )
    }))
}

/// Authenticated identity bound to one connection.
#[derive(Debug, Clone)]
struct Session {
    user_id: UserId,
    connection_id: ConnectionId,
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, session: Session) {
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    state
        .dispatcher
        .register_connection(session.connection_id, tx);

    let state_clone = state.clone();
    let session_clone = session.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", session_clone.connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_text(&state_clone, &session_clone, text.as_str()).await;
                }
                Message::Binary(_) => {
                    tracing::debug!("Ignoring binary frame from '{}'", session_clone.connection_id);
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", session_clone.connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to push dispatched events to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let removed = state.disconnect_usecase.execute(&session.connection_id);
    tracing::info!(
        "User '{}' disconnected ('{}', {} roster entries cleaned up)",
        session.user_id,
        session.connection_id,
        removed.len()
    );
}

/// Reasons an inbound event produced no effect.
#[derive(Debug, Error)]
enum EventError {
    #[error("malformed event: {0}")]
    Malformed(#[from] ValueObjectError),

    #[error(transparent)]
    Join(#[from] JoinError),

    #[error(transparent)]
    Playback(#[from] PlaybackControlError),

    #[error(transparent)]
    Activity(#[from] ActivityError),

    #[error(transparent)]
    Close(#[from] CloseRoomError),
}

impl EventError {
    /// Persistence problems and malformed input are worth an operator's attention.
    /// Authority violations and unknown rooms are routine.
    fn is_warning(&self) -> bool {
        matches!(
            self,
            EventError::Malformed(_)
                | EventError::Join(JoinError::Store(_))
                | EventError::Activity(ActivityError::Persistence(_))
                | EventError::Close(CloseRoomError::Store(_))
        )
    }
}

async fn handle_text(state: &AppState, session: &Session, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(
                "Ignoring unparsable frame from '{}': {}",
                session.connection_id,
                e
            );
            return;
        }
    };

    if let Err(e) = route(state, session, message).await {
        if e.is_warning() {
            tracing::warn!("Event from '{}' dropped: {}", session.user_id, e);
        } else {
            tracing::debug!("Event from '{}' ignored: {}", session.user_id, e);
        }
    }
}

fn playback_args(payload: PlaybackPayload) -> Result<(RoomId, PlaybackPosition), EventError> {
    Ok((
        RoomId::try_from(payload.room_id)?,
        PlaybackPosition::try_from(payload.current_time)?,
    ))
}

async fn route(
    state: &AppState,
    session: &Session,
    message: ClientMessage,
) -> Result<(), EventError> {
    let Session {
        user_id,
        connection_id,
    } = session;

    match message {
        ClientMessage::JoinRoom(payload) => {
            let room_id = RoomId::try_from(payload.room_id)?;
            let username = Username::try_from(payload.username)?;
            state
                .join_room_usecase
                .execute(room_id, user_id.clone(), username, *connection_id)
                .await?;
        }
        ClientMessage::LeaveRoom(payload) => {
            let room_id = RoomId::try_from(payload.room_id)?;
            let username = Username::try_from(payload.username)?;
            state
                .leave_room_usecase
                .execute(room_id, user_id.clone(), username, *connection_id)
                .await;
        }
        ClientMessage::Play(payload) => {
            let (room_id, current_time) = playback_args(payload)?;
            state
                .playback_control_usecase
                .play(&room_id, user_id, connection_id, current_time)?;
        }
        ClientMessage::Pause(payload) => {
            let (room_id, current_time) = playback_args(payload)?;
            state
                .playback_control_usecase
                .pause(&room_id, user_id, connection_id, current_time)?;
        }
        ClientMessage::Seek(payload) => {
            let (room_id, current_time) = playback_args(payload)?;
            state
                .playback_control_usecase
                .seek(&room_id, user_id, connection_id, current_time)?;
        }
        ClientMessage::ChatMessage(payload) => {
            let room_id = RoomId::try_from(payload.room_id)?;
            let activity = Activity::Chat(MessageContent::try_from(payload.message)?);
            let username = Username::try_from(payload.username)?;
            state
                .relay_activity_usecase
                .execute(&room_id, user_id.clone(), username, activity)
                .await?;
        }
        ClientMessage::Reaction(payload) => {
            let room_id = RoomId::try_from(payload.room_id)?;
            let activity = Activity::Reaction(Emoji::try_from(payload.emoji)?);
            let username = Username::try_from(payload.username)?;
            state
                .relay_activity_usecase
                .execute(&room_id, user_id.clone(), username, activity)
                .await?;
        }
        ClientMessage::Gift(payload) => {
            let room_id = RoomId::try_from(payload.room_id)?;
            let activity = Activity::Gift(GiftType::try_from(payload.gift_type)?);
            let username = Username::try_from(payload.username)?;
            state
                .relay_activity_usecase
                .execute(&room_id, user_id.clone(), username, activity)
                .await?;
        }
        ClientMessage::CloseRoom(payload) => {
            let room_id = RoomId::try_from(payload.room_id)?;
            state
                .playback_control_usecase
                .close(&room_id, user_id)
                .await?;
        }
        ClientMessage::WatchStart(payload) => {
            let room_id = RoomId::try_from(payload.room_id)?;
            let video_url = VideoUrl::try_from(payload.video_url)?;
            state.playback_control_usecase.load_media(
                &room_id,
                user_id,
                connection_id,
                payload.movie_id.into(),
                video_url,
            )?;
        }
        ClientMessage::WatchEnd(payload) => {
            let room_id = RoomId::try_from(payload.room_id)?;
            state
                .playback_control_usecase
                .end_media(&room_id, user_id, connection_id)?;
        }
    }

    Ok(())
}
