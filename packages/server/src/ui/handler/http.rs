//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{PlaybackError, RoomId},
    infrastructure::dto::{
        http::{CreateRoomRequest, ErrorResponse, JoinRoomRequest, MessageResponse, RoomRecordDto},
        websocket::RoomStateDto,
    },
    ui::state::AppState,
    usecase::{CloseRoomError, CreateRoomError, EnterRoomError},
};

use super::auth::AuthUser;

/// Error body with a status code.
pub struct ApiError(StatusCode, String);

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self(status, message.into())
    }

    fn internal(e: impl std::fmt::Display) -> Self {
        tracing::error!("Request failed: {}", e);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ErrorResponse { error: self.1 })).into_response()
    }
}

impl From<CreateRoomError> for ApiError {
    fn from(e: CreateRoomError) -> Self {
        match e {
            CreateRoomError::EmptyPassword => Self::new(StatusCode::BAD_REQUEST, e.to_string()),
            CreateRoomError::Store(_) => Self::internal(e),
        }
    }
}

impl From<EnterRoomError> for ApiError {
    fn from(e: EnterRoomError) -> Self {
        match e {
            EnterRoomError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Room not found"),
            EnterRoomError::Inactive(_) => Self::new(StatusCode::BAD_REQUEST, "Room is closed"),
            EnterRoomError::WrongPassword => {
                Self::new(StatusCode::UNAUTHORIZED, "Incorrect password")
            }
            EnterRoomError::Store(_) => Self::internal(e),
        }
    }
}

impl From<CloseRoomError> for ApiError {
    fn from(e: CloseRoomError) -> Self {
        match e {
            CloseRoomError::UnknownRoom(_) => Self::new(StatusCode::NOT_FOUND, "Room not found"),
            CloseRoomError::Denied(PlaybackError::NotHost(_)) => {
                Self::new(StatusCode::FORBIDDEN, "Only the host can close the room")
            }
            CloseRoomError::Denied(PlaybackError::RoomClosed) => {
                Self::new(StatusCode::BAD_REQUEST, "Room is already closed")
            }
            CloseRoomError::Store(_) => Self::internal(e),
        }
    }
}

fn parse_room_id(raw: String) -> Result<RoomId, ApiError> {
    RoomId::try_from(raw).map_err(|_| ApiError::new(StatusCode::NOT_FOUND, "Room not found"))
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a room hosted by the caller
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomRecordDto>), ApiError> {
    let record = state
        .create_room_usecase
        .execute(user_id, body.password)
        .await?;
    Ok((StatusCode::CREATED, Json(RoomRecordDto::from(&record))))
}

/// Enter a room with its password (records participation)
pub async fn enter_room(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<JoinRoomRequest>,
) -> Result<Json<RoomRecordDto>, ApiError> {
    let room_id = parse_room_id(body.room_id)?;
    let record = state
        .enter_room_usecase
        .execute(&user_id, &room_id, &body.password)
        .await?;
    Ok(Json(RoomRecordDto::from(&record)))
}

/// Active rooms the caller hosts or participates in, newest first
pub async fn my_rooms(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<RoomRecordDto>>, ApiError> {
    let rooms = state
        .list_user_rooms_usecase
        .execute(&user_id)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(rooms.iter().map(RoomRecordDto::from).collect()))
}

/// Live state of a room
pub async fn get_room_state(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    Path(room_id): Path<String>,
) -> Result<Json<RoomStateDto>, ApiError> {
    let room_id = parse_room_id(room_id)?;
    let snapshot = state
        .get_room_state_usecase
        .execute(&room_id)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Room not found"))?;
    Ok(Json(RoomStateDto::from(&snapshot)))
}

/// Close a room (host only)
pub async fn close_room(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(room_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let room_id = parse_room_id(room_id)?;
    state.close_room_usecase.execute(&room_id, &user_id).await?;
    Ok(Json(MessageResponse {
        message: "Room closed".to_string(),
    }))
}
