//! UseCase: 再生操作（Playback Authority Controller）
//!
//! play / pause / seek / watch-start はホストだけが実行できる。
//! 状態の更新と配信は同じ critical section 内で行うため、
//! 同じ room への同時操作でも配信順は状態遷移の順と一致する。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, EventDispatcher, Media, MovieId, PlaybackCommand, PlaybackError,
    PlaybackPosition, RoomEvent, RoomId, RoomStateRepository, UserId, VideoUrl, lock_room,
};

use super::{close_room::CloseRoomUseCase, error::CloseRoomError, error::PlaybackControlError};

/// 再生操作のユースケース
pub struct PlaybackControlUseCase {
    repository: Arc<dyn RoomStateRepository>,
    dispatcher: Arc<dyn EventDispatcher>,
    close_room: Arc<CloseRoomUseCase>,
}

impl PlaybackControlUseCase {
    pub fn new(
        repository: Arc<dyn RoomStateRepository>,
        dispatcher: Arc<dyn EventDispatcher>,
        close_room: Arc<CloseRoomUseCase>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            close_room,
        }
    }

    pub fn play(
        &self,
        room_id: &RoomId,
        actor: &UserId,
        sender: &ConnectionId,
        current_time: PlaybackPosition,
    ) -> Result<RoomEvent, PlaybackControlError> {
        self.command(room_id, actor, sender, PlaybackCommand::Play(current_time))
    }

    pub fn pause(
        &self,
        room_id: &RoomId,
        actor: &UserId,
        sender: &ConnectionId,
        current_time: PlaybackPosition,
    ) -> Result<RoomEvent, PlaybackControlError> {
        self.command(room_id, actor, sender, PlaybackCommand::Pause(current_time))
    }

    pub fn seek(
        &self,
        room_id: &RoomId,
        actor: &UserId,
        sender: &ConnectionId,
        current_time: PlaybackPosition,
    ) -> Result<RoomEvent, PlaybackControlError> {
        self.command(room_id, actor, sender, PlaybackCommand::Seek(current_time))
    }

    /// `watch-start`: load or replace the room's media.
    pub fn load_media(
        &self,
        room_id: &RoomId,
        actor: &UserId,
        sender: &ConnectionId,
        movie_id: MovieId,
        video_url: VideoUrl,
    ) -> Result<RoomEvent, PlaybackControlError> {
        self.command(
            room_id,
            actor,
            sender,
            PlaybackCommand::LoadMedia(Media {
                movie_id,
                video_url,
            }),
        )
    }

    /// `watch-end`: relayed to the other members of a live room.
    ///
    /// Not host-gated and mutates nothing. Clients treat it as a hint.
    pub fn end_media(
        &self,
        room_id: &RoomId,
        actor: &UserId,
        sender: &ConnectionId,
    ) -> Result<RoomEvent, PlaybackControlError> {
        let handle = self
            .repository
            .get(room_id)
            .ok_or_else(|| PlaybackControlError::UnknownRoom(room_id.as_str().to_string()))?;
        let state = lock_room(&handle);
        if state.is_closed() {
            return Err(PlaybackError::RoomClosed.into());
        }
        let event = RoomEvent::WatchEnd;
        self.dispatcher.to_room_except(room_id, sender, &event);
        tracing::debug!("'watch-end' from '{}' relayed in room '{}'", actor, room_id);
        Ok(event)
    }

    /// Host-only close, shared with the HTTP close endpoint.
    pub async fn close(&self, room_id: &RoomId, actor: &UserId) -> Result<(), CloseRoomError> {
        self.close_room.execute(room_id, actor).await
    }

    fn command(
        &self,
        room_id: &RoomId,
        actor: &UserId,
        sender: &ConnectionId,
        command: PlaybackCommand,
    ) -> Result<RoomEvent, PlaybackControlError> {
        let handle = self
            .repository
            .get(room_id)
            .ok_or_else(|| PlaybackControlError::UnknownRoom(room_id.as_str().to_string()))?;

        let mut state = lock_room(&handle);
        let event = state.apply(actor, command)?;
        let delivered = self.dispatcher.to_room_except(room_id, sender, &event);
        tracing::debug!(
            "'{}' by host '{}' in room '{}' delivered to {} connection(s)",
            event.name(),
            actor,
            room_id,
            delivered
        );
        Ok(event)
    }
}
