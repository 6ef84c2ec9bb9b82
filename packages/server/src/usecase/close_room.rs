//! UseCase: room のクローズ
//!
//! WebSocket の `close-room` と HTTP の close の両方から使われる。
//!
//! 1. critical section 内で Closed に遷移し、送信者を含む全員に `room-closed` を配信
//! 2. room の購読をすべて解除
//! 3. room record を inactive にする（失敗してもログのみ）
//! 4. live state を削除（冪等）
//!
//! The closed state stays in the store until the record is marked, so a
//! concurrent join sees `Closed` instead of rehydrating the room.

use std::sync::Arc;

use watchroom_shared::time::Clock;

use crate::domain::{
    EventDispatcher, PlaybackError, RoomEvent, RoomId, RoomRecordStore, RoomStateRepository,
    Timestamp, UserId, lock_room,
};

use super::error::CloseRoomError;

/// クローズのユースケース
pub struct CloseRoomUseCase {
    repository: Arc<dyn RoomStateRepository>,
    store: Arc<dyn RoomRecordStore>,
    dispatcher: Arc<dyn EventDispatcher>,
    clock: Arc<dyn Clock>,
}

impl CloseRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomStateRepository>,
        store: Arc<dyn RoomRecordStore>,
        dispatcher: Arc<dyn EventDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            store,
            dispatcher,
            clock,
        }
    }

    pub async fn execute(&self, room_id: &RoomId, actor: &UserId) -> Result<(), CloseRoomError> {
        match self.repository.get(room_id) {
            Some(handle) => {
                let mut state = lock_room(&handle);
                state.close(actor)?;
                self.dispatcher.to_room(room_id, &RoomEvent::RoomClosed);
                tracing::info!("Room '{}' closed by host '{}'", room_id, actor);
            }
            None => self.authorize_dormant(room_id, actor).await?,
        }

        self.dispatcher.clear_room(room_id);
        let now = Timestamp::new(self.clock.now_millis());
        if let Err(e) = self.store.mark_room_closed(room_id, now).await {
            tracing::warn!("Failed to mark room '{}' closed in store: {}", room_id, e);
        }
        self.repository.remove(room_id);

        Ok(())
    }

    /// A room with no live state (nobody joined since a restart) can still be
    /// closed by its host through the record.
    async fn authorize_dormant(&self, room_id: &RoomId, actor: &UserId) -> Result<(), CloseRoomError> {
        match self.store.resolve_room_by_public_id(room_id).await? {
            Some(record) if !record.is_active => Err(PlaybackError::RoomClosed.into()),
            Some(record) if &record.host_id != actor => {
                Err(PlaybackError::NotHost(actor.as_str().to_string()).into())
            }
            Some(_) => Ok(()),
            None => Err(CloseRoomError::UnknownRoom(room_id.as_str().to_string())),
        }
    }
}
