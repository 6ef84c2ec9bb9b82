//! UseCase: room の作成（CRUD 層）
//!
//! 作成者をホストとして room record を作り、同じ hostId で live state を用意する。

use std::sync::Arc;

use watchroom_shared::time::Clock;

use crate::domain::{
    RoomIdFactory, RoomRecord, RoomRecordStore, RoomState, RoomStateRepository, Timestamp,
    UserId,
};

use super::error::CreateRoomError;

/// room 作成のユースケース
pub struct CreateRoomUseCase {
    repository: Arc<dyn RoomStateRepository>,
    store: Arc<dyn RoomRecordStore>,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomStateRepository>,
        store: Arc<dyn RoomRecordStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            store,
            clock,
        }
    }

    pub async fn execute(
        &self,
        host_id: UserId,
        password: String,
    ) -> Result<RoomRecord, CreateRoomError> {
        if password.trim().is_empty() {
            return Err(CreateRoomError::EmptyPassword);
        }

        let room_id = RoomIdFactory::generate();
        let now = Timestamp::new(self.clock.now_millis());
        let record = self
            .store
            .create_room(room_id, host_id, password, now)
            .await?;

        self.repository.create(RoomState::from_record(&record));
        tracing::info!(
            "Room '{}' created by host '{}'",
            record.room_id,
            record.host_id
        );

        Ok(record)
    }
}
