//! UseCase: live state の参照

use std::sync::Arc;

use crate::domain::{RoomId, RoomState, RoomStateRepository, lock_room};

/// live state 参照のユースケース
pub struct GetRoomStateUseCase {
    repository: Arc<dyn RoomStateRepository>,
}

impl GetRoomStateUseCase {
    pub fn new(repository: Arc<dyn RoomStateRepository>) -> Self {
        Self { repository }
    }

    /// Snapshot of a live room. A room being torn down counts as unknown.
    pub fn execute(&self, room_id: &RoomId) -> Option<RoomState> {
        let handle = self.repository.get(room_id)?;
        let state = lock_room(&handle);
        (!state.is_closed()).then(|| state.clone())
    }
}
