//! UseCase: 自分の room 一覧（CRUD 層）

use std::sync::Arc;

use crate::domain::{RoomRecord, RoomRecordStore, StoreError, UserId};

/// ホスト中・参加中の有効な room を新しい順に返すユースケース
pub struct ListUserRoomsUseCase {
    store: Arc<dyn RoomRecordStore>,
}

impl ListUserRoomsUseCase {
    pub fn new(store: Arc<dyn RoomRecordStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, user_id: &UserId) -> Result<Vec<RoomRecord>, StoreError> {
        self.store.rooms_of_user(user_id).await
    }
}
