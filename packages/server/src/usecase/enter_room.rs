//! UseCase: パスワード付き入室（CRUD 層）
//!
//! room の存在・有効性・パスワードを確認し、参加履歴の開始を記録する。
//! live state には触れない（WebSocket の join-room が担当）。

use std::sync::Arc;

use watchroom_shared::time::Clock;

use crate::domain::{RoomId, RoomRecord, RoomRecordStore, Timestamp, UserId};

use super::error::EnterRoomError;

/// 入室のユースケース
pub struct EnterRoomUseCase {
    store: Arc<dyn RoomRecordStore>,
    clock: Arc<dyn Clock>,
}

impl EnterRoomUseCase {
    pub fn new(store: Arc<dyn RoomRecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn execute(
        &self,
        user_id: &UserId,
        room_id: &RoomId,
        password: &str,
    ) -> Result<RoomRecord, EnterRoomError> {
        let record = self
            .store
            .resolve_room_by_public_id(room_id)
            .await?
            .ok_or_else(|| EnterRoomError::NotFound(room_id.as_str().to_string()))?;

        if !record.is_active {
            return Err(EnterRoomError::Inactive(room_id.as_str().to_string()));
        }
        if !record.password_matches(password) {
            tracing::debug!("Wrong password for room '{}' from '{}'", room_id, user_id);
            return Err(EnterRoomError::WrongPassword);
        }

        let now = Timestamp::new(self.clock.now_millis());
        self.store
            .record_participation_start(record.id, user_id, now)
            .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::repository::InMemoryRoomRecordStore,
        usecase::test_support::{NOW, clock, room, user},
    };

    async fn store_with_room() -> Arc<InMemoryRoomRecordStore> {
        let store = Arc::new(InMemoryRoomRecordStore::new());
        store
            .create_room(room("abc123"), user("U1"), "secret".to_string(), Timestamp::new(NOW))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_enter_records_participation() {
        // テスト項目: 正しいパスワードで入室すると参加履歴が記録される
        // given (前提条件):
        let store = store_with_room().await;
        let usecase = EnterRoomUseCase::new(store.clone(), clock());

        // when (操作):
        let record = usecase
            .execute(&user("U2"), &room("abc123"), "secret")
            .await
            .unwrap();

        // then (期待する結果):
        let participations = store.participations().await;
        assert_eq!(participations.len(), 1);
        assert_eq!(participations[0].room, record.id);
        assert_eq!(participations[0].user_id, user("U2"));
        assert_eq!(participations[0].left_at, None);
    }

    #[tokio::test]
    async fn test_enter_failures() {
        // テスト項目: 存在しない room / 誤ったパスワード / 閉じた room はそれぞれのエラーになる
        // given (前提条件):
        let store = store_with_room().await;
        let usecase = EnterRoomUseCase::new(store.clone(), clock());

        // when (操作) / then (期待する結果):
        assert_eq!(
            usecase.execute(&user("U2"), &room("nope"), "secret").await,
            Err(EnterRoomError::NotFound("nope".to_string()))
        );
        assert_eq!(
            usecase.execute(&user("U2"), &room("abc123"), "guess").await,
            Err(EnterRoomError::WrongPassword)
        );
        store
            .mark_room_closed(&room("abc123"), Timestamp::new(NOW))
            .await
            .unwrap();
        assert_eq!(
            usecase.execute(&user("U2"), &room("abc123"), "secret").await,
            Err(EnterRoomError::Inactive("abc123".to_string()))
        );
        assert!(store.participations().await.is_empty());
    }
}
