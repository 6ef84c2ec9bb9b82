//! UseCase: room への参加（Room Session Manager の join）
//!
//! - live state が無ければ collaborator store の room record から再生成する
//! - 同じユーザーの再参加は roster を更新するだけ（重複エントリを作らない）
//! - 他の参加者へ `user-joined`、参加者本人へ `room-state` を送る

use std::sync::Arc;

use crate::domain::{
    ConnectionId, EventDispatcher, Participant, RoomEvent, RoomHandle, RoomId, RoomRecordStore,
    RoomState, RoomStateRepository, UserId, Username, lock_room,
};

use super::error::JoinError;

/// 参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomStateRepository>,
    store: Arc<dyn RoomRecordStore>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomStateRepository>,
        store: Arc<dyn RoomRecordStore>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            repository,
            store,
            dispatcher,
        }
    }

    /// 参加を実行し、参加直後の RoomState のスナップショットを返す
    pub async fn execute(
        &self,
        room_id: RoomId,
        user_id: UserId,
        username: Username,
        connection_id: ConnectionId,
    ) -> Result<RoomState, JoinError> {
        let handle = self.live_or_rehydrate(&room_id).await?;

        let mut state = lock_room(&handle);
        if state.is_closed() {
            return Err(JoinError::RoomClosed(room_id.into_string()));
        }

        self.dispatcher.subscribe(&room_id, &connection_id);
        let previous = state.upsert_participant(Participant::new(
            user_id.clone(),
            username.clone(),
            connection_id,
        ));
        match previous {
            Some(old) if old != connection_id => {
                // rejoin from a new connection: the old one stops receiving this room
                self.dispatcher.unsubscribe(&room_id, &old);
                tracing::info!(
                    "User '{}' rebound in room '{}' ({} -> {})",
                    user_id,
                    room_id,
                    old,
                    connection_id
                );
            }
            Some(_) => {
                tracing::debug!("User '{}' re-sent join for room '{}'", user_id, room_id);
            }
            None => {
                tracing::info!("User '{}' joined room '{}'", user_id, room_id);
            }
        }

        let snapshot = state.clone();
        self.dispatcher.to_room_except(
            &room_id,
            &connection_id,
            &RoomEvent::UserJoined { user_id, username },
        );
        if let Err(e) = self
            .dispatcher
            .to_sender(&connection_id, &RoomEvent::RoomState(snapshot.clone()))
        {
            tracing::warn!("Failed to send room-state to '{}': {}", connection_id, e);
        }

        Ok(snapshot)
    }

    async fn live_or_rehydrate(&self, room_id: &RoomId) -> Result<RoomHandle, JoinError> {
        if let Some(handle) = self.repository.get(room_id) {
            return Ok(handle);
        }

        match self.store.resolve_room_by_public_id(room_id).await? {
            Some(record) if record.is_active => {
                tracing::info!(
                    "Rehydrating room '{}' from its record (host '{}')",
                    room_id,
                    record.host_id
                );
                Ok(self.repository.get_or_insert(RoomState::from_record(&record)))
            }
            Some(_) => Err(JoinError::RoomClosed(room_id.as_str().to_string())),
            None => Err(JoinError::UnknownRoom(room_id.as_str().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockRoomRecordStore, RoomRecord, RoomRecordId, StoreError, Timestamp},
        infrastructure::repository::{InMemoryRoomRecordStore, InMemoryRoomStateRepository},
        usecase::test_support::{Delivery, NOW, RecordingDispatcher, name, room, seeded, user},
    };

    #[tokio::test]
    async fn test_join_broadcasts_to_others_and_snapshots_joiner() {
        // テスト項目: 参加者本人には room-state、他の参加者には user-joined が届く
        // given (前提条件):
        let (store, repository, _) = seeded("abc123", "U1").await;
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let usecase = JoinRoomUseCase::new(repository, store, dispatcher.clone());
        let bob_conn = ConnectionId::generate();

        // when (操作):
        let snapshot = usecase
            .execute(room("abc123"), user("U2"), name("bob"), bob_conn)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.participants().len(), 1);
        assert_eq!(snapshot.host_id(), &user("U1"));
        assert!(dispatcher.is_subscribed(&room("abc123"), &bob_conn));
        assert_eq!(
            dispatcher.deliveries(),
            vec![
                Delivery::RoomExcept {
                    room_id: room("abc123"),
                    sender: bob_conn,
                    event: RoomEvent::UserJoined {
                        user_id: user("U2"),
                        username: name("bob"),
                    },
                },
                Delivery::Sender {
                    connection_id: bob_conn,
                    event: RoomEvent::RoomState(snapshot.clone()),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_join_is_idempotent_per_user() {
        // テスト項目: 同じユーザーが再参加しても roster のエントリは 1 つだけ
        // given (前提条件):
        let (store, repository, _) = seeded("abc123", "U1").await;
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let usecase = JoinRoomUseCase::new(repository.clone(), store, dispatcher.clone());
        let first = ConnectionId::generate();
        let second = ConnectionId::generate();

        // when (操作): 同一接続で 2 回、新しい接続で 1 回参加する
        usecase
            .execute(room("abc123"), user("U2"), name("bob"), first)
            .await
            .unwrap();
        usecase
            .execute(room("abc123"), user("U2"), name("bob"), first)
            .await
            .unwrap();
        let snapshot = usecase
            .execute(room("abc123"), user("U2"), name("bobby"), second)
            .await
            .unwrap();

        // then (期待する結果): 最新の接続と名前に更新され、古い接続は購読解除される
        assert_eq!(snapshot.participants().len(), 1);
        let entry = snapshot.participant(&user("U2")).unwrap();
        assert_eq!(entry.connection_id, second);
        assert_eq!(entry.username, name("bobby"));
        assert!(!dispatcher.is_subscribed(&room("abc123"), &first));
        assert!(dispatcher.is_subscribed(&room("abc123"), &second));
    }

    #[tokio::test]
    async fn test_join_rehydrates_from_record() {
        // テスト項目: live state が無い場合、room record の hostId で再生成される
        // given (前提条件): record はあるが live state は無い（再起動後）
        let store = Arc::new(InMemoryRoomRecordStore::new());
        store
            .create_room(room("abc123"), user("U1"), "pw".to_string(), Timestamp::new(NOW))
            .await
            .unwrap();
        let repository = Arc::new(InMemoryRoomStateRepository::new());
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let usecase = JoinRoomUseCase::new(repository.clone(), store, dispatcher);

        // when (操作):
        let snapshot = usecase
            .execute(room("abc123"), user("U2"), name("bob"), ConnectionId::generate())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.host_id(), &user("U1"));
        assert!(!snapshot.is_playing());
        assert!(repository.get(&room("abc123")).is_some());
    }

    #[tokio::test]
    async fn test_join_unknown_room_is_dropped() {
        // テスト項目: 存在しない room への参加は状態を作らず、何も配信しない
        // given (前提条件):
        let store = Arc::new(InMemoryRoomRecordStore::new());
        let repository = Arc::new(InMemoryRoomStateRepository::new());
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let usecase = JoinRoomUseCase::new(repository.clone(), store, dispatcher.clone());

        // when (操作):
        let result = usecase
            .execute(room("nope"), user("U2"), name("bob"), ConnectionId::generate())
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinError::UnknownRoom("nope".to_string())));
        assert!(repository.room_ids().is_empty());
        assert!(dispatcher.deliveries().is_empty());
    }

    #[tokio::test]
    async fn test_join_inactive_record_is_not_rehydrated() {
        // テスト項目: 閉じられた room の record からは再生成しない
        // given (前提条件):
        let mut store = MockRoomRecordStore::new();
        store.expect_resolve_room_by_public_id().returning(|_| {
            Ok(Some(RoomRecord {
                id: RoomRecordId(1),
                room_id: RoomId::new("abc123".to_string()).unwrap(),
                host_id: UserId::new("U1".to_string()).unwrap(),
                password: "pw".to_string(),
                is_active: false,
                created_at: Timestamp::new(NOW),
                closed_at: Some(Timestamp::new(NOW + 1)),
            }))
        });
        let repository = Arc::new(InMemoryRoomStateRepository::new());
        let usecase = JoinRoomUseCase::new(
            repository.clone(),
            Arc::new(store),
            Arc::new(RecordingDispatcher::default()),
        );

        // when (操作):
        let result = usecase
            .execute(room("abc123"), user("U2"), name("bob"), ConnectionId::generate())
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinError::RoomClosed("abc123".to_string())));
        assert!(repository.get(&room("abc123")).is_none());
    }

    #[tokio::test]
    async fn test_join_store_failure_surfaces() {
        // テスト項目: record の解決に失敗した場合は Store エラー
        let mut store = MockRoomRecordStore::new();
        store
            .expect_resolve_room_by_public_id()
            .returning(|_| Err(StoreError::Timeout(3000)));
        let usecase = JoinRoomUseCase::new(
            Arc::new(InMemoryRoomStateRepository::new()),
            Arc::new(store),
            Arc::new(RecordingDispatcher::default()),
        );

        let result = usecase
            .execute(room("abc123"), user("U2"), name("bob"), ConnectionId::generate())
            .await;

        assert_eq!(result, Err(JoinError::Store(StoreError::Timeout(3000))));
    }
}
