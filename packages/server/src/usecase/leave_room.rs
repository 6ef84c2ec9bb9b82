//! UseCase: room からの退出（Room Session Manager の leave）

use std::sync::Arc;

use watchroom_shared::time::Clock;

use crate::domain::{
    ConnectionId, EventDispatcher, Participant, RoomEvent, RoomId, RoomRecordStore,
    RoomStateRepository, Timestamp, UserId, Username, lock_room,
};

/// 退出のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomStateRepository>,
    store: Arc<dyn RoomRecordStore>,
    dispatcher: Arc<dyn EventDispatcher>,
    clock: Arc<dyn Clock>,
}

impl LeaveRoomUseCase {
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

    /// 退出を実行
    ///
    /// The roster entry is removed and `user-left` is sent to the remaining
    /// members before the participation record is touched. A failing store
    /// call is only logged.
    ///
    /// # Returns
    ///
    /// The removed roster entry, or `None` when the user was not attached.
    pub async fn execute(
        &self,
        room_id: RoomId,
        user_id: UserId,
        username: Username,
        connection_id: ConnectionId,
    ) -> Option<Participant> {
        self.dispatcher.unsubscribe(&room_id, &connection_id);

        let removed = match self.repository.get(&room_id) {
            Some(handle) => {
                let mut state = lock_room(&handle);
                let removed = state.remove_participant(&user_id);
                if let Some(participant) = &removed {
                    // The entry may be bound to another of the user's connections.
                    if participant.connection_id != connection_id {
                        self.dispatcher
                            .unsubscribe(&room_id, &participant.connection_id);
                    }
                    self.dispatcher.to_room(
                        &room_id,
                        &RoomEvent::UserLeft {
                            user_id: user_id.clone(),
                            username,
                        },
                    );
                    tracing::info!("User '{}' left room '{}'", user_id, room_id);
                } else {
                    // No user-left for a user who is not on the roster.
                    tracing::debug!("Leave from '{}' who is not in room '{}'", user_id, room_id);
                }
                removed
            }
            None => {
                tracing::debug!("Leave for room '{}' which is not live", room_id);
                None
            }
        };

        let now = Timestamp::new(self.clock.now_millis());
        match self.store.record_participation_end(&user_id, now).await {
            Ok(closed) => {
                tracing::debug!("Closed {} participation(s) of '{}'", closed, user_id);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to record participation end of '{}' (room '{}'): {}",
                    user_id,
                    room_id,
                    e
                );
            }
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::{
        domain::{MockRoomRecordStore, StoreError},
        infrastructure::dispatcher::WebSocketEventDispatcher,
        usecase::{
            JoinRoomUseCase,
            test_support::{Delivery, NOW, RecordingDispatcher, clock, name, room, seeded, user},
        },
    };

    #[tokio::test]
    async fn test_leave_removes_entry_and_notifies_remaining() {
        // テスト項目: 退出で roster から削除され、残りの参加者に user-left が届き、参加履歴が閉じられる
        // given (前提条件):
        let (store, repository, record) = seeded("abc123", "U1").await;
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let join = JoinRoomUseCase::new(repository.clone(), store.clone(), dispatcher.clone());
        let leave =
            LeaveRoomUseCase::new(repository.clone(), store.clone(), dispatcher.clone(), clock());
        let bob_conn = ConnectionId::generate();
        join.execute(room("abc123"), user("U2"), name("bob"), bob_conn)
            .await
            .unwrap();
        store
            .record_participation_start(record.id, &user("U2"), Timestamp::new(NOW))
            .await
            .unwrap();

        // when (操作):
        let removed = leave
            .execute(room("abc123"), user("U2"), name("bob"), bob_conn)
            .await;

        // then (期待する結果):
        assert_eq!(removed.map(|p| p.user_id), Some(user("U2")));
        let handle = repository.get(&room("abc123")).unwrap();
        assert!(lock_room(&handle).participants().is_empty());
        assert!(!dispatcher.is_subscribed(&room("abc123"), &bob_conn));
        assert_eq!(
            dispatcher.deliveries().last(),
            Some(&Delivery::Room {
                room_id: room("abc123"),
                event: RoomEvent::UserLeft {
                    user_id: user("U2"),
                    username: name("bob"),
                },
            })
        );
        let participations = store.participations().await;
        assert_eq!(participations[0].left_at, Some(Timestamp::new(NOW)));
    }

    #[tokio::test]
    async fn test_leave_from_another_connection_unsubscribes_bound_connection() {
        // テスト項目: 別の接続から退出しても、roster に紐づいていた接続は room の配信から外れる
        // given (前提条件): U2 は接続 C1 で参加し、C2 からも接続している
        let (store, repository, _) = seeded("abc123", "U1").await;
        let dispatcher = Arc::new(WebSocketEventDispatcher::new());
        let join = JoinRoomUseCase::new(repository.clone(), store.clone(), dispatcher.clone());
        let leave =
            LeaveRoomUseCase::new(repository.clone(), store.clone(), dispatcher.clone(), clock());
        let (c1_tx, mut c1_rx) = mpsc::unbounded_channel();
        let (c2_tx, _c2_rx) = mpsc::unbounded_channel();
        let c1 = ConnectionId::generate();
        let c2 = ConnectionId::generate();
        dispatcher.register_connection(c1, c1_tx);
        dispatcher.register_connection(c2, c2_tx);
        join.execute(room("abc123"), user("U2"), name("bob"), c1)
            .await
            .unwrap();
        while c1_rx.try_recv().is_ok() {}

        // when (操作): C2 から leave-room
        let removed = leave
            .execute(room("abc123"), user("U2"), name("bob"), c2)
            .await;

        // then (期待する結果): C1 は購読解除され、自分の user-left も後続の配信も受け取らない
        assert_eq!(removed.map(|p| p.connection_id), Some(c1));
        let handle = repository.get(&room("abc123")).unwrap();
        assert!(lock_room(&handle).participants().is_empty());
        assert_eq!(dispatcher.subscriber_count(&room("abc123")), 0);
        assert_eq!(dispatcher.to_room(&room("abc123"), &RoomEvent::WatchEnd), 0);
        assert!(c1_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_leave_absent_user_is_noop() {
        // テスト項目: roster にいないユーザーの退出は何も配信しない
        // given (前提条件):
        let (store, repository, _) = seeded("abc123", "U1").await;
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let leave = LeaveRoomUseCase::new(repository, store, dispatcher.clone(), clock());

        // when (操作):
        let removed = leave
            .execute(room("abc123"), user("U9"), name("ghost"), ConnectionId::generate())
            .await;

        // then (期待する結果):
        assert!(removed.is_none());
        assert!(dispatcher.deliveries().is_empty());
    }

    #[tokio::test]
    async fn test_leave_tolerates_store_failure() {
        // テスト項目: 参加履歴の更新に失敗しても roster の削除と user-left 配信は行われる
        // given (前提条件):
        let (_, repository, _) = seeded("abc123", "U1").await;
        let mut store = MockRoomRecordStore::new();
        store
            .expect_record_participation_end()
            .times(1)
            .returning(|_, _| Err(StoreError::Backend("connection reset".to_string())));
        let store: Arc<dyn RoomRecordStore> = Arc::new(store);
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let handle = repository.get(&room("abc123")).unwrap();
        let bob_conn = ConnectionId::generate();
        lock_room(&handle).upsert_participant(Participant::new(user("U2"), name("bob"), bob_conn));
        let leave = LeaveRoomUseCase::new(repository, store, dispatcher.clone(), clock());

        // when (操作):
        let removed = leave
            .execute(room("abc123"), user("U2"), name("bob"), bob_conn)
            .await;

        // then (期待する結果):
        assert!(removed.is_some());
        assert!(lock_room(&handle).participants().is_empty());
        assert_eq!(dispatcher.deliveries().len(), 1);
    }
}
