//! UseCase: 接続切断時の後片付け
//!
//! 明示的な leave が無くても、切断された接続に紐づく roster エントリを削除する。
//! 参加履歴（participation record）には触れない。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, EventDispatcher, Participant, RoomEvent, RoomId, RoomStateRepository,
    lock_room,
};

/// 切断のユースケース
pub struct DisconnectUseCase {
    repository: Arc<dyn RoomStateRepository>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl DisconnectUseCase {
    pub fn new(
        repository: Arc<dyn RoomStateRepository>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// 切断処理を実行
    ///
    /// # Returns
    ///
    /// Every roster entry removed, with the room it was removed from.
    pub fn execute(&self, connection_id: &ConnectionId) -> Vec<(RoomId, Participant)> {
        let rooms = self.dispatcher.unregister_connection(connection_id);

        let mut removed = Vec::new();
        for room_id in rooms {
            let Some(handle) = self.repository.get(&room_id) else {
                continue;
            };
            let mut state = lock_room(&handle);
            for participant in state.remove_connection(connection_id) {
                self.dispatcher.to_room(
                    &room_id,
                    &RoomEvent::UserLeft {
                        user_id: participant.user_id.clone(),
                        username: participant.username.clone(),
                    },
                );
                tracing::info!(
                    "User '{}' dropped from room '{}' on disconnect",
                    participant.user_id,
                    room_id
                );
                removed.push((room_id.clone(), participant));
            }
        }

        tracing::debug!(
            "Connection '{}' cleaned up ({} roster entries removed)",
            connection_id,
            removed.len()
        );
        removed
    }
}
