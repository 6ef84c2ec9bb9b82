//! UseCase: chat / reaction / gift の中継（Activity Relay）
//!
//! 1. room の durable ID を collaborator store で解決
//! 2. 記録を永続化
//! 3. サーバー時刻を付けて送信者を含む全員に配信
//!
//! 永続化に失敗した場合は配信しない。

use std::sync::Arc;

use watchroom_shared::time::Clock;

use crate::domain::{
    Emoji, EventDispatcher, GiftType, MessageContent, RoomEvent, RoomId, RoomRecordStore,
    Timestamp, UserId, Username,
};

use super::error::ActivityError;

/// Ephemeral room activity.
#[derive(Debug, Clone, PartialEq)]
pub enum Activity {
    Chat(MessageContent),
    Reaction(Emoji),
    Gift(GiftType),
}

/// 中継のユースケース
pub struct RelayActivityUseCase {
    store: Arc<dyn RoomRecordStore>,
    dispatcher: Arc<dyn EventDispatcher>,
    clock: Arc<dyn Clock>,
}

impl RelayActivityUseCase {
    pub fn new(
        store: Arc<dyn RoomRecordStore>,
        dispatcher: Arc<dyn EventDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            clock,
        }
    }

    pub async fn execute(
        &self,
        room_id: &RoomId,
        user_id: UserId,
        username: Username,
        activity: Activity,
    ) -> Result<RoomEvent, ActivityError> {
        let record = match self.store.resolve_room_by_public_id(room_id).await? {
            Some(record) if record.is_active => record,
            _ => return Err(ActivityError::UnknownRoom(room_id.as_str().to_string())),
        };

        match &activity {
            Activity::Chat(message) => {
                self.store
                    .create_message(record.id, &user_id, message)
                    .await?
            }
            Activity::Reaction(emoji) => {
                self.store
                    .create_reaction(record.id, &user_id, emoji)
                    .await?
            }
            Activity::Gift(gift_type) => {
                self.store
                    .create_gift(record.id, &user_id, gift_type)
                    .await?
            }
        }

        let timestamp = Timestamp::new(self.clock.now_millis());
        let event = match activity {
            Activity::Chat(message) => RoomEvent::ChatMessage {
                user_id,
                username,
                message,
                timestamp,
            },
            Activity::Reaction(emoji) => RoomEvent::Reaction {
                user_id,
                username,
                emoji,
                timestamp,
            },
            Activity::Gift(gift_type) => RoomEvent::Gift {
                user_id,
                username,
                gift_type,
                timestamp,
            },
        };

        let delivered = self.dispatcher.to_room(room_id, &event);
        tracing::debug!(
            "'{}' in room '{}' delivered to {} connection(s)",
            event.name(),
            room_id,
            delivered
        );
        Ok(event)
    }
}
