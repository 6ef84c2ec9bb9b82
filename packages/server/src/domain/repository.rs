//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! - `RoomStateRepository`: live room state, in memory, one lock per room
//! - `RoomRecordStore`: the durable collaborator store (room records,
//!   participation history, chat/reaction/gift records)

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{
    entity::{RoomRecord, RoomState},
    error::StoreError,
    value_object::{Emoji, GiftType, MessageContent, RoomId, RoomRecordId, Timestamp, UserId},
};

/// Shared handle to one room's state. Locking it is the room's critical section.
pub type RoomHandle = Arc<Mutex<RoomState>>;

/// Enter a room's critical section.
///
/// The guarded sections never panic midway through a mutation, so a poisoned
/// lock still holds a consistent state and is recovered.
pub fn lock_room(handle: &RoomHandle) -> MutexGuard<'_, RoomState> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Room State Store.
///
/// Sole owner of every live `RoomState`. Callers hold a [`RoomHandle`] only
/// for the duration of one operation and always look rooms up by id.
pub trait RoomStateRepository: Send + Sync {
    /// Insert a new room, replacing any previous state under the same id.
    fn create(&self, state: RoomState) -> RoomHandle;

    /// Return the existing room, or insert `state` if the id is vacant.
    fn get_or_insert(&self, state: RoomState) -> RoomHandle;

    fn get(&self, room_id: &RoomId) -> Option<RoomHandle>;

    /// Remove a room. Idempotent.
    fn remove(&self, room_id: &RoomId) -> Option<RoomHandle>;

    fn room_ids(&self) -> Vec<RoomId>;
}

/// Collaborator persistence store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRecordStore: Send + Sync {
    async fn resolve_room_by_public_id(
        &self,
        room_id: &RoomId,
    ) -> Result<Option<RoomRecord>, StoreError>;

    async fn create_room(
        &self,
        room_id: RoomId,
        host_id: UserId,
        password: String,
        now: Timestamp,
    ) -> Result<RoomRecord, StoreError>;

    async fn mark_room_closed(&self, room_id: &RoomId, now: Timestamp) -> Result<(), StoreError>;

    /// Active rooms hosted by `user_id` or with an open participation of
    /// `user_id`, newest first.
    async fn rooms_of_user(&self, user_id: &UserId) -> Result<Vec<RoomRecord>, StoreError>;

    async fn record_participation_start(
        &self,
        record_id: RoomRecordId,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<(), StoreError>;

    /// Close every open participation of `user_id`. Returns how many were closed.
    async fn record_participation_end(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<u64, StoreError>;

    async fn create_message(
        &self,
        record_id: RoomRecordId,
        user_id: &UserId,
        content: &MessageContent,
    ) -> Result<(), StoreError>;

    async fn create_reaction(
        &self,
        record_id: RoomRecordId,
        user_id: &UserId,
        emoji: &Emoji,
    ) -> Result<(), StoreError>;

    async fn create_gift(
        &self,
        record_id: RoomRecordId,
        user_id: &UserId,
        gift_type: &GiftType,
    ) -> Result<(), StoreError>;
}
