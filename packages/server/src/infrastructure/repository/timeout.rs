//! Bounded collaborator store calls.
//!
//! Wraps any `RoomRecordStore` so a slow backend surfaces as
//! `StoreError::Timeout` instead of stalling the connection task that
//! issued the call.

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::domain::{
    Emoji, GiftType, MessageContent, RoomId, RoomRecord, RoomRecordId, RoomRecordStore,
    StoreError, Timestamp, UserId,
};

pub struct TimeoutRoomRecordStore {
    inner: Arc<dyn RoomRecordStore>,
    timeout: Duration,
}

impl TimeoutRoomRecordStore {
    pub fn new(inner: Arc<dyn RoomRecordStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StoreError>> + Send,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                let millis = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!("Store call '{}' timed out after {} ms", operation, millis);
                Err(StoreError::Timeout(millis))
            }
        }
    }
}

#[async_trait]
impl RoomRecordStore for TimeoutRoomRecordStore {
    async fn resolve_room_by_public_id(
        &self,
        room_id: &RoomId,
    ) -> Result<Option<RoomRecord>, StoreError> {
        self.bounded(
            "resolve_room_by_public_id",
            self.inner.resolve_room_by_public_id(room_id),
        )
        .await
    }

    async fn create_room(
        &self,
        room_id: RoomId,
        host_id: UserId,
        password: String,
        now: Timestamp,
    ) -> Result<RoomRecord, StoreError> {
        self.bounded(
            "create_room",
            self.inner.create_room(room_id, host_id, password, now),
        )
        .await
    }

    async fn mark_room_closed(&self, room_id: &RoomId, now: Timestamp) -> Result<(), StoreError> {
        self.bounded("mark_room_closed", self.inner.mark_room_closed(room_id, now))
            .await
    }

    async fn rooms_of_user(&self, user_id: &UserId) -> Result<Vec<RoomRecord>, StoreError> {
        self.bounded("rooms_of_user", self.inner.rooms_of_user(user_id))
            .await
    }

    async fn record_participation_start(
        &self,
        record_id: RoomRecordId,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        self.bounded(
            "record_participation_start",
            self.inner.record_participation_start(record_id, user_id, now),
        )
        .await
    }

    async fn record_participation_end(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<u64, StoreError> {
        self.bounded(
            "record_participation_end",
            self.inner.record_participation_end(user_id, now),
        )
        .await
    }

    async fn create_message(
        &self,
        record_id: RoomRecordId,
        user_id: &UserId,
        content: &MessageContent,
    ) -> Result<(), StoreError> {
        self.bounded(
            "create_message",
            self.inner.create_message(record_id, user_id, content),
        )
        .await
    }

    async fn create_reaction(
        &self,
        record_id: RoomRecordId,
        user_id: &UserId,
        emoji: &Emoji,
    ) -> Result<(), StoreError> {
        self.bounded(
            "create_reaction",
            self.inner.create_reaction(record_id, user_id, emoji),
        )
        .await
    }

    async fn create_gift(
        &self,
        record_id: RoomRecordId,
        user_id: &UserId,
        gift_type: &GiftType,
    ) -> Result<(), StoreError> {
        self.bounded(
            "create_gift",
            self.inner.create_gift(record_id, user_id, gift_type),
        )
        .await
    }
}
