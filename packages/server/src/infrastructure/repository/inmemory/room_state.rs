//! InMemory Room State Store 実装
//!
//! `DashMap` (sharded) から room ごとの `Arc<Mutex<RoomState>>` を引きます。
//! The map shard lock is held only long enough to clone the handle out; the
//! per-room mutex is the critical section, so unrelated rooms never contend.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use crate::domain::{RoomHandle, RoomId, RoomState, RoomStateRepository};

#[derive(Default)]
pub struct InMemoryRoomStateRepository {
    rooms: DashMap<RoomId, RoomHandle>,
}

impl InMemoryRoomStateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoomStateRepository for InMemoryRoomStateRepository {
    fn create(&self, state: RoomState) -> RoomHandle {
        let room_id = state.room_id().clone();
        let handle = Arc::new(Mutex::new(state));
        if self.rooms.insert(room_id.clone(), handle.clone()).is_some() {
            tracing::warn!("Room '{}' already had live state; replaced", room_id);
        }
        tracing::debug!("Room '{}' state created", room_id);
        handle
    }

    fn get_or_insert(&self, state: RoomState) -> RoomHandle {
        self.rooms
            .entry(state.room_id().clone())
            .or_insert_with(|| {
                tracing::debug!("Room '{}' state seeded", state.room_id());
                Arc::new(Mutex::new(state))
            })
            .clone()
    }

    fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(room_id).map(|entry| entry.value().clone())
    }

    fn remove(&self, room_id: &RoomId) -> Option<RoomHandle> {
        let removed = self.rooms.remove(room_id).map(|(_, handle)| handle);
        if removed.is_some() {
            tracing::debug!("Room '{}' state removed", room_id);
        }
        removed
    }

    fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }
}
