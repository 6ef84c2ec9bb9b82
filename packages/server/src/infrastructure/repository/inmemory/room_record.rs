//! InMemory collaborator store 実装
//!
//! Stands in for the relational store behind the room CRUD layer. Rows live
//! in plain vectors behind one `tokio::sync::Mutex`; this store is never
//! touched while a room's critical section is held.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Emoji, GiftType, MessageContent, RoomId, RoomRecord, RoomRecordId, RoomRecordStore,
    StoreError, Timestamp, UserId,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ParticipationRow {
    pub room: RoomRecordId,
    pub user_id: UserId,
    pub joined_at: Timestamp,
    pub left_at: Option<Timestamp>,
}

/// One persisted chat message, reaction or gift.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityRow {
    Message {
        room: RoomRecordId,
        user_id: UserId,
        content: MessageContent,
    },
    Reaction {
        room: RoomRecordId,
        user_id: UserId,
        emoji: Emoji,
    },
    Gift {
        room: RoomRecordId,
        user_id: UserId,
        gift_type: GiftType,
    },
}

#[derive(Default)]
struct Tables {
    next_id: u64,
    rooms: Vec<RoomRecord>,
    participations: Vec<ParticipationRow>,
    activity: Vec<ActivityRow>,
}

impl Tables {
    fn room_exists(&self, record_id: RoomRecordId) -> Result<(), StoreError> {
        if self.rooms.iter().any(|r| r.id == record_id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("room record {}", record_id.0)))
        }
    }
}

#[derive(Default)]
pub struct InMemoryRoomRecordStore {
    tables: Mutex<Tables>,
}

impl InMemoryRoomRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persisted activity rows, oldest first.
    pub async fn activity(&self) -> Vec<ActivityRow> {
        self.tables.lock().await.activity.clone()
    }

    pub async fn participations(&self) -> Vec<ParticipationRow> {
        self.tables.lock().await.participations.clone()
    }
}

#[async_trait]
impl RoomRecordStore for InMemoryRoomRecordStore {
    async fn resolve_room_by_public_id(
        &self,
        room_id: &RoomId,
    ) -> Result<Option<RoomRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.rooms.iter().find(|r| &r.room_id == room_id).cloned())
    }

    async fn create_room(
        &self,
        room_id: RoomId,
        host_id: UserId,
        password: String,
        now: Timestamp,
    ) -> Result<RoomRecord, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.rooms.iter().any(|r| r.room_id == room_id) {
            return Err(StoreError::Backend(format!(
                "room id '{}' already exists",
                room_id
            )));
        }
        tables.next_id += 1;
        let record = RoomRecord {
            id: RoomRecordId(tables.next_id),
            room_id,
            host_id,
            password,
            is_active: true,
            created_at: now,
            closed_at: None,
        };
        tables.rooms.push(record.clone());
        Ok(record)
    }

    async fn mark_room_closed(&self, room_id: &RoomId, now: Timestamp) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let record = tables
            .rooms
            .iter_mut()
            .find(|r| &r.room_id == room_id)
            .ok_or_else(|| StoreError::NotFound(format!("room '{}'", room_id)))?;
        if record.is_active {
            record.is_active = false;
            record.closed_at = Some(now);
        }
        Ok(())
    }

    async fn rooms_of_user(&self, user_id: &UserId) -> Result<Vec<RoomRecord>, StoreError> {
        let tables = self.tables.lock().await;
        let mut rooms: Vec<RoomRecord> = tables
            .rooms
            .iter()
            .filter(|room| room.is_active)
            .filter(|room| {
                &room.host_id == user_id
                    || tables.participations.iter().any(|row| {
                        row.room == room.id && &row.user_id == user_id && row.left_at.is_none()
                    })
            })
            .cloned()
            .collect();
        rooms.sort_by(|a, b| (b.created_at, b.id.0).cmp(&(a.created_at, a.id.0)));
        Ok(rooms)
    }

    async fn record_participation_start(
        &self,
        record_id: RoomRecordId,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.room_exists(record_id)?;
        tables.participations.push(ParticipationRow {
            room: record_id,
            user_id: user_id.clone(),
            joined_at: now,
            left_at: None,
        });
        Ok(())
    }

    async fn record_participation_end(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().await;
        let mut closed = 0;
        for row in tables
            .participations
            .iter_mut()
            .filter(|row| &row.user_id == user_id && row.left_at.is_none())
        {
            row.left_at = Some(now);
            closed += 1;
        }
        Ok(closed)
    }

    async fn create_message(
        &self,
        record_id: RoomRecordId,
        user_id: &UserId,
        content: &MessageContent,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.room_exists(record_id)?;
        tables.activity.push(ActivityRow::Message {
            room: record_id,
            user_id: user_id.clone(),
            content: content.clone(),
        });
        Ok(())
    }

    async fn create_reaction(
        &self,
        record_id: RoomRecordId,
        user_id: &UserId,
        emoji: &Emoji,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.room_exists(record_id)?;
        tables.activity.push(ActivityRow::Reaction {
            room: record_id,
            user_id: user_id.clone(),
            emoji: emoji.clone(),
        });
        Ok(())
    }

    async fn create_gift(
        &self,
        record_id: RoomRecordId,
        user_id: &UserId,
        gift_type: &GiftType,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.room_exists(record_id)?;
        tables.activity.push(ActivityRow::Gift {
            room: record_id,
            user_id: user_id.clone(),
            gift_type: gift_type.clone(),
        });
        Ok(())
    }
}
