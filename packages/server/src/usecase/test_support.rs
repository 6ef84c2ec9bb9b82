//! UseCase テスト用の共通部品

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use watchroom_shared::time::FixedClock;

use crate::{
    domain::{
        ConnectionId, DispatchError, EventDispatcher, PusherChannel, RoomEvent, RoomId,
        RoomRecord, RoomRecordStore, RoomState, RoomStateRepository, Timestamp, UserId, Username,
    },
    infrastructure::repository::{InMemoryRoomRecordStore, InMemoryRoomStateRepository},
};

pub const NOW: i64 = 1_700_000_000_000;

/// One recorded dispatcher call.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Room {
        room_id: RoomId,
        event: RoomEvent,
    },
    RoomExcept {
        room_id: RoomId,
        sender: ConnectionId,
        event: RoomEvent,
    },
    Sender {
        connection_id: ConnectionId,
        event: RoomEvent,
    },
}

impl Delivery {
    pub fn event(&self) -> &RoomEvent {
        match self {
            Delivery::Room { event, .. }
            | Delivery::RoomExcept { event, .. }
            | Delivery::Sender { event, .. } => event,
        }
    }
}

/// Fake dispatcher that records every delivery in call order.
#[derive(Default)]
pub struct RecordingDispatcher {
    deliveries: Mutex<Vec<Delivery>>,
    memberships: Mutex<HashMap<ConnectionId, HashSet<RoomId>>>,
}

impl RecordingDispatcher {
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn is_subscribed(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        self.memberships
            .lock()
            .unwrap()
            .get(connection_id)
            .is_some_and(|rooms| rooms.contains(room_id))
    }

    fn record(&self, delivery: Delivery) {
        self.deliveries.lock().unwrap().push(delivery);
    }
}

impl EventDispatcher for RecordingDispatcher {
    fn register_connection(&self, connection_id: ConnectionId, _sender: PusherChannel) {
        self.memberships
            .lock()
            .unwrap()
            .entry(connection_id)
            .or_default();
    }

    fn unregister_connection(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        self.memberships
            .lock()
            .unwrap()
            .remove(connection_id)
            .map(|rooms| rooms.into_iter().collect())
            .unwrap_or_default()
    }

    fn subscribe(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        self.memberships
            .lock()
            .unwrap()
            .entry(*connection_id)
            .or_default()
            .insert(room_id.clone());
    }

    fn unsubscribe(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        if let Some(rooms) = self.memberships.lock().unwrap().get_mut(connection_id) {
            rooms.remove(room_id);
        }
    }

    fn clear_room(&self, room_id: &RoomId) {
        for rooms in self.memberships.lock().unwrap().values_mut() {
            rooms.remove(room_id);
        }
    }

    fn to_room(&self, room_id: &RoomId, event: &RoomEvent) -> usize {
        self.record(Delivery::Room {
            room_id: room_id.clone(),
            event: event.clone(),
        });
        1
    }

    fn to_room_except(&self, room_id: &RoomId, sender: &ConnectionId, event: &RoomEvent) -> usize {
        self.record(Delivery::RoomExcept {
            room_id: room_id.clone(),
            sender: *sender,
            event: event.clone(),
        });
        1
    }

    fn to_sender(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), DispatchError> {
        self.record(Delivery::Sender {
            connection_id: *connection_id,
            event: event.clone(),
        });
        Ok(())
    }
}

pub fn room(id: &str) -> RoomId {
    RoomId::new(id.to_string()).unwrap()
}

pub fn user(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

pub fn name(name: &str) -> Username {
    Username::new(name.to_string()).unwrap()
}

pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(NOW))
}

/// Fresh store and repository holding one active room `room_id` hosted by `host`.
pub async fn seeded(
    room_id: &str,
    host: &str,
) -> (
    Arc<InMemoryRoomRecordStore>,
    Arc<InMemoryRoomStateRepository>,
    RoomRecord,
) {
    let store = Arc::new(InMemoryRoomRecordStore::new());
    let record = store
        .create_room(room(room_id), user(host), "secret".to_string(), Timestamp::new(NOW))
        .await
        .unwrap();
    let repository = Arc::new(InMemoryRoomStateRepository::new());
    repository.create(RoomState::from_record(&record));
    (store, repository, record)
}
