//! Event Dispatcher trait.
//!
//! Addressing layer over the connections currently subscribed to a room.
//! Delivery is best-effort to whoever is subscribed at the instant of the
//! call; a connection subscribing a moment later reconciles from the
//! `room-state` snapshot it receives on join.
//!
//! Methods are synchronous: use cases dispatch while holding a
//! room's critical section, which must never suspend.

use super::{
    error::DispatchError,
    event::RoomEvent,
    value_object::{ConnectionId, RoomId},
};

/// Outbound channel of one connection (serialized frames).
pub type PusherChannel = tokio::sync::mpsc::UnboundedSender<String>;

pub trait EventDispatcher: Send + Sync {
    /// Register a freshly authenticated connection.
    fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Drop a connection and all of its room subscriptions.
    ///
    /// Returns the rooms it was subscribed to.
    fn unregister_connection(&self, connection_id: &ConnectionId) -> Vec<RoomId>;

    fn subscribe(&self, room_id: &RoomId, connection_id: &ConnectionId);

    fn unsubscribe(&self, room_id: &RoomId, connection_id: &ConnectionId);

    /// Remove every subscription to `room_id`. Idempotent.
    fn clear_room(&self, room_id: &RoomId);

    /// Deliver to every connection subscribed to the room. Returns the number of sends.
    fn to_room(&self, room_id: &RoomId, event: &RoomEvent) -> usize;

    /// Deliver to every subscribed connection except `sender`.
    fn to_room_except(&self, room_id: &RoomId, sender: &ConnectionId, event: &RoomEvent)
    -> usize;

    /// Deliver to a single connection.
    fn to_sender(&self, connection_id: &ConnectionId, event: &RoomEvent)
    -> Result<(), DispatchError>;
}
