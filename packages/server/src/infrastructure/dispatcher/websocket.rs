//! WebSocket を使った EventDispatcher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - room 単位の購読（subscription）を管理
//! - イベントを JSON にシリアライズして配信（to_room, to_room_except, to_sender）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された sender を受け取り、送信にだけ使います。
//! Sends are `UnboundedSender::send`, which never waits, so dispatching from
//! inside a room's critical section cannot stall it. Per-connection channels
//! keep the order in which one caller dispatched.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::domain::{
    ConnectionId, DispatchError, EventDispatcher, PusherChannel, RoomEvent, RoomId,
};
use crate::infrastructure::dto::websocket::ServerMessage;

#[derive(Default)]
pub struct WebSocketEventDispatcher {
    /// connection → outbound channel
    connections: DashMap<ConnectionId, PusherChannel>,
    /// room → subscribed connections
    subscribers: DashMap<RoomId, HashSet<ConnectionId>>,
    /// connection → rooms it is subscribed to
    memberships: DashMap<ConnectionId, HashSet<RoomId>>,
}

impl WebSocketEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn encode(event: &RoomEvent) -> Option<String> {
        match serde_json::to_string(&ServerMessage::from(event)) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::error!("Failed to serialize '{}' event: {}", event.name(), e);
                None
            }
        }
    }

    fn room_targets(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.subscribers
            .get(room_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    fn fan_out(&self, targets: Vec<ConnectionId>, event: &RoomEvent) -> usize {
        let Some(json) = Self::encode(event) else {
            return 0;
        };

        let mut delivered = 0;
        for target in targets {
            match self.connections.get(&target) {
                Some(sender) => {
                    // ブロードキャストでは一部の送信失敗を許容
                    if let Err(e) = sender.send(json.clone()) {
                        tracing::warn!("Failed to push '{}' to '{}': {}", event.name(), target, e);
                    } else {
                        delivered += 1;
                    }
                }
                None => {
                    tracing::debug!("Connection '{}' gone during broadcast, skipping", target);
                }
            }
        }
        delivered
    }

    /// Number of connections subscribed to a room.
    pub fn subscriber_count(&self, room_id: &RoomId) -> usize {
        self.subscribers.get(room_id).map(|s| s.len()).unwrap_or(0)
    }
}

impl EventDispatcher for WebSocketEventDispatcher {
    fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.connections.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to dispatcher", connection_id);
    }

    fn unregister_connection(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        self.connections.remove(connection_id);
        let rooms: Vec<RoomId> = self
            .memberships
            .remove(connection_id)
            .map(|(_, rooms)| rooms.into_iter().collect())
            .unwrap_or_default();
        for room_id in &rooms {
            self.subscribers.remove_if_mut(room_id, |_, set| {
                set.remove(connection_id);
                set.is_empty()
            });
        }
        tracing::debug!(
            "Connection '{}' unregistered from dispatcher ({} room subscriptions dropped)",
            connection_id,
            rooms.len()
        );
        rooms
    }

    fn subscribe(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        self.subscribers
            .entry(room_id.clone())
            .or_default()
            .insert(*connection_id);
        self.memberships
            .entry(*connection_id)
            .or_default()
            .insert(room_id.clone());
    }

    fn unsubscribe(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        self.subscribers.remove_if_mut(room_id, |_, set| {
            set.remove(connection_id);
            set.is_empty()
        });
        self.memberships.remove_if_mut(connection_id, |_, rooms| {
            rooms.remove(room_id);
            rooms.is_empty()
        });
    }

    fn clear_room(&self, room_id: &RoomId) {
        let Some((_, connections)) = self.subscribers.remove(room_id) else {
            return;
        };
        for connection_id in connections {
            self.memberships.remove_if_mut(&connection_id, |_, rooms| {
                rooms.remove(room_id);
                rooms.is_empty()
            });
        }
        tracing::debug!("Cleared all subscriptions of room '{}'", room_id);
    }

    fn to_room(&self, room_id: &RoomId, event: &RoomEvent) -> usize {
        let targets = self.room_targets(room_id);
        self.fan_out(targets, event)
    }

    fn to_room_except(
        &self,
        room_id: &RoomId,
        sender: &ConnectionId,
        event: &RoomEvent,
    ) -> usize {
        let targets = self
            .room_targets(room_id)
            .into_iter()
            .filter(|id| id != sender)
            .collect();
        self.fan_out(targets, event)
    }

    fn to_sender(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), DispatchError> {
        let sender = self
            .connections
            .get(connection_id)
            .ok_or_else(|| DispatchError::ConnectionNotFound(connection_id.to_string()))?;
        let Some(json) = Self::encode(event) else {
            return Ok(());
        };
        sender
            .send(json)
            .map_err(|_| DispatchError::ChannelClosed(connection_id.to_string()))
    }
}
