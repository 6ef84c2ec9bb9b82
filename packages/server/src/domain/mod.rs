//! Domain layer: room state, value objects, events and the seams the
//! use cases depend on.
//!
//! Infrastructure implements the traits defined here (dependency inversion);
//! nothing in this module knows about WebSocket frames or JSON.

pub mod credential;
pub mod dispatcher;
pub mod entity;
pub mod error;
pub mod event;
pub mod repository;
pub mod value_object;

pub use credential::CredentialVerifier;
pub use dispatcher::{EventDispatcher, PusherChannel};
pub use entity::{Media, Participant, PlaybackCommand, PlaybackPhase, RoomRecord, RoomState};
pub use error::{AuthError, DispatchError, PlaybackError, StoreError, ValueObjectError};
pub use event::RoomEvent;
pub use repository::{RoomHandle, RoomRecordStore, RoomStateRepository, lock_room};
pub use value_object::{
    ConnectionId, Emoji, GiftType, MessageContent, MovieId, PlaybackPosition, RoomIdFactory,
    RoomId, RoomRecordId, Timestamp, UserId, Username, VideoUrl,
};

#[cfg(test)]
pub use repository::MockRoomRecordStore;
