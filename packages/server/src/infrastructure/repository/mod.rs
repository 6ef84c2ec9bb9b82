//! Repository implementations.

pub mod inmemory;
pub mod timeout;

pub use inmemory::{
    ActivityRow, InMemoryRoomRecordStore, InMemoryRoomStateRepository, ParticipationRow,
};
pub use timeout::TimeoutRoomRecordStore;
