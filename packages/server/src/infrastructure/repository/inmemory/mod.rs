//! In-memory stores.

pub mod room_record;
pub mod room_state;

pub use room_record::{ActivityRow, InMemoryRoomRecordStore, ParticipationRow};
pub use room_state::InMemoryRoomStateRepository;
