//! UseCase 層
//!
//! - Room Session Manager: `JoinRoomUseCase`, `LeaveRoomUseCase`, `DisconnectUseCase`
//! - Playback Authority Controller: `PlaybackControlUseCase`
//! - Activity Relay: `RelayActivityUseCase`
//! - CRUD 層: `CreateRoomUseCase`, `EnterRoomUseCase`, `CloseRoomUseCase`, `GetRoomStateUseCase`,
//!   `ListUserRoomsUseCase`

mod close_room;
mod create_room;
mod disconnect;
mod enter_room;
mod error;
mod get_room_state;
mod join_room;
mod leave_room;
mod list_user_rooms;
mod playback;
mod relay_activity;

#[cfg(test)]
pub(crate) mod test_support;

pub use close_room::CloseRoomUseCase;
pub use create_room::CreateRoomUseCase;
pub use disconnect::DisconnectUseCase;
pub use enter_room::EnterRoomUseCase;
pub use error::{
    ActivityError, CloseRoomError, CreateRoomError, EnterRoomError, JoinError,
    PlaybackControlError,
};
pub use get_room_state::GetRoomStateUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use list_user_rooms::ListUserRoomsUseCase;
pub use playback::PlaybackControlUseCase;
pub use relay_activity::{Activity, RelayActivityUseCase};
