//! Server state shared by every handler.

use std::sync::Arc;

use crate::{
    domain::{CredentialVerifier, EventDispatcher},
    usecase::{
        CloseRoomUseCase, CreateRoomUseCase, DisconnectUseCase, EnterRoomUseCase,
        GetRoomStateUseCase, JoinRoomUseCase, LeaveRoomUseCase, ListUserRoomsUseCase,
        PlaybackControlUseCase, RelayActivityUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// CredentialVerifier（接続時の認証）
    pub verifier: Arc<dyn CredentialVerifier>,
    /// EventDispatcher（接続の登録先）
    pub dispatcher: Arc<dyn EventDispatcher>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    pub playback_control_usecase: Arc<PlaybackControlUseCase>,
    pub relay_activity_usecase: Arc<RelayActivityUseCase>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub enter_room_usecase: Arc<EnterRoomUseCase>,
    pub close_room_usecase: Arc<CloseRoomUseCase>,
    pub get_room_state_usecase: Arc<GetRoomStateUseCase>,
    pub list_user_rooms_usecase: Arc<ListUserRoomsUseCase>,
}
