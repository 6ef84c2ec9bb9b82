//! Dependency wiring shared by the binary and the integration tests.

use std::sync::Arc;

use watchroom_shared::time::{Clock, SystemClock};

use crate::{
    config::ServerConfig,
    domain::{CredentialVerifier, EventDispatcher, RoomRecordStore, RoomStateRepository},
    infrastructure::{
        auth::JwtCredentialVerifier,
        dispatcher::WebSocketEventDispatcher,
        repository::{InMemoryRoomRecordStore, InMemoryRoomStateRepository, TimeoutRoomRecordStore},
    },
    ui::state::AppState,
    usecase::{
        CloseRoomUseCase, CreateRoomUseCase, DisconnectUseCase, EnterRoomUseCase,
        GetRoomStateUseCase, JoinRoomUseCase, LeaveRoomUseCase, ListUserRoomsUseCase,
        PlaybackControlUseCase, RelayActivityUseCase,
    },
};

/// Build the application state from configuration.
pub fn build_app_state(config: &ServerConfig) -> Arc<AppState> {
    // Initialize dependencies in order:
    // 1. Repository / collaborator store
    // 2. EventDispatcher / CredentialVerifier
    // 3. UseCases

    // 1. Live room state (in memory) and the collaborator store behind a timeout
    let repository: Arc<dyn RoomStateRepository> = Arc::new(InMemoryRoomStateRepository::new());
    let store: Arc<dyn RoomRecordStore> = Arc::new(TimeoutRoomRecordStore::new(
        Arc::new(InMemoryRoomRecordStore::new()),
        config.store_timeout,
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 2. EventDispatcher (WebSocket implementation) and credential verification
    let dispatcher: Arc<dyn EventDispatcher> = Arc::new(WebSocketEventDispatcher::new());
    let verifier: Arc<dyn CredentialVerifier> =
        Arc::new(JwtCredentialVerifier::new(&config.jwt_secret));

    // 3. UseCases
    let close_room_usecase = Arc::new(CloseRoomUseCase::new(
        repository.clone(),
        store.clone(),
        dispatcher.clone(),
        clock.clone(),
    ));
    let playback_control_usecase = Arc::new(PlaybackControlUseCase::new(
        repository.clone(),
        dispatcher.clone(),
        close_room_usecase.clone(),
    ));

    Arc::new(AppState {
        verifier,
        dispatcher: dispatcher.clone(),
        join_room_usecase: Arc::new(JoinRoomUseCase::new(
            repository.clone(),
            store.clone(),
            dispatcher.clone(),
        )),
        leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
            repository.clone(),
            store.clone(),
            dispatcher.clone(),
            clock.clone(),
        )),
        disconnect_usecase: Arc::new(DisconnectUseCase::new(
            repository.clone(),
            dispatcher.clone(),
        )),
        playback_control_usecase,
        relay_activity_usecase: Arc::new(RelayActivityUseCase::new(
            store.clone(),
            dispatcher,
            clock.clone(),
        )),
        create_room_usecase: Arc::new(CreateRoomUseCase::new(
            repository.clone(),
            store.clone(),
            clock.clone(),
        )),
        enter_room_usecase: Arc::new(EnterRoomUseCase::new(store.clone(), clock)),
        list_user_rooms_usecase: Arc::new(ListUserRoomsUseCase::new(store)),
        close_room_usecase,
        get_room_state_usecase: Arc::new(GetRoomStateUseCase::new(repository)),
    })
}
