//! Entities: the live room state and the collaborator's durable room record.

use super::{
    error::PlaybackError,
    event::RoomEvent,
    value_object::{
        ConnectionId, MovieId, PlaybackPosition, RoomId, RoomRecordId, Timestamp, UserId,
        Username, VideoUrl,
    },
};

/// A user currently attached to a room through one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub user_id: UserId,
    pub username: Username,
    pub connection_id: ConnectionId,
}

impl Participant {
    pub fn new(user_id: UserId, username: Username, connection_id: ConnectionId) -> Self {
        Self {
            user_id,
            username,
            connection_id,
        }
    }
}

/// Currently loaded media. Loaded and replaced as a pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub movie_id: MovieId,
    pub video_url: VideoUrl,
}

/// Host-issued playback mutations.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackCommand {
    Play(PlaybackPosition),
    Pause(PlaybackPosition),
    Seek(PlaybackPosition),
    LoadMedia(Media),
}

/// Coarse playback state of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    NoMedia,
    Paused,
    Playing,
    Closed,
}

/// Live state of one room.
///
/// Fields are private: `host_id` never changes after construction, the
/// roster is unique by `user_id`, and playback fields only move through
/// [`RoomState::apply`], which checks host authority first.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomState {
    room_id: RoomId,
    host_id: UserId,
    is_playing: bool,
    current_time: PlaybackPosition,
    media: Option<Media>,
    participants: Vec<Participant>,
    closed: bool,
}

impl RoomState {
    /// Fresh state for a room hosted by `host_id`, nothing loaded, nobody attached.
    pub fn new(room_id: RoomId, host_id: UserId) -> Self {
        Self {
            room_id,
            host_id,
            is_playing: false,
            current_time: PlaybackPosition::ZERO,
            media: None,
            participants: Vec::new(),
            closed: false,
        }
    }

    /// Seed live state from a durable room record (creation or rehydration).
    pub fn from_record(record: &RoomRecord) -> Self {
        Self::new(record.room_id.clone(), record.host_id.clone())
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn host_id(&self) -> &UserId {
        &self.host_id
    }

    pub fn is_host(&self, user_id: &UserId) -> bool {
        &self.host_id == user_id
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_time(&self) -> PlaybackPosition {
        self.current_time
    }

    pub fn media(&self) -> Option<&Media> {
        self.media.as_ref()
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, user_id: &UserId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.user_id == user_id)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn phase(&self) -> PlaybackPhase {
        match (self.closed, &self.media, self.is_playing) {
            (true, _, _) => PlaybackPhase::Closed,
            (false, None, _) => PlaybackPhase::NoMedia,
            (false, Some(_), true) => PlaybackPhase::Playing,
            (false, Some(_), false) => PlaybackPhase::Paused,
        }
    }

    /// Attach a participant, or rebind an existing entry for the same user.
    ///
    /// Returns the connection the user was previously bound to when this is a
    /// rejoin. Order of first arrival is preserved.
    pub fn upsert_participant(&mut self, participant: Participant) -> Option<ConnectionId> {
        match self
            .participants
            .iter_mut()
            .find(|p| p.user_id == participant.user_id)
        {
            Some(existing) => {
                let previous = existing.connection_id;
                existing.connection_id = participant.connection_id;
                existing.username = participant.username;
                Some(previous)
            }
            None => {
                self.participants.push(participant);
                None
            }
        }
    }

    /// Remove the entry for `user_id`, if any.
    pub fn remove_participant(&mut self, user_id: &UserId) -> Option<Participant> {
        let index = self
            .participants
            .iter()
            .position(|p| &p.user_id == user_id)?;
        Some(self.participants.remove(index))
    }

    /// Remove every entry still bound to `connection_id`.
    pub fn remove_connection(&mut self, connection_id: &ConnectionId) -> Vec<Participant> {
        let (removed, kept): (Vec<_>, Vec<_>) = self
            .participants
            .drain(..)
            .partition(|p| &p.connection_id == connection_id);
        self.participants = kept;
        removed
    }

    fn authorize(&self, actor: &UserId) -> Result<(), PlaybackError> {
        if self.closed {
            return Err(PlaybackError::RoomClosed);
        }
        if !self.is_host(actor) {
            return Err(PlaybackError::NotHost(actor.as_str().to_string()));
        }
        Ok(())
    }

    /// Apply a host-only playback command and return the event to fan out.
    ///
    /// A refused command leaves the state untouched.
    pub fn apply(
        &mut self,
        actor: &UserId,
        command: PlaybackCommand,
    ) -> Result<RoomEvent, PlaybackError> {
        self.authorize(actor)?;

        let event = match command {
            PlaybackCommand::Play(position) => {
                self.is_playing = true;
                self.current_time = position;
                RoomEvent::Play {
                    current_time: position,
                }
            }
            PlaybackCommand::Pause(position) => {
                self.is_playing = false;
                self.current_time = position;
                RoomEvent::Pause {
                    current_time: position,
                }
            }
            PlaybackCommand::Seek(position) => {
                self.current_time = position;
                RoomEvent::Seek {
                    current_time: position,
                }
            }
            PlaybackCommand::LoadMedia(media) => {
                let event = RoomEvent::WatchStart {
                    movie_id: media.movie_id.clone(),
                    video_url: media.video_url.clone(),
                };
                self.media = Some(media);
                event
            }
        };

        Ok(event)
    }

    /// Host-only transition to `Closed`. A closed room refuses every later command.
    pub fn close(&mut self, actor: &UserId) -> Result<(), PlaybackError> {
        self.authorize(actor)?;
        self.closed = true;
        self.is_playing = false;
        Ok(())
    }
}

/// Durable room record owned by the collaborator store.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomRecord {
    pub id: RoomRecordId,
    pub room_id: RoomId,
    pub host_id: UserId,
    pub password: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub closed_at: Option<Timestamp>,
}

impl RoomRecord {
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn participant(id: &str, name: &str) -> Participant {
        Participant::new(
            user(id),
            Username::new(name.to_string()).unwrap(),
            ConnectionId::generate(),
        )
    }

    fn room() -> RoomState {
        RoomState::new(RoomId::new("abc123".to_string()).unwrap(), user("U1"))
    }

    fn media() -> Media {
        Media {
            movie_id: MovieId::Numeric(550),
            video_url: VideoUrl::new("https://example.com/v.mp4".to_string()).unwrap(),
        }
    }

    fn at(seconds: f64) -> PlaybackPosition {
        PlaybackPosition::new(seconds).unwrap()
    }

    #[test]
    fn test_upsert_same_user_rebinds_in_place() {
        // テスト項目: 同じユーザーの再参加は重複せず、接続と表示名が更新される
        // given (前提条件):
        let mut state = room();
        let first = participant("U2", "bob");
        let first_connection = first.connection_id;
        state.upsert_participant(first);

        // when (操作):
        let second = participant("U2", "bobby");
        let second_connection = second.connection_id;
        let previous = state.upsert_participant(second);

        // then (期待する結果):
        assert_eq!(previous, Some(first_connection));
        assert_eq!(state.participants().len(), 1);
        assert_eq!(state.participants()[0].connection_id, second_connection);
        assert_eq!(state.participants()[0].username.as_str(), "bobby");
    }

    #[test]
    fn test_remove_participant_absent_is_noop() {
        // テスト項目: 存在しない参加者の削除は何もしない
        // given (前提条件):
        let mut state = room();
        state.upsert_participant(participant("U2", "bob"));

        // when (操作):
        let removed = state.remove_participant(&user("U3"));

        // then (期待する結果):
        assert!(removed.is_none());
        assert_eq!(state.participants().len(), 1);
    }

    #[test]
    fn test_remove_connection_keeps_rebound_entries() {
        // テスト項目: 接続切断時、別接続に再バインド済みのエントリは残る
        // given (前提条件):
        let mut state = room();
        let stale = participant("U2", "bob");
        let stale_connection = stale.connection_id;
        state.upsert_participant(stale);
        state.upsert_participant(participant("U2", "bob"));
        state.upsert_participant(participant("U3", "carol"));

        // when (操作):
        let removed = state.remove_connection(&stale_connection);

        // then (期待する結果):
        assert!(removed.is_empty());
        assert_eq!(state.participants().len(), 2);
    }

    #[test]
    fn test_host_play_transitions_and_returns_event() {
        // テスト項目: ホストの play で再生中になり、play イベントが返される
        // given (前提条件):
        let mut state = room();
        state.apply(&user("U1"), PlaybackCommand::LoadMedia(media())).unwrap();

        // when (操作):
        let event = state.apply(&user("U1"), PlaybackCommand::Play(at(42.0)));

        // then (期待する結果):
        assert_eq!(event, Ok(RoomEvent::Play { current_time: at(42.0) }));
        assert_eq!(state.phase(), PlaybackPhase::Playing);
        assert_eq!(state.current_time(), at(42.0));
    }

    #[test]
    fn test_seek_keeps_play_flag() {
        // テスト項目: seek は再生フラグを変えずに位置だけ更新する
        // given (前提条件):
        let mut state = room();
        state.apply(&user("U1"), PlaybackCommand::LoadMedia(media())).unwrap();
        state.apply(&user("U1"), PlaybackCommand::Play(at(1.0))).unwrap();

        // when (操作):
        state.apply(&user("U1"), PlaybackCommand::Seek(at(90.0))).unwrap();

        // then (期待する結果):
        assert!(state.is_playing());
        assert_eq!(state.current_time(), at(90.0));
    }

    #[test]
    fn test_non_host_command_leaves_state_untouched() {
        // テスト項目: ホスト以外の操作は状態を一切変更しない
        // given (前提条件):
        let mut state = room();
        let before = state.clone();
        let commands = [
            PlaybackCommand::Play(at(10.0)),
            PlaybackCommand::Pause(at(10.0)),
            PlaybackCommand::Seek(at(10.0)),
            PlaybackCommand::LoadMedia(media()),
        ];

        // when (操作) / then (期待する結果):
        for command in commands {
            let result = state.apply(&user("U2"), command);
            assert_eq!(result, Err(PlaybackError::NotHost("U2".to_string())));
        }
        assert_eq!(state.close(&user("U2")), Err(PlaybackError::NotHost("U2".to_string())));
        assert_eq!(state, before);
    }

    #[test]
    fn test_phase_follows_media_and_close() {
        // テスト項目: NoMedia → Paused → Closed と状態が遷移する
        // given (前提条件):
        let mut state = room();
        assert_eq!(state.phase(), PlaybackPhase::NoMedia);

        // when (操作):
        state.apply(&user("U1"), PlaybackCommand::LoadMedia(media())).unwrap();
        let loaded = state.phase();
        state.close(&user("U1")).unwrap();

        // then (期待する結果):
        assert_eq!(loaded, PlaybackPhase::Paused);
        assert_eq!(state.phase(), PlaybackPhase::Closed);
        assert_eq!(
            state.apply(&user("U1"), PlaybackCommand::Play(at(0.0))),
            Err(PlaybackError::RoomClosed)
        );
        assert_eq!(state.close(&user("U1")), Err(PlaybackError::RoomClosed));
    }
}
