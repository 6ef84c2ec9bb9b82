//! Value objects.
//!
//! Every value that crosses the transport boundary is validated here, so a
//! use case never sees an empty room id or a NaN playback position.

use std::fmt;

use rand::Rng;
use uuid::Uuid;

use super::error::ValueObjectError;

const MAX_ROOM_ID_LEN: usize = 64;
const MAX_USER_ID_LEN: usize = 128;
const MAX_USERNAME_LEN: usize = 64;
const MAX_MESSAGE_LEN: usize = 1000;
const MAX_EMOJI_LEN: usize = 32;
const MAX_GIFT_TYPE_LEN: usize = 64;
const MAX_VIDEO_URL_LEN: usize = 2048;

/// Bytes of randomness in a generated public room id (hex encoded, so 12 chars).
const ROOM_ID_BYTES: usize = 6;

fn validate_text(
    field: &'static str,
    value: String,
    max: usize,
) -> Result<String, ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty(field));
    }
    let len = value.chars().count();
    if len > max {
        return Err(ValueObjectError::TooLong { field, len, max });
    }
    Ok(value)
}

/// Public room identifier (the one clients see and share).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_text("room id", value, MAX_ROOM_ID_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates fresh public room ids.
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// 12 lowercase hex characters from a thread-local CSPRNG.
    pub fn generate() -> RoomId {
        let mut bytes = [0u8; ROOM_ID_BYTES];
        rand::thread_rng().fill(&mut bytes);
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        RoomId(hex)
    }
}

/// Authenticated user identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_text("user id", value, MAX_USER_ID_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name supplied by the client with each event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_text("username", value, MAX_USERNAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identifier of one live socket. Minted per connection, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Playback position in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct PlaybackPosition(f64);

impl PlaybackPosition {
    pub const ZERO: Self = Self(0.0);

    pub fn new(seconds: f64) -> Result<Self, ValueObjectError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ValueObjectError::InvalidPlaybackPosition);
        }
        Ok(Self(seconds))
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for PlaybackPosition {
    type Error = ValueObjectError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Movie reference from the metadata provider. Numeric ids are kept numeric
/// so they are echoed back to clients unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieId {
    Numeric(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUrl(String);

impl VideoUrl {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_text("video url", value, MAX_VIDEO_URL_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VideoUrl {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Chat message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_text("message", value, MAX_MESSAGE_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emoji(String);

impl Emoji {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_text("emoji", value, MAX_EMOJI_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Emoji {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftType(String);

impl GiftType {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_text("gift type", value, MAX_GIFT_TYPE_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GiftType {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Durable identifier of a room record in the collaborator store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomRecordId(pub u64);

/// Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
