//! Value Object 定義
//!
//! 生の文字列や数値をそのまま扱わず、生成時に検証された型として表現します。
//! 一度生成された Value Object は常に有効な値を保持します。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Room code length (e.g. "K7Q2ZD")
pub const ROOM_CODE_LENGTH: usize = 6;
/// Maximum length of a user id supplied by the identity context
pub const MAX_USER_ID_LENGTH: usize = 64;
/// Maximum length of a display name
pub const MAX_DISPLAY_NAME_LENGTH: usize = 50;
/// Maximum length of a room name
pub const MAX_ROOM_NAME_LENGTH: usize = 100;
/// Maximum length of a room description
pub const MAX_ROOM_DESCRIPTION_LENGTH: usize = 500;
/// Maximum length of a chat message
pub const MAX_MESSAGE_LENGTH: usize = 2000;
/// Minimum room capacity (host + one guest)
pub const MIN_ROOM_CAPACITY: u32 = 2;

/// Short, human-shareable room code.
///
/// Uppercase ASCII letters and digits only. Unique among active rooms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomCode(String);

impl RoomCode {
    /// Normalizes to uppercase before validating, so "k7q2zd" is accepted.
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let normalized = value.trim().to_ascii_uppercase();
        if normalized.len() != ROOM_CODE_LENGTH
            || !normalized.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ValueObjectError::InvalidRoomCode(value));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable internal room identifier, independent of the shareable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomId(Uuid);

impl RoomId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Result<Self, ValueObjectError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| ValueObjectError::InvalidRoomId(value.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// User identifier supplied by the external identity context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyUserId);
        }
        if value.chars().count() > MAX_USER_ID_LENGTH {
            return Err(ValueObjectError::UserIdTooLong(MAX_USER_ID_LENGTH));
        }
        Ok(Self(value))
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyDisplayName);
        }
        if trimmed.chars().count() > MAX_DISPLAY_NAME_LENGTH {
            return Err(ValueObjectError::DisplayNameTooLong(MAX_DISPLAY_NAME_LENGTH));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomName(String);

impl RoomName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyRoomName);
        }
        if trimmed.chars().count() > MAX_ROOM_NAME_LENGTH {
            return Err(ValueObjectError::RoomNameTooLong(MAX_ROOM_NAME_LENGTH));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Free-form room description. Empty is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoomDescription(String);

impl RoomDescription {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.chars().count() > MAX_ROOM_DESCRIPTION_LENGTH {
            return Err(ValueObjectError::DescriptionTooLong(
                MAX_ROOM_DESCRIPTION_LENGTH,
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Maximum number of concurrent participants, host included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity(u32);

impl Capacity {
    pub fn new(value: u32) -> Result<Self, ValueObjectError> {
        if value < MIN_ROOM_CAPACITY {
            return Err(ValueObjectError::CapacityTooSmall(MIN_ROOM_CAPACITY));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// Text chat content. Never empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyMessage);
        }
        if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ValueObjectError::MessageTooLong(MAX_MESSAGE_LENGTH));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Reference to a catalog product. Resolution happens at read time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(ValueObjectError::InvalidProductId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Position of a message in its room's log. Starts at 1 and only grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

impl MessageId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// Unix timestamp in milliseconds (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn elapsed_since(&self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }
}
