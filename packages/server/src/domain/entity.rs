//! Entity 定義
//!
//! `Room` は参加者リストとメッセージログを排他的に所有する集約ルートです。
//! 参加・退出・終了・投稿のルール（定員、ホスト権限、一意性、順序）はすべて
//! `Room` のメソッドとして表現し、呼び出し側は Room ごとのロックの内側でこれらを呼び出します。

use super::{
    error::RoomRuleError,
    value_object::{
        Capacity, DisplayName, MessageContent, MessageId, ProductId, RoomCode, RoomDescription,
        RoomId, RoomName, Timestamp, UserId,
    },
};

/// What the room is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomKind {
    /// Shared shopping session. Subject to idle reclamation.
    Ephemeral,
    /// Persistent group chat room.
    Durable,
}

impl RoomKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ephemeral => "ephemeral",
            Self::Durable => "durable",
        }
    }
}

/// Why a room stopped being active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    HostTerminated,
    HostLeft,
    Empty,
    Idle,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HostTerminated => "host_terminated",
            Self::HostLeft => "host_left",
            Self::Empty => "empty",
            Self::Idle => "idle",
        }
    }
}

/// PHC-formatted password hash. The plaintext is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(phc: String) -> Self {
        Self(phc)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Membership record scoped to one room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(user_id: UserId, display_name: DisplayName, joined_at: Timestamp) -> Self {
        Self {
            user_id,
            display_name,
            joined_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    ProductShare,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::ProductShare => "product-share",
        }
    }
}

/// What a caller asks to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    Text(MessageContent),
    ProductShare {
        product_id: ProductId,
        note: Option<MessageContent>,
    },
}

/// Stored message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(MessageContent),
    /// `summary` is generated at append time; live product data comes from the lookup.
    ProductShare {
        product_id: ProductId,
        summary: String,
    },
}

/// Immutable entry in a room's log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    /// Display name of the sender at the time of posting
    pub sender_name: DisplayName,
    pub body: MessageBody,
    pub created_at: Timestamp,
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self.body {
            MessageBody::Text(_) => MessageKind::Text,
            MessageBody::ProductShare { .. } => MessageKind::ProductShare,
        }
    }

    pub fn content(&self) -> &str {
        match &self.body {
            MessageBody::Text(content) => content.as_str(),
            MessageBody::ProductShare { summary, .. } => summary,
        }
    }

    pub fn product_id(&self) -> Option<&ProductId> {
        match &self.body {
            MessageBody::Text(_) => None,
            MessageBody::ProductShare { product_id, .. } => Some(product_id),
        }
    }
}

/// One page of a room's message log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub has_more: bool,
}

impl MessagePage {
    /// Cursor to pass as `after` to fetch the following page.
    pub fn next_cursor(&self) -> Option<MessageId> {
        self.messages.last().map(|m| m.id)
    }
}

/// Settings chosen by the creator
#[derive(Debug, Clone)]
pub struct RoomSettings {
    pub kind: RoomKind,
    pub name: RoomName,
    pub description: RoomDescription,
    pub capacity: Capacity,
    pub password_hash: Option<PasswordHash>,
}

/// Result of a join attempt that passed all checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined(Participant),
    AlreadyMember,
}

/// Result of removing a participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub participant: Participant,
    /// Members that were still in the room right after the removal
    pub remaining: Vec<UserId>,
    /// Set when the removal ended the room
    pub terminated: Option<TerminationReason>,
}

/// Point-in-time copy of a room without its message log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub code: RoomCode,
    pub kind: RoomKind,
    pub name: RoomName,
    pub description: RoomDescription,
    pub requires_password: bool,
    pub capacity: Capacity,
    pub host_id: UserId,
    pub participants: Vec<Participant>,
    pub is_active: bool,
    pub message_count: usize,
    pub created_at: Timestamp,
    pub last_activity_at: Timestamp,
}

impl RoomSnapshot {
    pub fn is_host(&self, user_id: &UserId) -> bool {
        &self.host_id == user_id
    }

    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.participants.iter().any(|p| &p.user_id == user_id)
    }
}

/// Room エンティティ
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub code: RoomCode,
    pub kind: RoomKind,
    pub name: RoomName,
    pub description: RoomDescription,
    pub password_hash: Option<PasswordHash>,
    pub capacity: Capacity,
    pub host_id: UserId,
    /// Join order is preserved
    pub participants: Vec<Participant>,
    /// Append order, ids strictly increasing
    pub messages: Vec<Message>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub last_activity_at: Timestamp,
    pub deactivated_at: Option<Timestamp>,
    pub termination_reason: Option<TerminationReason>,
    next_message_id: MessageId,
}

impl Room {
    /// Open a new active room with the creator already joined as host.
    pub fn open(
        id: RoomId,
        code: RoomCode,
        settings: RoomSettings,
        host: Participant,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            code,
            kind: settings.kind,
            name: settings.name,
            description: settings.description,
            password_hash: settings.password_hash,
            capacity: settings.capacity,
            host_id: host.user_id.clone(),
            participants: vec![host],
            messages: Vec::new(),
            is_active: true,
            created_at: now,
            last_activity_at: now,
            deactivated_at: None,
            termination_reason: None,
            next_message_id: MessageId::new(1),
        }
    }

    pub fn requires_password(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn is_host(&self, user_id: &UserId) -> bool {
        &self.host_id == user_id
    }

    pub fn participant(&self, user_id: &UserId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.user_id == user_id)
    }

    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.participant(user_id).is_some()
    }

    pub fn member_ids(&self) -> Vec<UserId> {
        self.participants.iter().map(|p| p.user_id.clone()).collect()
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.capacity.as_usize()
    }

    pub fn ensure_active(&self) -> Result<(), RoomRuleError> {
        if self.is_active {
            Ok(())
        } else {
            Err(RoomRuleError::Inactive)
        }
    }

    /// Add a participant, enforcing uniqueness and capacity.
    ///
    /// Joining twice is not an error: the second call reports `AlreadyMember`.
    pub fn add_participant(
        &mut self,
        user_id: UserId,
        display_name: DisplayName,
        now: Timestamp,
    ) -> Result<JoinOutcome, RoomRuleError> {
        self.ensure_active()?;

        if self.is_participant(&user_id) {
            return Ok(JoinOutcome::AlreadyMember);
        }
        if self.is_full() {
            return Err(RoomRuleError::CapacityExceeded);
        }

        let participant = Participant::new(user_id, display_name, now);
        self.participants.push(participant.clone());
        self.last_activity_at = now;
        Ok(JoinOutcome::Joined(participant))
    }

    /// Remove a participant. Returns `None` if the user was not a member.
    ///
    /// The room ends when the host leaves or nobody is left.
    pub fn remove_participant(&mut self, user_id: &UserId, now: Timestamp) -> Option<LeaveOutcome> {
        if !self.is_active {
            return None;
        }
        let index = self
            .participants
            .iter()
            .position(|p| &p.user_id == user_id)?;
        let participant = self.participants.remove(index);
        self.last_activity_at = now;

        let remaining = self.member_ids();
        let terminated = if self.is_host(user_id) {
            Some(TerminationReason::HostLeft)
        } else if self.participants.is_empty() {
            Some(TerminationReason::Empty)
        } else {
            None
        };
        if let Some(reason) = terminated {
            self.deactivate(reason, now);
        }

        Some(LeaveOutcome {
            participant,
            remaining,
            terminated,
        })
    }

    /// Host-only explicit termination. Returns the members at the moment of termination.
    pub fn terminate(
        &mut self,
        requester: &UserId,
        now: Timestamp,
    ) -> Result<Vec<UserId>, RoomRuleError> {
        self.ensure_active()?;
        if !self.is_host(requester) {
            return Err(RoomRuleError::NotHost);
        }
        let members = self.deactivate(TerminationReason::HostTerminated, now);
        Ok(members.into_iter().map(|p| p.user_id).collect())
    }

    /// Mark the room inactive and clear its participants.
    ///
    /// Idempotent: an already inactive room is left untouched and nobody is returned.
    pub fn deactivate(&mut self, reason: TerminationReason, now: Timestamp) -> Vec<Participant> {
        if !self.is_active {
            return Vec::new();
        }
        self.is_active = false;
        self.deactivated_at = Some(now);
        self.termination_reason = Some(reason);
        std::mem::take(&mut self.participants)
    }

    /// Append to the log. Only current participants of an active room may post.
    pub fn append_message(
        &mut self,
        sender_id: &UserId,
        payload: MessagePayload,
        now: Timestamp,
    ) -> Result<Message, RoomRuleError> {
        self.ensure_active()?;
        let sender_name = self
            .participant(sender_id)
            .map(|p| p.display_name.clone())
            .ok_or(RoomRuleError::NotParticipant)?;

        let body = match payload {
            MessagePayload::Text(content) => MessageBody::Text(content),
            MessagePayload::ProductShare { product_id, note } => {
                let summary = match note {
                    Some(note) => note.into_string(),
                    None => format!("{} shared a product", sender_name.as_str()),
                };
                MessageBody::ProductShare {
                    product_id,
                    summary,
                }
            }
        };

        let message = Message {
            id: self.next_message_id,
            sender_id: sender_id.clone(),
            sender_name,
            body,
            created_at: now,
        };
        self.next_message_id = self.next_message_id.next();
        self.messages.push(message.clone());
        self.last_activity_at = now;
        Ok(message)
    }

    /// Messages strictly after `after` in append order, at most `limit` of them.
    pub fn page_messages(&self, after: Option<MessageId>, limit: usize) -> MessagePage {
        let start = match after {
            Some(cursor) => self.messages.partition_point(|m| m.id <= cursor),
            None => 0,
        };
        let end = start.saturating_add(limit).min(self.messages.len());
        MessagePage {
            messages: self.messages[start..end].to_vec(),
            has_more: end < self.messages.len(),
        }
    }

    /// Active ephemeral room with no activity for at least `ttl_millis`.
    pub fn is_idle(&self, now: Timestamp, ttl_millis: i64) -> bool {
        self.is_active
            && self.kind == RoomKind::Ephemeral
            && now.elapsed_since(self.last_activity_at) >= ttl_millis
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id,
            code: self.code.clone(),
            kind: self.kind,
            name: self.name.clone(),
            description: self.description.clone(),
            requires_password: self.requires_password(),
            capacity: self.capacity,
            host_id: self.host_id.clone(),
            participants: self.participants.clone(),
            is_active: self.is_active,
            message_count: self.messages.len(),
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    pub fn name(value: &str) -> DisplayName {
        DisplayName::new(value.to_string()).unwrap()
    }

    pub fn settings(capacity: u32) -> RoomSettings {
        RoomSettings {
            kind: RoomKind::Ephemeral,
            name: RoomName::new("Weekend picks".to_string()).unwrap(),
            description: RoomDescription::default(),
            capacity: Capacity::new(capacity).unwrap(),
            password_hash: None,
        }
    }

    pub fn open_room(host: &str, capacity: u32) -> Room {
        Room::open(
            RoomId::generate(),
            RoomCode::new("ABC123".to_string()).unwrap(),
            settings(capacity),
            Participant::new(user(host), name(host), Timestamp::new(1_000)),
            Timestamp::new(1_000),
        )
    }

    pub fn text(value: &str) -> MessagePayload {
        MessagePayload::Text(MessageContent::new(value.to_string()).unwrap())
    }
}
