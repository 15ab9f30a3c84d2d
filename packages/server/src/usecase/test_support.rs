//! Test fixtures shared by the use case tests.

use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use kaimono_shared::time::ManualClock;

use crate::{
    domain::{
        ConnectionId, CredentialError, CredentialIssuer, EventEnvelope, MessagePusher, PasswordHash,
        PusherChannel, RoomCode, RoomEvent, RoomId, RoomKind, UserId,
        test_support::{name, user},
    },
    infrastructure::repository::InMemoryRoomRepository,
};

use super::{CreateRoomCommand, CreateRoomUseCase, CreatedRoom};

/// MessagePusher that remembers every published envelope in order.
#[derive(Default)]
pub struct RecordingPusher {
    published: StdMutex<Vec<EventEnvelope>>,
}

impl RecordingPusher {
    pub fn envelopes(&self) -> Vec<EventEnvelope> {
        self.published.lock().unwrap().clone()
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.envelopes().iter().map(|e| e.event.name()).collect()
    }

    pub fn last(&self) -> Option<EventEnvelope> {
        self.envelopes().last().cloned()
    }

    pub fn clear(&self) {
        self.published.lock().unwrap().clear();
    }
}

#[async_trait]
impl MessagePusher for RecordingPusher {
    async fn register_client(
        &self,
        _room_id: RoomId,
        _user_id: UserId,
        _sender: PusherChannel,
    ) -> ConnectionId {
        ConnectionId::new(0)
    }

    async fn unregister_connection(
        &self,
        _room_id: &RoomId,
        _user_id: &UserId,
        _connection: ConnectionId,
    ) {
    }

    async fn unregister_client(&self, _room_id: &RoomId, _user_id: &UserId) {}

    fn publish(&self, envelope: EventEnvelope) {
        self.published.lock().unwrap().push(envelope);
    }
}

/// Deterministic issuer: hands out the queued codes first, then "ZZ0000", "ZZ0001", ...
/// Passwords are "pw-<n>" and "hashes" are reversible so tests stay fast.
#[derive(Default)]
pub struct ScriptedIssuer {
    codes: StdMutex<Vec<String>>,
    counter: StdMutex<u32>,
}

impl ScriptedIssuer {
    pub fn with_codes(codes: &[&str]) -> Self {
        let mut queued: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        queued.reverse();
        Self {
            codes: StdMutex::new(queued),
            counter: StdMutex::new(0),
        }
    }

    fn next_number(&self) -> u32 {
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        *counter
    }
}

impl CredentialIssuer for ScriptedIssuer {
    fn generate_room_code(&self) -> RoomCode {
        let queued = self.codes.lock().unwrap().pop();
        let code = queued.unwrap_or_else(|| format!("ZZ{:04}", self.next_number()));
        RoomCode::new(code).unwrap()
    }

    fn generate_password(&self) -> String {
        format!("pw{}", self.next_number())
    }

    fn hash_password(&self, plain: &str) -> Result<PasswordHash, CredentialError> {
        Ok(PasswordHash::new(format!("hashed:{plain}")))
    }

    fn verify_password(&self, plain: &str, hash: &PasswordHash) -> bool {
        hash.as_str() == format!("hashed:{plain}")
    }
}

/// Wiring of in-memory collaborators used by most use case tests.
pub struct Fixture {
    pub repository: Arc<InMemoryRoomRepository>,
    pub pusher: Arc<RecordingPusher>,
    pub issuer: Arc<ScriptedIssuer>,
    pub clock: Arc<ManualClock>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            repository: Arc::new(InMemoryRoomRepository::new()),
            pusher: Arc::new(RecordingPusher::default()),
            issuer: Arc::new(ScriptedIssuer::default()),
            clock: Arc::new(ManualClock::new(1_700_000_000_000)),
        }
    }

    pub fn create_usecase(&self) -> CreateRoomUseCase {
        CreateRoomUseCase::new(self.repository.clone(), self.issuer.clone(), self.clock.clone())
    }

    pub async fn create_room(&self, host: &str, capacity: u32, require_password: bool) -> CreatedRoom {
        self.create_usecase()
            .execute(CreateRoomCommand {
                creator_id: user(host),
                creator_name: name(host),
                name: format!("{host}'s room"),
                description: String::new(),
                capacity,
                require_password,
                kind: RoomKind::Ephemeral,
            })
            .await
            .unwrap()
    }
}

pub fn is_terminated(envelope: &EventEnvelope) -> bool {
    matches!(envelope.event, RoomEvent::RoomTerminated { .. })
}
