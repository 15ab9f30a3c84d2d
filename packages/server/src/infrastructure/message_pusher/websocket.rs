//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続中クライアントの `UnboundedSender` を (Room, User) 単位で管理
//!   （同じユーザーの複数接続は `ConnectionId` で区別する）
//! - `publish` されたイベントを送信キューに積み、別タスクの配信ループで送信
//!
//! ## 設計ノート
//!
//! `publish` は Room のロック内から同期的に呼ばれるため、キューへの追加のみを行います。
//! キューは 1 本なので、同じ Room のイベントはコミット順に配信されます。
//! クライアントごとの送信も unbounded channel なので、遅いクライアントが配信ループを
//! 止めることはありません。
//!
//! `room-terminated` を配信した後、そのルームの受信者のチャンネルは破棄されます。
//! これにより UI 層の WebSocket 接続は自然に閉じられます。

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{
        ConnectionId, EventEnvelope, MessagePusher, PusherChannel, RoomEvent, RoomId, UserId,
    },
    infrastructure::dto::conversion::encode_event,
};

type ClientMap = HashMap<(RoomId, UserId), HashMap<ConnectionId, PusherChannel>>;

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.register_client(room_id, user_id, tx).await;
/// pusher.publish(EventEnvelope { recipients, event });
/// ```
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの WebSocket sender
    clients: Arc<Mutex<ClientMap>>,
    /// 送信キュー（配信ループが受信側を所有する）
    queue: mpsc::UnboundedSender<EventEnvelope>,
    next_connection: AtomicU64,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成し、配信ループを起動する
    ///
    /// Tokio ランタイムの内側で呼び出す必要があります。
    /// 配信ループは `WebSocketMessagePusher` が破棄されると終了します。
    pub fn new() -> Self {
        let clients = Arc::new(Mutex::new(HashMap::new()));
        let (queue, rx) = mpsc::unbounded_channel();
        tokio::spawn(dispatch_loop(rx, clients.clone()));
        Self {
            clients,
            queue,
            next_connection: AtomicU64::new(1),
        }
    }

    /// 現在登録されている接続数
    #[cfg(test)]
    pub(crate) async fn connection_count(&self) -> usize {
        self.clients.lock().await.values().map(HashMap::len).sum()
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

async fn dispatch_loop(
    mut rx: mpsc::UnboundedReceiver<EventEnvelope>,
    clients: Arc<Mutex<ClientMap>>,
) {
    while let Some(envelope) = rx.recv().await {
        let frame = match encode_event(&envelope.event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Failed to encode '{}' event: {}", envelope.event.name(), e);
                continue;
            }
        };
        let room_id = envelope.event.room_id();
        let terminated = matches!(envelope.event, RoomEvent::RoomTerminated { .. });

        let mut clients = clients.lock().await;
        for recipient in envelope.recipients {
            let key = (room_id, recipient);
            let Some(connections) = clients.get_mut(&key) else {
                // 参加者だが WebSocket を開いていない
                tracing::debug!("No connection for '{}' in room {}", key.1, room_id);
                continue;
            };
            connections.retain(|connection, sender| match sender.send(frame.clone()) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        "Failed to push '{}' to '{}' (connection {}): {}",
                        envelope.event.name(),
                        key.1,
                        connection.value(),
                        e
                    );
                    false
                }
            });
            if terminated || connections.is_empty() {
                clients.remove(&key);
            }
        }
    }
    tracing::debug!("Dispatch loop stopped");
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(
        &self,
        room_id: RoomId,
        user_id: UserId,
        sender: PusherChannel,
    ) -> ConnectionId {
        let connection = ConnectionId::new(self.next_connection.fetch_add(1, Ordering::Relaxed));
        let mut clients = self.clients.lock().await;
        let connections = clients.entry((room_id, user_id.clone())).or_default();
        connections.insert(connection, sender);
        tracing::debug!(
            "Client '{}' registered to room {} (connection {}, {} open)",
            user_id,
            room_id,
            connection.value(),
            connections.len()
        );
        connection
    }

    async fn unregister_connection(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        connection: ConnectionId,
    ) {
        let mut clients = self.clients.lock().await;
        let key = (*room_id, user_id.clone());
        let Some(connections) = clients.get_mut(&key) else {
            return;
        };
        if connections.remove(&connection).is_some() {
            tracing::debug!(
                "Connection {} of '{}' unregistered from room {}",
                connection.value(),
                user_id,
                room_id
            );
        }
        if connections.is_empty() {
            clients.remove(&key);
        }
    }

    async fn unregister_client(&self, room_id: &RoomId, user_id: &UserId) {
        let mut clients = self.clients.lock().await;
        clients.remove(&(*room_id, user_id.clone()));
        tracing::debug!("Client '{}' unregistered from room {}", user_id, room_id);
    }

    fn publish(&self, envelope: EventEnvelope) {
        let name = envelope.event.name();
        if self.queue.send(envelope).is_err() {
            tracing::warn!("Dispatch loop is gone, dropping '{}' event", name);
        }
    }
}
