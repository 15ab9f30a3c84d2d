//! WebSocket connection handlers.
//!
//! ルームの参加者だけが `/api/rooms/{room_id}/ws` に接続できます。接続はイベントの受信経路で
//! あり、参加状態とは独立しています。ソケットが切れてもルームからは退出しません。
//! 同じユーザーが複数の接続を開いた場合は、すべての接続にイベントが届きます。
//!
//! クライアントは `{"type":"chat","content":"..."}` を送ってテキストメッセージを投稿できます。

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, RoomId, UserId},
    infrastructure::dto::websocket::{ChatInput, ErrorMessage, MessageType},
    ui::{identity::Identity, state::AppState},
    usecase::RoomError,
};

use super::{error::ApiError, http::parse_room_id};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(room_id): Path<String>,
) -> Result<Response, ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let user_id = identity.user_id;

    // Create a channel for this client to receive events
    let (tx, rx) = mpsc::unbounded_channel();
    // 自分宛てのエラーフレーム用。配信側が sender を破棄したらチャンネルが閉じるよう弱参照にする
    let reply = tx.downgrade();

    // 参加者以外は接続できない
    let connection = state
        .connect_participant_usecase
        .execute(&room_id, &user_id, tx)
        .await?;
    tracing::info!(
        "'{}' connected to room {} (connection {})",
        user_id,
        room_id,
        connection.value()
    );

    let session = Session {
        room_id,
        user_id,
        connection,
    };
    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, state, session, rx, reply))
        .into_response())
}

/// Spawns a task that forwards queued frames to the WebSocket.
///
/// The channel closes when the client is unregistered (for example after
/// `room-terminated` was delivered); the socket is then closed as well.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    })
}

/// One registered socket
struct Session {
    room_id: RoomId,
    user_id: UserId,
    connection: ConnectionId,
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    session: Session,
    rx: mpsc::UnboundedReceiver<String>,
    reply: mpsc::WeakUnboundedSender<String>,
) {
    let Session {
        room_id,
        user_id,
        connection,
    } = session;
    let (sender, mut receiver) = socket.split();

    let state_clone = state.clone();
    let user_id_clone = user_id.clone();

    // Spawn a task to receive frames from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error from '{}': {}", user_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let result = handle_chat_frame(&state_clone, &room_id, &user_id_clone, &text).await;
                    if let Err(e) = result {
                        send_error(&reply, &e);
                    }
                }
                Message::Close(_) => {
                    tracing::debug!("'{}' requested close", user_id_clone);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // この接続の登録だけを解除する。同じユーザーの他の接続とルームの参加状態はそのまま
    state
        .connect_participant_usecase
        .disconnect(&room_id, &user_id, connection)
        .await;
    tracing::info!(
        "'{}' disconnected from room {} (connection {})",
        user_id,
        room_id,
        connection.value()
    );
}

async fn handle_chat_frame(
    state: &AppState,
    room_id: &RoomId,
    user_id: &UserId,
    text: &str,
) -> Result<(), RoomError> {
    let input = serde_json::from_str::<ChatInput>(text)
        .map_err(|e| RoomError::Validation(format!("Invalid frame: {e}")))?;
    if input.r#type != MessageType::Chat {
        return Err(RoomError::Validation(
            "Only chat frames can be sent".to_string(),
        ));
    }
    state
        .send_message_usecase
        .send_text(room_id, user_id, input.content)
        .await?;
    Ok(())
}

fn send_error(reply: &mpsc::WeakUnboundedSender<String>, error: &RoomError) {
    let frame = ErrorMessage {
        r#type: MessageType::Error,
        kind: error.kind().to_string(),
        message: error.to_string(),
    };
    let Some(reply) = reply.upgrade() else {
        return;
    };
    match serde_json::to_string(&frame) {
        Ok(json) => {
            let _ = reply.send(json);
        }
        Err(e) => tracing::warn!("Failed to encode error frame: {}", e),
    }
}
