//! UseCase: メッセージ投稿（テキスト / 商品共有）
//!
//! ## 設計ノート
//!
//! - 投稿できるのはアクティブなルームの現在の参加者のみ。終了したルームへの投稿は
//!   `NotFound` ではなく `Forbidden` として扱います（ルームの存在自体は分かっているため）。
//! - 商品 ID の解決は読み出し時に行うので、投稿時に外部の商品検索を待つことはありません。
//! - 配信イベントは送信者を含む全参加者に送られます。送信者側の画面もイベントで更新されるため。

use std::sync::Arc;

use kaimono_shared::time::Clock;

use crate::domain::{
    EventEnvelope, Message, MessageContent, MessagePayload, MessagePusher, ProductId,
    RoomEvent, RoomId, RoomRepository, RoomRuleError, Timestamp, UserId,
};

use super::error::RoomError;

/// メッセージ投稿のユースケース
pub struct SendMessageUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// テキストメッセージを投稿
    pub async fn send_text(
        &self,
        room_id: &RoomId,
        sender_id: &UserId,
        content: String,
    ) -> Result<Message, RoomError> {
        let content = MessageContent::new(content)?;
        self.execute(room_id, sender_id, MessagePayload::Text(content))
            .await
    }

    /// 商品を共有（ノートは任意）
    pub async fn share_product(
        &self,
        room_id: &RoomId,
        sender_id: &UserId,
        product_id: String,
        note: Option<String>,
    ) -> Result<Message, RoomError> {
        let product_id = ProductId::new(product_id)?;
        // 空白だけのノートは省略扱い
        let note = match note {
            Some(note) if !note.trim().is_empty() => Some(MessageContent::new(note)?),
            _ => None,
        };
        self.execute(
            room_id,
            sender_id,
            MessagePayload::ProductShare { product_id, note },
        )
        .await
    }

    /// メッセージをログに追加し、全参加者に配信する
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - 追加されたメッセージ
    /// * `Err(RoomError::NotFound)` - ルームが存在しない
    /// * `Err(RoomError::Forbidden)` - 参加者ではない、またはルームが終了している
    pub async fn execute(
        &self,
        room_id: &RoomId,
        sender_id: &UserId,
        payload: MessagePayload,
    ) -> Result<Message, RoomError> {
        let handle = self
            .repository
            .find_by_id(room_id)
            .await
            .ok_or(RoomError::NotFound)?;

        let mut room = handle.lock().await;
        let now = Timestamp::new(self.clock.now_millis());
        let message = match room.append_message(sender_id, payload, now) {
            Ok(message) => message,
            Err(RoomRuleError::Inactive) => {
                tracing::warn!("'{}' posted to ended room {}", sender_id, room.code);
                return Err(RoomError::Forbidden("Room is no longer active".to_string()));
            }
            Err(e) => {
                tracing::warn!("'{}' could not post to room {}: {}", sender_id, room.code, e);
                return Err(e.into());
            }
        };

        self.message_pusher.publish(EventEnvelope {
            recipients: room.member_ids(),
            event: RoomEvent::for_message(room.id, message.clone()),
        });
        tracing::debug!(
            "Message #{} ({}) appended to room {} by '{}'",
            message.id.value(),
            message.kind().as_str(),
            room.code,
            sender_id
        );
        Ok(message)
    }
}
