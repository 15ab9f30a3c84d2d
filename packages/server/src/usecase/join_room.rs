//! UseCase: ルーム参加
//!
//! ## 判定順序
//!
//! 1. ルームが存在しない / 非アクティブ → `NotFound`
//! 2. パスワードが必要で一致しない → `AuthError`
//! 3. すでに参加済み → 何もせず現在のスナップショットを返す（冪等）
//! 4. 定員に達している → `CapacityExceeded`
//!
//! パスワード検証は重い処理なので Room のロックの外かつブロッキング用スレッドで行い、
//! その後ロックを取り直して定員チェックと追加を 1 つの不可分な操作として実行します。

use std::sync::Arc;

use kaimono_shared::time::Clock;

use crate::domain::{
    CredentialIssuer, DisplayName, EventEnvelope, JoinOutcome, MessagePusher, RoomCode,
    RoomEvent, RoomHandle, RoomId, RoomRepository, RoomSnapshot, Timestamp, UserId,
};

use super::{error::RoomError, password::verify_password};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    credentials: Arc<dyn CredentialIssuer>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        credentials: Arc<dyn CredentialIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            credentials,
            clock,
        }
    }

    /// 共有コード（+ パスワード）で参加
    pub async fn execute_by_code(
        &self,
        room_code: &str,
        user_id: UserId,
        display_name: DisplayName,
        password: Option<&str>,
    ) -> Result<RoomSnapshot, RoomError> {
        // 形式が不正なコードに一致するルームは存在しない
        let code = RoomCode::new(room_code.to_string()).map_err(|_| RoomError::NotFound)?;
        let handle = self
            .repository
            .find_by_code(&code)
            .await
            .ok_or(RoomError::NotFound)?;
        self.join(handle, user_id, display_name, password).await
    }

    /// 内部 ID で参加（ルーム一覧からの参加）
    pub async fn execute_by_id(
        &self,
        room_id: &RoomId,
        user_id: UserId,
        display_name: DisplayName,
        password: Option<&str>,
    ) -> Result<RoomSnapshot, RoomError> {
        let handle = self
            .repository
            .find_by_id(room_id)
            .await
            .ok_or(RoomError::NotFound)?;
        self.join(handle, user_id, display_name, password).await
    }

    async fn join(
        &self,
        handle: RoomHandle,
        user_id: UserId,
        display_name: DisplayName,
        password: Option<&str>,
    ) -> Result<RoomSnapshot, RoomError> {
        // 1. 存在確認とパスワードハッシュの取得（ハッシュは作成後に変わらない）
        let password_hash = {
            let room = handle.lock().await;
            room.ensure_active()?;
            room.password_hash.clone()
        };

        // 2. パスワード検証（ロックの外、ブロッキング用スレッドで実行）
        if let Some(hash) = password_hash {
            let supplied = password.unwrap_or_default().to_string();
            if !verify_password(&self.credentials, supplied, hash).await? {
                tracing::warn!("'{}' supplied an invalid room password", user_id);
                return Err(RoomError::AuthError);
            }
        }

        // 3. 参加処理（ロック内で不可分に実行）
        let mut room = handle.lock().await;
        let now = Timestamp::new(self.clock.now_millis());
        match room.add_participant(user_id.clone(), display_name, now) {
            Ok(JoinOutcome::Joined(participant)) => {
                let recipients = room
                    .member_ids()
                    .into_iter()
                    .filter(|id| id != &user_id)
                    .collect();
                self.message_pusher.publish(EventEnvelope {
                    recipients,
                    event: RoomEvent::ParticipantJoined {
                        room_id: room.id,
                        is_host: room.is_host(&participant.user_id),
                        participant,
                        participant_count: room.participants.len(),
                    },
                });
                tracing::info!(
                    "'{}' joined room {} ({}/{})",
                    user_id,
                    room.code,
                    room.participants.len(),
                    room.capacity.value()
                );
                Ok(room.snapshot())
            }
            Ok(JoinOutcome::AlreadyMember) => {
                tracing::debug!("'{}' is already in room {}", user_id, room.code);
                Ok(room.snapshot())
            }
            Err(e) => {
                tracing::warn!("'{}' could not join room {}: {}", user_id, room.code, e);
                Err(e.into())
            }
        }
    }
}
