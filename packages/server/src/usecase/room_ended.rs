//! 終了したルームの後処理
//!
//! ルームが終了する経路（ホストによる終了・退出・アイドル回収）はすべてここを通り、
//! `room-terminated` の通知とルームコードの解放を同じ手順で行います。
//! 呼び出し側は Room のロックを保持したままにしておくこと。

use crate::domain::{EventEnvelope, MessagePusher, Room, RoomEvent, RoomRepository, UserId};

/// Notify `recipients` that the room ended and free its code.
///
/// Does nothing while the room is still active.
pub(super) async fn finish_ended_room(
    repository: &dyn RoomRepository,
    message_pusher: &dyn MessagePusher,
    room: &Room,
    recipients: Vec<UserId>,
) {
    let (false, Some(reason), Some(terminated_at)) =
        (room.is_active, room.termination_reason, room.deactivated_at)
    else {
        tracing::warn!("Room {} is still active, not announcing its end", room.code);
        return;
    };

    message_pusher.publish(EventEnvelope {
        recipients,
        event: RoomEvent::RoomTerminated {
            room_id: room.id,
            reason,
            terminated_at,
        },
    });
    repository.release_code(&room.code, &room.id).await;
    tracing::info!("Room {} ended ({})", room.code, reason.as_str());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            TerminationReason, Timestamp,
            test_support::{open_room, user},
        },
        infrastructure::repository::InMemoryRoomRepository,
        usecase::test_support::RecordingPusher,
    };

    #[tokio::test]
    async fn test_ended_room_is_announced_and_code_released() {
        // テスト項目: 終了したルームは room-terminated が通知され、コードが解放される
        // given (前提条件):
        let repository = InMemoryRoomRepository::new();
        let pusher = RecordingPusher::default();
        let handle = repository.insert(open_room("alice", 4)).await.unwrap();
        let mut room = handle.lock().await;
        room.deactivate(TerminationReason::Idle, Timestamp::new(5_000));

        // when (操作):
        finish_ended_room(&repository, &pusher, &room, vec![user("alice")]).await;

        // then (期待する結果):
        let envelope = pusher.last().unwrap();
        assert_eq!(envelope.recipients, vec![user("alice")]);
        assert_eq!(
            envelope.event,
            RoomEvent::RoomTerminated {
                room_id: room.id,
                reason: TerminationReason::Idle,
                terminated_at: Timestamp::new(5_000),
            }
        );
        assert!(repository.find_by_code(&room.code).await.is_none());
    }

    #[tokio::test]
    async fn test_active_room_is_left_alone() {
        // テスト項目: アクティブなルームに対しては通知もコード解放も行わない
        // given (前提条件):
        let repository = InMemoryRoomRepository::new();
        let pusher = RecordingPusher::default();
        let handle = repository.insert(open_room("alice", 4)).await.unwrap();
        let room = handle.lock().await;

        // when (操作):
        finish_ended_room(&repository, &pusher, &room, vec![user("alice")]).await;

        // then (期待する結果):
        assert!(pusher.envelopes().is_empty());
        assert!(repository.find_by_code(&room.code).await.is_some());
    }
}
