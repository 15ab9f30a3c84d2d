//! UseCase: アイドルルームの回収
//!
//! 一時ルーム（`RoomKind::Ephemeral`）は最後の操作から TTL を過ぎると終了させ、
//! 参加者に `room-terminated`（reason: `idle`）を通知します。
//! 終了済みのルーム（トゥームストーン）は保持期間を過ぎたらレジストリから削除します。
//! 保持期間の間は `find_by_id` が引き続きルームを返すので、終了済みルームへの操作は
//! `NotFound` / `Forbidden` として扱われます。

use std::{sync::Arc, time::Duration};

use kaimono_shared::time::Clock;
use tokio::task::JoinHandle;

use crate::domain::{MessagePusher, RoomId, RoomRepository, TerminationReason, Timestamp};

use super::room_ended::finish_ended_room;

/// Result of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReclaimReport {
    /// Rooms ended because they were idle
    pub reclaimed: Vec<RoomId>,
    /// Inactive rooms dropped from the registry
    pub purged: Vec<RoomId>,
}

/// アイドルルーム回収のユースケース
pub struct ReclaimIdleRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    /// `None` disables idle reclamation (tombstones are still purged)
    idle_ttl: Option<Duration>,
    tombstone_retention: Duration,
}

impl ReclaimIdleRoomsUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        idle_ttl: Option<Duration>,
        tombstone_retention: Duration,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
            idle_ttl,
            tombstone_retention,
        }
    }

    /// 1 回分の回収を実行
    pub async fn execute(&self) -> ReclaimReport {
        let now = Timestamp::new(self.clock.now_millis());
        let ttl_millis = self.idle_ttl.map(duration_millis);
        let retention_millis = duration_millis(self.tombstone_retention);
        let mut report = ReclaimReport::default();

        for handle in self.repository.all_handles().await {
            let mut room = handle.lock().await;

            if let Some(ttl) = ttl_millis
                && room.is_idle(now, ttl)
            {
                let members: Vec<_> = room
                    .deactivate(TerminationReason::Idle, now)
                    .into_iter()
                    .map(|p| p.user_id)
                    .collect();
                finish_ended_room(
                    self.repository.as_ref(),
                    self.message_pusher.as_ref(),
                    &room,
                    members,
                )
                .await;
                report.reclaimed.push(room.id);
                continue;
            }

            if let Some(deactivated_at) = room.deactivated_at
                && now.elapsed_since(deactivated_at) >= retention_millis
            {
                report.purged.push(room.id);
            }
        }

        // Room のロックを保持しない状態でレジストリから削除する
        for id in &report.purged {
            self.repository.remove(id).await;
        }
        if !report.purged.is_empty() {
            tracing::debug!("Purged {} ended room(s)", report.purged.len());
        }
        report
    }

    /// 一定間隔で `execute` を実行するバックグラウンドタスクを起動
    pub fn spawn_periodic(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // 最初の tick は即座に完了する
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let report = self.execute().await;
                if !report.reclaimed.is_empty() {
                    tracing::info!("Reclaimed {} idle room(s)", report.reclaimed.len());
                }
            }
        })
    }
}

fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
