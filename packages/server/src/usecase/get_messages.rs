//! UseCase: メッセージ履歴のページ取得
//!
//! カーソルは「最後に受け取ったメッセージ ID」です。オフセットではないので、
//! ページングの途中で新しいメッセージが追加されても欠落・重複は起きません。
//!
//! 商品共有メッセージはこのタイミングで `ProductLookup` を使って商品情報を付与します。
//! 外部の検索はルームのロックを解放した後に行います。

use std::sync::Arc;

use crate::domain::{
    MessageId, ProductLookup, RenderedMessage, RoomId, RoomRepository, UserId,
};

use super::error::RoomError;

/// One page of rendered messages plus the cursor for the next one
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub messages: Vec<RenderedMessage>,
    pub has_more: bool,
    pub next_cursor: Option<MessageId>,
}

/// メッセージ履歴取得のユースケース
pub struct GetMessagesUseCase {
    repository: Arc<dyn RoomRepository>,
    products: Arc<dyn ProductLookup>,
    default_limit: usize,
    max_limit: usize,
}

impl GetMessagesUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        products: Arc<dyn ProductLookup>,
        default_limit: usize,
        max_limit: usize,
    ) -> Self {
        Self {
            repository,
            products,
            default_limit,
            max_limit,
        }
    }

    /// # Arguments
    ///
    /// * `after` - このメッセージ ID より後を返す（`None` なら先頭から）
    /// * `limit` - 最大件数（`None` ならデフォルト、上限を超える値は上限に丸める）
    pub async fn execute(
        &self,
        room_id: &RoomId,
        requester: &UserId,
        after: Option<MessageId>,
        limit: Option<usize>,
    ) -> Result<RenderedPage, RoomError> {
        let limit = match limit {
            Some(0) => {
                return Err(RoomError::Validation(
                    "limit must be greater than zero".to_string(),
                ));
            }
            Some(limit) => limit.min(self.max_limit),
            None => self.default_limit,
        };

        let handle = self
            .repository
            .find_by_id(room_id)
            .await
            .ok_or(RoomError::NotFound)?;

        let page = {
            let room = handle.lock().await;
            room.ensure_active()?;
            if !room.is_participant(requester) {
                return Err(RoomError::not_participant());
            }
            room.page_messages(after, limit)
        };

        let next_cursor = page.next_cursor();
        let mut messages = Vec::with_capacity(page.messages.len());
        for message in page.messages {
            let product = match message.product_id() {
                Some(product_id) => {
                    let found = self.products.lookup(product_id).await;
                    if found.is_none() {
                        tracing::debug!("Product '{}' could not be resolved", product_id.as_str());
                    }
                    found
                }
                None => None,
            };
            messages.push(RenderedMessage { message, product });
        }

        Ok(RenderedPage {
            messages,
            has_more: page.has_more,
            next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ProductId, ProductSummary,
            test_support::{name, user},
        },
        infrastructure::product::InMemoryProductCatalog,
        usecase::{
            JoinRoomUseCase, SendMessageUseCase, TerminateRoomUseCase,
            test_support::Fixture,
        },
    };

    fn catalog() -> Arc<InMemoryProductCatalog> {
        Arc::new(InMemoryProductCatalog::new(vec![ProductSummary {
            id: ProductId::new("sku-1".to_string()).unwrap(),
            name: "Trail runner".to_string(),
            price: 89.5,
            currency: "USD".to_string(),
            image_url: None,
        }]))
    }

    fn get_usecase(fixture: &Fixture) -> GetMessagesUseCase {
        GetMessagesUseCase::new(fixture.repository.clone(), catalog(), 50, 5)
    }

    fn send_usecase(fixture: &Fixture) -> SendMessageUseCase {
        SendMessageUseCase::new(
            fixture.repository.clone(),
            fixture.pusher.clone(),
            fixture.clock.clone(),
        )
    }

    async fn room_with_messages(fixture: &Fixture, count: usize) -> RoomId {
        let created = fixture.create_room("alice", 4, false).await;
        let send = send_usecase(fixture);
        for i in 1..=count {
            send.send_text(&created.room.id, &user("alice"), format!("m{i}"))
                .await
                .unwrap();
        }
        created.room.id
    }

    #[tokio::test]
    async fn test_pages_walk_full_log() {
        // テスト項目: カーソルを辿ると全メッセージを順番通りに取得できる
        // given (前提条件):
        let fixture = Fixture::new();
        let room_id = room_with_messages(&fixture, 7).await;
        let usecase = get_usecase(&fixture);

        // when (操作):
        let first = usecase
            .execute(&room_id, &user("alice"), None, Some(3))
            .await
            .unwrap();
        let second = usecase
            .execute(&room_id, &user("alice"), first.next_cursor, Some(3))
            .await
            .unwrap();
        let third = usecase
            .execute(&room_id, &user("alice"), second.next_cursor, Some(3))
            .await
            .unwrap();

        // then (期待する結果):
        let contents: Vec<String> = [&first, &second, &third]
            .iter()
            .flat_map(|page| page.messages.iter().map(|m| m.message.content().to_string()))
            .collect();
        assert_eq!(contents, vec!["m1", "m2", "m3", "m4", "m5", "m6", "m7"]);
        assert!(first.has_more);
        assert!(second.has_more);
        assert!(!third.has_more);
    }

    #[tokio::test]
    async fn test_append_during_pagination_is_not_skipped() {
        // テスト項目: ページングの途中で追加されたメッセージも欠落しない
        // given (前提条件):
        let fixture = Fixture::new();
        let room_id = room_with_messages(&fixture, 2).await;
        let usecase = get_usecase(&fixture);
        let first = usecase
            .execute(&room_id, &user("alice"), None, Some(2))
            .await
            .unwrap();

        // when (操作):
        send_usecase(&fixture)
            .send_text(&room_id, &user("alice"), "late".to_string())
            .await
            .unwrap();
        let second = usecase
            .execute(&room_id, &user("alice"), first.next_cursor, Some(2))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!first.has_more);
        assert_eq!(second.messages.len(), 1);
        assert_eq!(second.messages[0].message.content(), "late");
    }

    #[tokio::test]
    async fn test_limit_handling() {
        // テスト項目: limit 未指定はデフォルト、上限超過は丸め、0 は ValidationError
        // given (前提条件):
        let fixture = Fixture::new();
        let room_id = room_with_messages(&fixture, 8).await;
        let usecase = get_usecase(&fixture);

        // when (操作):
        let default = usecase
            .execute(&room_id, &user("alice"), None, None)
            .await
            .unwrap();
        let clamped = usecase
            .execute(&room_id, &user("alice"), None, Some(100))
            .await
            .unwrap();
        let zero = usecase.execute(&room_id, &user("alice"), None, Some(0)).await;

        // then (期待する結果):
        assert_eq!(default.messages.len(), 8);
        assert_eq!(clamped.messages.len(), 5);
        assert!(matches!(zero, Err(RoomError::Validation(_))));
    }

    #[tokio::test]
    async fn test_product_shares_are_enriched() {
        // テスト項目: 商品共有メッセージには商品情報が付与され、未知の商品は None になる
        // given (前提条件):
        let fixture = Fixture::new();
        let created = fixture.create_room("alice", 4, false).await;
        let send = send_usecase(&fixture);
        for sku in ["sku-1", "sku-unknown"] {
            send.share_product(&created.room.id, &user("alice"), sku.to_string(), None)
                .await
                .unwrap();
        }
        send.send_text(&created.room.id, &user("alice"), "plain".to_string())
            .await
            .unwrap();

        // when (操作):
        let page = get_usecase(&fixture)
            .execute(&created.room.id, &user("alice"), None, None)
            .await
            .unwrap();

        // then (期待する結果):
        let products: Vec<Option<&str>> = page
            .messages
            .iter()
            .map(|m| m.product.as_ref().map(|p| p.name.as_str()))
            .collect();
        assert_eq!(products, vec![Some("Trail runner"), None, None]);
    }

    #[tokio::test]
    async fn test_only_participants_can_read() {
        // テスト項目: 参加者以外は Forbidden、終了したルームは NotFound
        // given (前提条件):
        let fixture = Fixture::new();
        let room_id = room_with_messages(&fixture, 1).await;
        JoinRoomUseCase::new(
            fixture.repository.clone(),
            fixture.pusher.clone(),
            fixture.issuer.clone(),
            fixture.clock.clone(),
        )
        .execute_by_id(&room_id, user("bob"), name("Bob"), None)
        .await
        .unwrap();
        let usecase = get_usecase(&fixture);

        // when (操作):
        let stranger = usecase.execute(&room_id, &user("mallory"), None, None).await;
        let member = usecase.execute(&room_id, &user("bob"), None, None).await;
        TerminateRoomUseCase::new(
            fixture.repository.clone(),
            fixture.pusher.clone(),
            fixture.clock.clone(),
        )
        .execute(&room_id, &user("alice"))
        .await
        .unwrap();
        let after_end = usecase.execute(&room_id, &user("alice"), None, None).await;

        // then (期待する結果):
        assert!(matches!(stranger, Err(RoomError::Forbidden(_))));
        assert_eq!(member.unwrap().messages.len(), 1);
        assert_eq!(after_end, Err(RoomError::NotFound));
    }
}
