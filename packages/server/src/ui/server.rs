//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use kaimono_shared::time::{Clock, SystemClock};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::{CredentialIssuer, MessagePusher, ProductLookup, RoomRepository},
    infrastructure::{
        credential::Argon2CredentialIssuer, message_pusher::WebSocketMessagePusher,
        repository::InMemoryRoomRepository,
    },
    usecase::{
        ConnectParticipantUseCase, CreateRoomUseCase, GetMessagesUseCase, GetRoomUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, ListRoomsUseCase, ReclaimIdleRoomsUseCase,
        SendMessageUseCase, TerminateRoomUseCase,
    },
};

use super::{
    handler::{
        create_room, get_messages, get_room, health_check, join_by_code, join_room, leave_room,
        list_rooms, send_message, share_product, terminate_room, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Shopping room server
///
/// # Example
///
/// ```ignore
/// let server = Server::from_config(&config, products);
/// let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
/// server.run(listener).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    /// ReclaimIdleRoomsUseCase（アイドルルーム回収のユースケース）
    reclaim_usecase: Arc<ReclaimIdleRoomsUseCase>,
    sweep_interval: Duration,
}

impl Server {
    pub fn new(
        state: AppState,
        reclaim_usecase: Arc<ReclaimIdleRoomsUseCase>,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            state: Arc::new(state),
            reclaim_usecase,
            sweep_interval,
        }
    }

    /// Wire the in-memory implementations together.
    ///
    /// Must be called inside a Tokio runtime (the message pusher starts its dispatch loop).
    pub fn from_config(config: &ServerConfig, products: Arc<dyn ProductLookup>) -> Self {
        // Initialize dependencies in order:
        // 1. Repository
        // 2. MessagePusher
        // 3. UseCases
        // 4. AppState
        let repository: Arc<dyn RoomRepository> = Arc::new(InMemoryRoomRepository::new());
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());
        let credentials: Arc<dyn CredentialIssuer> = Arc::new(Argon2CredentialIssuer::new());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let state = AppState {
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                repository.clone(),
                credentials.clone(),
                clock.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                credentials,
                clock.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            terminate_room_usecase: Arc::new(TerminateRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            get_messages_usecase: Arc::new(GetMessagesUseCase::new(
                repository.clone(),
                products,
                config.default_page_limit,
                config.max_page_limit,
            )),
            get_room_usecase: Arc::new(GetRoomUseCase::new(repository.clone())),
            list_rooms_usecase: Arc::new(ListRoomsUseCase::new(repository.clone())),
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
        };
        let reclaim_usecase = Arc::new(ReclaimIdleRoomsUseCase::new(
            repository,
            message_pusher,
            clock,
            config.idle_room_ttl,
            config.tombstone_retention,
        ));

        Self::new(state, reclaim_usecase, config.sweep_interval)
    }

    /// Build the axum router
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/api/rooms/{room_id}/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(list_rooms).post(create_room))
            .route("/api/rooms/join", post(join_by_code))
            .route("/api/rooms/{room_id}", get(get_room))
            .route("/api/rooms/{room_id}/join", post(join_room))
            .route("/api/rooms/{room_id}/leave", post(leave_room))
            .route("/api/rooms/{room_id}/terminate", post(terminate_room))
            .route(
                "/api/rooms/{room_id}/messages",
                get(get_messages).post(send_message),
            )
            .route("/api/rooms/{room_id}/products", post(share_product))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if there's an error during server execution.
    pub async fn run(
        self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run until `shutdown` resolves
    pub async fn run_until<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Room server listening on {}", listener.local_addr()?);

        let app = self.router();
        let reclaimer = self.reclaim_usecase.clone().spawn_periodic(self.sweep_interval);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;
        reclaimer.abort();
        result?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
