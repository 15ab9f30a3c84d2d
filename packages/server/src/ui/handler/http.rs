//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    domain::{MessageId, RoomId},
    infrastructure::dto::{
        conversion::{message_dto, rendered_message_dto},
        http::{
            CreateRoomRequest, CreateRoomResponse, CredentialsDto, JoinByCodeRequest, JoinRequest,
            MessagePageDto, MessagesQuery, RoomDetailDto, RoomSummaryDto, SendMessageRequest,
            ShareProductRequest,
        },
        websocket::MessageDto,
    },
    ui::{identity::Identity, state::AppState},
    usecase::{CreateRoomCommand, RoomError},
};

use super::error::ApiError;

/// Path segment to room id. A malformed id cannot name an existing room.
pub(crate) fn parse_room_id(raw: &str) -> Result<RoomId, ApiError> {
    RoomId::parse(raw).map_err(|_| ApiError::Room(RoomError::NotFound))
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of active rooms
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    _identity: Identity,
) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.list_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.iter().map(RoomSummaryDto::from).collect())
}

/// Create a room. The creator joins as host.
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), ApiError> {
    let created = state
        .create_room_usecase
        .execute(CreateRoomCommand {
            creator_id: identity.user_id,
            creator_name: identity.display_name,
            name: request.name,
            description: request.description,
            capacity: request.capacity,
            require_password: request.require_password,
            kind: request.kind.into(),
        })
        .await?;

    let response = CreateRoomResponse {
        credentials: CredentialsDto {
            room_code: created.room.code.as_str().to_string(),
            password: created.password,
        },
        room: RoomDetailDto::from(&created.room),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Join with the shareable room code (and password, if the room has one)
pub async fn join_by_code(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(request): Json<JoinByCodeRequest>,
) -> Result<Json<RoomDetailDto>, ApiError> {
    let room = state
        .join_room_usecase
        .execute_by_code(
            &request.room_code,
            identity.user_id,
            identity.display_name,
            request.password.as_deref(),
        )
        .await?;
    Ok(Json(RoomDetailDto::from(&room)))
}

/// Join by internal id. The body is optional and only carries a password.
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(room_id): Path<String>,
    body: Bytes,
) -> Result<Json<RoomDetailDto>, ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let request = if body.is_empty() {
        JoinRequest::default()
    } else {
        serde_json::from_slice::<JoinRequest>(&body)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid request body: {e}")))?
    };

    let room = state
        .join_room_usecase
        .execute_by_id(
            &room_id,
            identity.user_id,
            identity.display_name,
            request.password.as_deref(),
        )
        .await?;
    Ok(Json(RoomDetailDto::from(&room)))
}

pub async fn leave_room(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let room = state
        .leave_room_usecase
        .execute(&room_id, &identity.user_id)
        .await?;
    Ok(Json(RoomDetailDto::from(&room)))
}

/// Host-only. Responds 200 with no body.
pub async fn terminate_room(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(room_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let room_id = parse_room_id(&room_id)?;
    state
        .terminate_room_usecase
        .execute(&room_id, &identity.user_id)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn get_room(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let room = state
        .get_room_usecase
        .execute(&room_id, &identity.user_id)
        .await?;
    Ok(Json(RoomDetailDto::from(&room)))
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(room_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let message = state
        .send_message_usecase
        .send_text(&room_id, &identity.user_id, request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message_dto(&room_id, &message))))
}

pub async fn share_product(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(room_id): Path<String>,
    Json(request): Json<ShareProductRequest>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let message = state
        .send_message_usecase
        .share_product(&room_id, &identity.user_id, request.product_id, request.note)
        .await?;
    Ok((StatusCode::CREATED, Json(message_dto(&room_id, &message))))
}

/// Paged message history (`?after=<message id>&limit=<n>`)
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(room_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessagePageDto>, ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let page = state
        .get_messages_usecase
        .execute(
            &room_id,
            &identity.user_id,
            query.after.map(MessageId::new),
            query.limit,
        )
        .await?;

    Ok(Json(MessagePageDto {
        messages: page
            .messages
            .into_iter()
            .map(|rendered| rendered_message_dto(&room_id, rendered))
            .collect(),
        has_more: page.has_more,
        next_cursor: page.next_cursor.map(|id| id.value()),
    }))
}
