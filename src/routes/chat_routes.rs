use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::chat_controller::ChatController;
use crate::dto::chat_dto::{ChatMessageResponse, SendMessageRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_chat_router() -> Router<AppState> {
    Router::new()
        .route("/:id/messages", get(list_messages))
        .route("/:id/messages", post(send_message))
}

async fn list_messages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessageResponse>>, AppError> {
    let controller = ChatController::new(&state);
    let response = controller.list(id, &user).await?;
    Ok(Json(response))
}

async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ChatMessageResponse>, AppError> {
    let controller = ChatController::new(&state);
    let response = controller.send(id, &user, request).await?;
    Ok(Json(response))
}
