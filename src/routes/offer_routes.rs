use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::offer_controller::OfferController;
use crate::dto::chamado_dto::{ApiResponse, ChamadoResponse};
use crate::dto::offer_dto::PendingOfferResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_offer_router() -> Router<AppState> {
    Router::new()
        .route("/pending", get(pending_offer))
        .route("/:chamado_id/accept", post(accept_offer))
        .route("/:chamado_id/decline", post(decline_offer))
}

async fn pending_offer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Option<PendingOfferResponse>>, AppError> {
    let controller = OfferController::new(&state);
    let response = controller.pending(&user).await?;
    Ok(Json(response))
}

async fn accept_offer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(chamado_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ChamadoResponse>>, AppError> {
    let controller = OfferController::new(&state);
    let response = controller.accept(chamado_id, &user).await?;
    Ok(Json(response))
}

async fn decline_offer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(chamado_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = OfferController::new(&state);
    controller.decline(chamado_id, &user).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Oferta recusada"
    })))
}
