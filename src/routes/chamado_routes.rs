use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::chamado_controller::ChamadoController;
use crate::dto::chamado_dto::{
    ApiResponse, CancelChamadoRequest, ChamadoResponse, CreateChamadoRequest,
    PaymentConfirmedRequest, ProposeValueRequest,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_chamado_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_chamado))
        .route("/current", get(current_chamado))
        .route("/:id", get(get_chamado))
        .route("/:id/propose", post(propose_value))
        .route("/:id/accept-value", post(accept_value))
        .route("/:id/cancel", post(cancel_chamado))
        .route("/:id/payment-confirmed", post(payment_confirmed))
        .route("/:id/finish-request", post(request_finish))
        .route("/:id/confirm", post(confirm_finish))
        .route("/:id/dispute", post(dispute_finish))
}

async fn create_chamado(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateChamadoRequest>,
) -> Result<Json<ApiResponse<ChamadoResponse>>, AppError> {
    let controller = ChamadoController::new(&state);
    let response = controller.create(&user, request).await?;
    Ok(Json(response))
}

async fn current_chamado(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Option<ChamadoResponse>>, AppError> {
    let controller = ChamadoController::new(&state);
    let response = controller.current_for_user(&user).await?;
    Ok(Json(response))
}

async fn get_chamado(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChamadoResponse>, AppError> {
    let controller = ChamadoController::new(&state);
    let response = controller.get_by_id(id, &user).await?;
    Ok(Json(response))
}

async fn propose_value(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ProposeValueRequest>,
) -> Result<Json<ApiResponse<ChamadoResponse>>, AppError> {
    let controller = ChamadoController::new(&state);
    let response = controller.propose_value(id, &user, request).await?;
    Ok(Json(response))
}

async fn accept_value(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ChamadoResponse>>, AppError> {
    let controller = ChamadoController::new(&state);
    let response = controller.accept_value(id, &user).await?;
    Ok(Json(response))
}

async fn cancel_chamado(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelChamadoRequest>,
) -> Result<Json<ApiResponse<ChamadoResponse>>, AppError> {
    let controller = ChamadoController::new(&state);
    let response = controller.cancel(id, &user, request).await?;
    Ok(Json(response))
}

async fn payment_confirmed(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<PaymentConfirmedRequest>,
) -> Result<Json<ApiResponse<ChamadoResponse>>, AppError> {
    let controller = ChamadoController::new(&state);
    let response = controller.payment_confirmed(id, &user, request).await?;
    Ok(Json(response))
}

async fn request_finish(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ChamadoResponse>>, AppError> {
    let controller = ChamadoController::new(&state);
    let response = controller.request_finish(id, &user).await?;
    Ok(Json(response))
}

async fn confirm_finish(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ChamadoResponse>>, AppError> {
    let controller = ChamadoController::new(&state);
    let response = controller.confirm_finish(id, &user).await?;
    Ok(Json(response))
}

async fn dispute_finish(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ChamadoResponse>>, AppError> {
    let controller = ChamadoController::new(&state);
    let response = controller.dispute_finish(id, &user).await?;
    Ok(Json(response))
}
