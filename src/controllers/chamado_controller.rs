//! Controller de chamados
//!
//! Orquestra criação, negociação, pagamento e conclusão contra os
//! serviços do coordenador. Toda operação valida que o usuário é parte
//! do chamado antes de despachar o evento.

use uuid::Uuid;
use validator::Validate;

use crate::dto::chamado_dto::{
    ApiResponse, CancelChamadoRequest, ChamadoResponse, CreateChamadoRequest,
    PaymentConfirmedRequest, ProposeValueRequest,
};
use crate::metrics;
use crate::middleware::auth::{AuthenticatedUser, UserType};
use crate::repositories::chamado_repository::ChamadoRepository;
use crate::services::lifecycle_service::LifecycleService;
use crate::services::matching_service::MatchingService;
use crate::services::negotiation_service::NegotiationService;
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, AppError};

pub struct ChamadoController {
    repository: ChamadoRepository,
    lifecycle: LifecycleService,
    negotiation: NegotiationService,
    matching: MatchingService,
}

impl ChamadoController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: ChamadoRepository::new(state.pool.clone()),
            lifecycle: LifecycleService::new(
                state.pool.clone(),
                state.config.clone(),
                state.notifier.clone(),
            ),
            negotiation: NegotiationService::new(state.pool.clone(), state.notifier.clone()),
            matching: MatchingService::new(
                state.pool.clone(),
                state.config.clone(),
                state.notifier.clone(),
            ),
        }
    }

    /// Criar chamado e disparar o broadcast para prestadores próximos
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateChamadoRequest,
    ) -> Result<ApiResponse<ChamadoResponse>, AppError> {
        if user.user_type != UserType::Client {
            return Err(forbidden_error("create chamado", "only clients open chamados"));
        }
        request.validate()?;

        // Destino obrigatório se e somente se o serviço exige
        let requires_destination = request.service_type.requires_destination();
        if requires_destination && request.destination.is_none() {
            return Err(AppError::Validation(
                "Destino é obrigatório para serviço de reboque".to_string(),
            ));
        }
        if !requires_destination && request.destination.is_some() {
            return Err(AppError::Validation(
                "Serviço atendido no local não leva destino".to_string(),
            ));
        }

        if self
            .repository
            .find_active_by_user(user.user_id)
            .await?
            .is_some()
        {
            return Err(AppError::InvalidTransition(
                "Você já possui um chamado ativo".to_string(),
            ));
        }

        let destination = request.destination.map(|d| (d.lat, d.lng, d.address));
        let chamado = self
            .repository
            .create(
                user.user_id,
                request.service_type,
                request.origin.lat,
                request.origin.lng,
                request.origin.address,
                destination,
            )
            .await?;

        metrics::CHAMADOS_CREATED.inc();

        // Broadcast imediato; sem candidatos o chamado já volta cancelado
        self.matching.broadcast(&chamado).await?;

        let chamado = self
            .repository
            .find_by_id(chamado.id)
            .await?
            .ok_or_else(|| AppError::Internal("Chamado sumiu após o broadcast".to_string()))?;

        let message = if chamado.status == crate::models::chamado::ChamadoStatus::Canceled {
            "Nenhum prestador disponível no momento, tente novamente".to_string()
        } else {
            "Chamado criado, buscando prestadores próximos".to_string()
        };

        Ok(ApiResponse::success_with_message(chamado.into(), message))
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<ChamadoResponse, AppError> {
        let chamado = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Chamado with id '{}' not found", id)))?;

        if !chamado.is_party(user.user_id) {
            return Err(forbidden_error("view chamado", "user is not a party"));
        }

        Ok(chamado.into())
    }

    /// Chamado ativo do usuário (cliente ou prestador)
    pub async fn current_for_user(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<Option<ChamadoResponse>, AppError> {
        let chamado = self.repository.find_active_by_user(user.user_id).await?;
        Ok(chamado.map(ChamadoResponse::from))
    }

    pub async fn propose_value(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        request: ProposeValueRequest,
    ) -> Result<ApiResponse<ChamadoResponse>, AppError> {
        let chamado = self.negotiation.propose(id, user.user_id, request.value).await?;
        Ok(ApiResponse::success_with_message(
            chamado.into(),
            "Proposta registrada".to_string(),
        ))
    }

    pub async fn accept_value(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<ApiResponse<ChamadoResponse>, AppError> {
        let chamado = self.negotiation.accept(id, user.user_id).await?;
        Ok(ApiResponse::success_with_message(
            chamado.into(),
            "Valor acordado, aguardando pagamento".to_string(),
        ))
    }

    pub async fn cancel(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        request: CancelChamadoRequest,
    ) -> Result<ApiResponse<ChamadoResponse>, AppError> {
        let chamado = self
            .lifecycle
            .cancel(id, user.user_id, request.reason)
            .await?;
        Ok(ApiResponse::success_with_message(
            chamado.into(),
            "Chamado cancelado".to_string(),
        ))
    }

    pub async fn payment_confirmed(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        request: PaymentConfirmedRequest,
    ) -> Result<ApiResponse<ChamadoResponse>, AppError> {
        let chamado = self
            .lifecycle
            .payment_confirmed(id, user.user_id, request.amount)
            .await?;
        Ok(ApiResponse::success_with_message(
            chamado.into(),
            "Pagamento confirmado, serviço liberado".to_string(),
        ))
    }

    pub async fn request_finish(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<ApiResponse<ChamadoResponse>, AppError> {
        let chamado = self
            .lifecycle
            .provider_requests_finish(id, user.user_id)
            .await?;
        Ok(ApiResponse::success_with_message(
            chamado.into(),
            "Conclusão sinalizada, aguardando confirmação do cliente".to_string(),
        ))
    }

    pub async fn confirm_finish(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<ApiResponse<ChamadoResponse>, AppError> {
        let chamado = self.lifecycle.client_confirms(id, user.user_id).await?;
        Ok(ApiResponse::success_with_message(
            chamado.into(),
            "Chamado concluído".to_string(),
        ))
    }

    pub async fn dispute_finish(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<ApiResponse<ChamadoResponse>, AppError> {
        let chamado = self.lifecycle.client_disputes(id, user.user_id).await?;
        Ok(ApiResponse::success_with_message(
            chamado.into(),
            "Contestação registrada, serviço segue em andamento".to_string(),
        ))
    }
}
