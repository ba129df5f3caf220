//! Controller de ofertas
//!
//! Tela do prestador: consultar a oferta pendente, aceitar (claim) ou
//! recusar dentro da janela.

use uuid::Uuid;

use crate::dto::chamado_dto::{ApiResponse, ChamadoResponse};
use crate::dto::offer_dto::{OfferResponse, PendingOfferResponse};
use crate::middleware::auth::{AuthenticatedUser, UserType};
use crate::services::matching_service::MatchingService;
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, AppError};

pub struct OfferController {
    matching: MatchingService,
}

impl OfferController {
    pub fn new(state: &AppState) -> Self {
        Self {
            matching: MatchingService::new(
                state.pool.clone(),
                state.config.clone(),
                state.notifier.clone(),
            ),
        }
    }

    fn ensure_provider(user: &AuthenticatedUser) -> Result<(), AppError> {
        if user.user_type != UserType::Provider {
            return Err(forbidden_error("handle offer", "only providers receive offers"));
        }
        Ok(())
    }

    /// Oferta pendente para a tela do prestador
    pub async fn pending(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<Option<PendingOfferResponse>, AppError> {
        Self::ensure_provider(user)?;

        let pending = self.matching.pending_offer_for(user.user_id).await?;
        Ok(pending.map(|(offer, chamado)| PendingOfferResponse {
            offer: OfferResponse::from(offer),
            chamado: ChamadoResponse::from(chamado),
        }))
    }

    /// Claim: exatamente um prestador concorrente leva o chamado
    pub async fn accept(
        &self,
        chamado_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<ApiResponse<ChamadoResponse>, AppError> {
        Self::ensure_provider(user)?;

        let chamado = self.matching.accept_offer(chamado_id, user.user_id).await?;
        Ok(ApiResponse::success_with_message(
            chamado.into(),
            "Chamado atribuído, inicie a negociação".to_string(),
        ))
    }

    pub async fn decline(
        &self,
        chamado_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<(), AppError> {
        Self::ensure_provider(user)?;
        self.matching.decline_offer(chamado_id, user.user_id).await
    }
}
