//! DTOs de oferta

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::dto::chamado_dto::ChamadoResponse;
use crate::models::offer::{ChamadoOffer, OfferStatus};

/// Response de oferta
#[derive(Debug, Serialize)]
pub struct OfferResponse {
    pub id: Uuid,
    pub chamado_id: Uuid,
    pub provider_id: Uuid,
    pub status: OfferStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<ChamadoOffer> for OfferResponse {
    fn from(offer: ChamadoOffer) -> Self {
        Self {
            id: offer.id,
            chamado_id: offer.chamado_id,
            provider_id: offer.provider_id,
            status: offer.status,
            expires_at: offer.expires_at,
            created_at: offer.created_at,
        }
    }
}

/// Oferta pendente com os dados do chamado para a tela do prestador
#[derive(Debug, Serialize)]
pub struct PendingOfferResponse {
    pub offer: OfferResponse,
    pub chamado: ChamadoResponse,
}
