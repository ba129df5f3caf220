//! Modelo de oferta de chamado
//!
//! Registro de broadcast: uma oferta temporizada por prestador
//! selecionado. Exatamente uma oferta pendente vira aceite (claim); as
//! demais são retiradas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Status da oferta enviada a um prestador
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "offer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
    Withdrawn,
}

/// Oferta - mapeia a tabela chamado_offers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChamadoOffer {
    pub id: Uuid,
    pub chamado_id: Uuid,
    pub provider_id: Uuid,
    pub status: OfferStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ChamadoOffer {
    /// Oferta ainda aceitável neste instante
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == OfferStatus::Pending && self.expires_at > now
    }
}
