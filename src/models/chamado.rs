//! Modelo de Chamado
//!
//! O chamado é a raiz do agregado: cliente + prestador + tipo de serviço +
//! valor negociado + status. Criado pelo cliente, pertence ao coordenador
//! pelo resto da vida e nunca é destruído por código de aplicação.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::fee::CommissionSource;

/// Tipo de serviço solicitado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "service_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Tow,
    Tire,
    Mechanic,
    Locksmith,
}

impl ServiceType {
    /// Apenas reboque leva o veículo a um destino; os demais serviços
    /// são atendidos no local.
    pub fn requires_destination(&self) -> bool {
        matches!(self, ServiceType::Tow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Tow => "tow",
            ServiceType::Tire => "tire",
            ServiceType::Mechanic => "mechanic",
            ServiceType::Locksmith => "locksmith",
        }
    }
}

impl sqlx::postgres::PgHasArrayType for ServiceType {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_service_type")
    }
}

/// Status do ciclo de vida do chamado
///
/// A tabela de transições autoritativa vive em
/// `services::lifecycle_service::transition`; as telas apenas renderizam
/// este enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "chamado_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChamadoStatus {
    Searching,
    Negotiating,
    AwaitingPayment,
    InService,
    PendingConfirmation,
    Finished,
    Canceled,
}

impl ChamadoStatus {
    /// Estados terminais não admitem mais nenhuma mutação
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChamadoStatus::Finished | ChamadoStatus::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChamadoStatus::Searching => "searching",
            ChamadoStatus::Negotiating => "negotiating",
            ChamadoStatus::AwaitingPayment => "awaiting_payment",
            ChamadoStatus::InService => "in_service",
            ChamadoStatus::PendingConfirmation => "pending_confirmation",
            ChamadoStatus::Finished => "finished",
            ChamadoStatus::Canceled => "canceled",
        }
    }
}

/// Autor da última proposta de valor em aberto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "proposal_author", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProposalAuthor {
    None,
    Client,
    Provider,
}

/// Status do pagamento junto ao processador externo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Pending,
    Paid,
    Refunded,
    Failed,
}

/// Chamado - mapeia exatamente a tabela chamados
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Chamado {
    pub id: Uuid,
    pub client_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub service_type: ServiceType,
    pub origin_lat: f64,
    pub origin_lng: f64,
    pub origin_address: String,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    pub destination_address: Option<String>,
    pub proposed_value: Option<Decimal>,
    pub last_proposal_by: ProposalAuthor,
    pub value_accepted: bool,
    pub agreed_value: Option<Decimal>,
    pub payment_status: PaymentStatus,
    pub commission_percentage: Option<Decimal>,
    pub commission_amount: Option<Decimal>,
    pub provider_net_amount: Option<Decimal>,
    pub commission_source: Option<CommissionSource>,
    pub provider_finish_requested_at: Option<DateTime<Utc>>,
    pub status: ChamadoStatus,
    pub cancel_reason: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chamado {
    /// Verificar se o usuário é o cliente do chamado
    pub fn is_client(&self, user_id: Uuid) -> bool {
        self.client_id == user_id
    }

    /// Verificar se o usuário é o prestador do chamado
    pub fn is_provider(&self, user_id: Uuid) -> bool {
        self.provider_id == Some(user_id)
    }

    /// Verificar se o usuário é uma das partes do chamado
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.is_client(user_id) || self.is_provider(user_id)
    }

    /// Autor de proposta correspondente a um usuário
    pub fn proposal_author_of(&self, user_id: Uuid) -> Option<ProposalAuthor> {
        if self.is_client(user_id) {
            Some(ProposalAuthor::Client)
        } else if self.is_provider(user_id) {
            Some(ProposalAuthor::Provider)
        } else {
            None
        }
    }
}
