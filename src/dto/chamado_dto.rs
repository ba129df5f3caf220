//! DTOs de chamado

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::chamado::{
    Chamado, ChamadoStatus, PaymentStatus, ProposalAuthor, ServiceType,
};
use crate::models::fee::CommissionSource;

/// Localização informada pelo aplicativo
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LocationDto {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
}

/// Request para criar um chamado
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChamadoRequest {
    pub service_type: ServiceType,
    #[validate]
    pub origin: LocationDto,
    // Obrigatório apenas para reboque; validado no controller
    #[validate]
    pub destination: Option<LocationDto>,
}

/// Request para propor um valor durante a negociação
#[derive(Debug, Deserialize)]
pub struct ProposeValueRequest {
    pub value: Decimal,
}

/// Request de confirmação de pagamento (callback do processador)
#[derive(Debug, Deserialize)]
pub struct PaymentConfirmedRequest {
    pub amount: Decimal,
}

/// Request de cancelamento
#[derive(Debug, Deserialize, Default)]
pub struct CancelChamadoRequest {
    pub reason: Option<String>,
}

/// Response de chamado
#[derive(Debug, Serialize)]
pub struct ChamadoResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub service_type: ServiceType,
    pub requires_destination: bool,
    pub origin: LocationDto,
    pub destination: Option<LocationDto>,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Chamado> for ChamadoResponse {
    fn from(chamado: Chamado) -> Self {
        let destination = match (
            chamado.destination_lat,
            chamado.destination_lng,
            chamado.destination_address.clone(),
        ) {
            (Some(lat), Some(lng), Some(address)) => Some(LocationDto { lat, lng, address }),
            _ => None,
        };

        Self {
            id: chamado.id,
            client_id: chamado.client_id,
            provider_id: chamado.provider_id,
            service_type: chamado.service_type,
            requires_destination: chamado.service_type.requires_destination(),
            origin: LocationDto {
                lat: chamado.origin_lat,
                lng: chamado.origin_lng,
                address: chamado.origin_address,
            },
            destination,
            proposed_value: chamado.proposed_value,
            last_proposal_by: chamado.last_proposal_by,
            value_accepted: chamado.value_accepted,
            agreed_value: chamado.agreed_value,
            payment_status: chamado.payment_status,
            commission_percentage: chamado.commission_percentage,
            commission_amount: chamado.commission_amount,
            provider_net_amount: chamado.provider_net_amount,
            commission_source: chamado.commission_source,
            provider_finish_requested_at: chamado.provider_finish_requested_at,
            status: chamado.status,
            cancel_reason: chamado.cancel_reason,
            created_at: chamado.created_at,
            updated_at: chamado.updated_at,
        }
    }
}

/// Response genérica
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}
