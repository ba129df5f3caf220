//! Modelos de Prestador
//!
//! Prestador (read model para o matcher, alimentado pelo feed de
//! localização externo) e sua elegibilidade financeira (read model do
//! ledger externo).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::chamado::ServiceType;

/// Prestador - mapeia a tabela providers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Provider {
    pub id: Uuid,
    pub full_name: String,
    pub is_online: bool,
    pub services: Vec<ServiceType>,
    pub current_lat: Option<f64>,
    pub current_lng: Option<f64>,
    pub search_radius_km: f64,
    pub updated_at: DateTime<Utc>,
}

/// Motivo de bloqueio do prestador
///
/// Mutuamente exclusivos; ordenados por severidade para fins de
/// mensagem ao usuário.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "block_reason", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    None,
    FinancialBlocked,
    OverDebtLimit,
    FraudFlagged,
    PermanentlyBlocked,
    AdminBlocked,
}

impl BlockReason {
    /// Severidade para ordenação de mensagens: bloqueios terminais
    /// primeiro, depois fraude, depois os recuperáveis por pagamento.
    pub fn severity(&self) -> u8 {
        match self {
            BlockReason::PermanentlyBlocked | BlockReason::AdminBlocked => 3,
            BlockReason::FraudFlagged => 2,
            BlockReason::OverDebtLimit | BlockReason::FinancialBlocked => 1,
            BlockReason::None => 0,
        }
    }

    /// Bloqueio sem remediação pelo próprio prestador
    pub fn is_terminal(&self) -> bool {
        self.severity() >= 2
    }

    /// Mensagem exibida ao prestador bloqueado
    pub fn user_message(&self) -> &'static str {
        match self {
            BlockReason::None => "Prestador habilitado",
            BlockReason::FinancialBlocked => {
                "Conta bloqueada por pendência financeira. Quite seus débitos para voltar a atender"
            }
            BlockReason::OverDebtLimit => {
                "Limite de débito excedido. Quite seus débitos para voltar a atender"
            }
            BlockReason::FraudFlagged => "Conta bloqueada por suspeita de fraude",
            BlockReason::PermanentlyBlocked | BlockReason::AdminBlocked => {
                "Conta bloqueada. Entre em contato com o suporte"
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::None => "none",
            BlockReason::FinancialBlocked => "financial_blocked",
            BlockReason::OverDebtLimit => "over_debt_limit",
            BlockReason::FraudFlagged => "fraud_flagged",
            BlockReason::PermanentlyBlocked => "permanently_blocked",
            BlockReason::AdminBlocked => "admin_blocked",
        }
    }
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Elegibilidade financeira - mapeia a tabela provider_eligibility
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProviderEligibility {
    pub provider_id: Uuid,
    pub current_debt: Decimal,
    pub max_debt_limit: Decimal,
    pub block_reason: BlockReason,
    pub updated_at: DateTime<Utc>,
}
