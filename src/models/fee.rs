//! Modelos de comissão
//!
//! Configuração de taxa (global + overrides por prestador) e o resultado
//! do cálculo congelado no chamado no momento do aceite.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Percentual global de comissão - linha única da tabela fee_settings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeeSettings {
    pub id: i32,
    pub global_percentage: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Overrides de comissão por prestador - tabela provider_fee_config
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProviderFeeConfig {
    pub provider_id: Uuid,
    pub individual_percentage: Option<Decimal>,
    pub exemption_until: Option<DateTime<Utc>>,
    pub promo_percentage: Option<Decimal>,
    pub promo_ends_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Origem do percentual resolvido, congelada no chamado para auditoria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "commission_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CommissionSource {
    Exemption,
    Promotion,
    Individual,
    Global,
}

/// Resultado do cálculo de comissão
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeBreakdown {
    pub service_value: Decimal,
    pub fee_percentage: Decimal,
    pub fee_amount: Decimal,
    pub provider_net_amount: Decimal,
}
