//! Repositório de configuração de comissão

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::fee::{FeeSettings, ProviderFeeConfig};
use crate::utils::errors::AppError;

pub struct FeeRepository {
    pool: PgPool,
}

impl FeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Linha única com o percentual global
    pub async fn find_settings(&self) -> Result<Option<FeeSettings>, AppError> {
        let settings =
            sqlx::query_as::<_, FeeSettings>("SELECT * FROM fee_settings WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(settings)
    }

    pub async fn find_provider_config(
        &self,
        provider_id: Uuid,
    ) -> Result<Option<ProviderFeeConfig>, AppError> {
        let config = sqlx::query_as::<_, ProviderFeeConfig>(
            "SELECT * FROM provider_fee_config WHERE provider_id = $1",
        )
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }
}
