//! Repositório de prestadores
//!
//! Leitura dos candidatos ao broadcast e do read model de elegibilidade
//! financeira (ledger externo).

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::chamado::ServiceType;
use crate::models::provider::{Provider, ProviderEligibility};
use crate::utils::errors::AppError;

pub struct ProviderRepository {
    pool: PgPool,
}

impl ProviderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Prestadores online que oferecem o serviço e têm localização
    /// conhecida. O recorte por raio é feito pelo matcher, pois o raio é
    /// configurado por prestador.
    pub async fn find_candidates(
        &self,
        service_type: ServiceType,
    ) -> Result<Vec<Provider>, AppError> {
        let providers = sqlx::query_as::<_, Provider>(
            r#"
            SELECT * FROM providers
            WHERE is_online = TRUE
              AND $1 = ANY(services)
              AND current_lat IS NOT NULL
              AND current_lng IS NOT NULL
            "#,
        )
        .bind(service_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(providers)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Provider>, AppError> {
        let provider = sqlx::query_as::<_, Provider>("SELECT * FROM providers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(provider)
    }

    pub async fn find_eligibility(
        &self,
        provider_id: Uuid,
    ) -> Result<Option<ProviderEligibility>, AppError> {
        let eligibility = sqlx::query_as::<_, ProviderEligibility>(
            "SELECT * FROM provider_eligibility WHERE provider_id = $1",
        )
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(eligibility)
    }
}
