//! Repositório de ofertas de broadcast
//!
//! Uma oferta pendente por (chamado, prestador), com janela de aceitação
//! fixa. O vencedor do claim marca a sua como aceita e retira as demais.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::offer::ChamadoOffer;
use crate::utils::errors::AppError;

pub struct OfferRepository {
    pool: PgPool,
}

impl OfferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        chamado_id: Uuid,
        provider_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<ChamadoOffer, AppError> {
        let offer = sqlx::query_as::<_, ChamadoOffer>(
            r#"
            INSERT INTO chamado_offers (id, chamado_id, provider_id, status, expires_at, created_at)
            VALUES ($1, $2, $3, 'pending', $4, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(chamado_id)
        .bind(provider_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(offer)
    }

    /// Oferta pendente e dentro da janela para este prestador neste chamado
    pub async fn find_open(
        &self,
        chamado_id: Uuid,
        provider_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ChamadoOffer>, AppError> {
        let offer = sqlx::query_as::<_, ChamadoOffer>(
            r#"
            SELECT * FROM chamado_offers
            WHERE chamado_id = $1 AND provider_id = $2
              AND status = 'pending' AND expires_at > $3
            "#,
        )
        .bind(chamado_id)
        .bind(provider_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(offer)
    }

    /// Oferta pendente mais recente para a tela do prestador
    pub async fn find_pending_for_provider(
        &self,
        provider_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ChamadoOffer>, AppError> {
        let offer = sqlx::query_as::<_, ChamadoOffer>(
            r#"
            SELECT * FROM chamado_offers
            WHERE provider_id = $1 AND status = 'pending' AND expires_at > $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(provider_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(offer)
    }

    pub async fn mark_accepted(&self, offer_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE chamado_offers SET status = 'accepted' WHERE id = $1 AND status = 'pending'",
        )
        .bind(offer_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Recusa explícita; só tem efeito enquanto a oferta está pendente
    pub async fn mark_declined(
        &self,
        chamado_id: Uuid,
        provider_id: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE chamado_offers SET status = 'declined'
            WHERE chamado_id = $1 AND provider_id = $2 AND status = 'pending'
            "#,
        )
        .bind(chamado_id)
        .bind(provider_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Retirar as ofertas pendentes dos perdedores do claim
    pub async fn withdraw_siblings(
        &self,
        chamado_id: Uuid,
        winner_provider_id: Uuid,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE chamado_offers SET status = 'withdrawn'
            WHERE chamado_id = $1 AND provider_id <> $2 AND status = 'pending'
            "#,
        )
        .bind(chamado_id)
        .bind(winner_provider_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Expirar ofertas cuja janela venceu (equivalente a recusa)
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE chamado_offers SET status = 'expired' WHERE status = 'pending' AND expires_at <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
