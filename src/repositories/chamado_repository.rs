//! Repositório de chamados
//!
//! Todas as mutações passam por um único UPDATE condicional: ou pela
//! versão do agregado (compare-and-swap otimista) ou, no claim, pela
//! condição `provider_id IS NULL`. Zero linhas afetadas significa que o
//! chamador perdeu a corrida e deve recarregar.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::chamado::{Chamado, ProposalAuthor, ServiceType};
use crate::models::fee::CommissionSource;
use crate::utils::errors::AppError;

pub struct ChamadoRepository {
    pool: PgPool,
}

impl ChamadoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        client_id: Uuid,
        service_type: ServiceType,
        origin_lat: f64,
        origin_lng: f64,
        origin_address: String,
        destination: Option<(f64, f64, String)>,
    ) -> Result<Chamado, AppError> {
        let id = Uuid::new_v4();
        let (dest_lat, dest_lng, dest_address) = match destination {
            Some((lat, lng, address)) => (Some(lat), Some(lng), Some(address)),
            None => (None, None, None),
        };

        let chamado = sqlx::query_as::<_, Chamado>(
            r#"
            INSERT INTO chamados (
                id, client_id, service_type,
                origin_lat, origin_lng, origin_address,
                destination_lat, destination_lng, destination_address,
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'searching', NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(client_id)
        .bind(service_type)
        .bind(origin_lat)
        .bind(origin_lng)
        .bind(origin_address)
        .bind(dest_lat)
        .bind(dest_lng)
        .bind(dest_address)
        .fetch_one(&self.pool)
        .await?;

        Ok(chamado)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Chamado>, AppError> {
        let chamado = sqlx::query_as::<_, Chamado>("SELECT * FROM chamados WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(chamado)
    }

    /// Chamado ativo (não terminal) em que o usuário é cliente ou prestador
    pub async fn find_active_by_user(&self, user_id: Uuid) -> Result<Option<Chamado>, AppError> {
        let chamado = sqlx::query_as::<_, Chamado>(
            r#"
            SELECT * FROM chamados
            WHERE (client_id = $1 OR provider_id = $1)
              AND status NOT IN ('finished', 'canceled')
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chamado)
    }

    /// Claim condicional: exatamente uma aceitação concorrente vence.
    /// `None` = outro prestador chegou primeiro (ou o chamado saiu de
    /// `searching`).
    pub async fn claim_provider(
        &self,
        chamado_id: Uuid,
        provider_id: Uuid,
    ) -> Result<Option<Chamado>, AppError> {
        let chamado = sqlx::query_as::<_, Chamado>(
            r#"
            UPDATE chamados
            SET provider_id = $2,
                status = 'negotiating',
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1
              AND provider_id IS NULL
              AND status = 'searching'
            RETURNING *
            "#,
        )
        .bind(chamado_id)
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chamado)
    }

    /// Registrar proposta de valor, invertendo o turno da negociação
    pub async fn save_proposal(
        &self,
        chamado_id: Uuid,
        version: i64,
        value: Decimal,
        author: ProposalAuthor,
    ) -> Result<Option<Chamado>, AppError> {
        let chamado = sqlx::query_as::<_, Chamado>(
            r#"
            UPDATE chamados
            SET proposed_value = $3,
                last_proposal_by = $4,
                value_accepted = FALSE,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2 AND status = 'negotiating'
            RETURNING *
            "#,
        )
        .bind(chamado_id)
        .bind(version)
        .bind(value)
        .bind(author)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chamado)
    }

    /// Congelar o valor acordado e a comissão resolvida neste instante.
    /// Mudanças futuras de configuração nunca alteram um chamado fechado.
    #[allow(clippy::too_many_arguments)]
    pub async fn freeze_agreement(
        &self,
        chamado_id: Uuid,
        version: i64,
        agreed_value: Decimal,
        commission_percentage: Decimal,
        commission_amount: Decimal,
        provider_net_amount: Decimal,
        commission_source: CommissionSource,
    ) -> Result<Option<Chamado>, AppError> {
        let chamado = sqlx::query_as::<_, Chamado>(
            r#"
            UPDATE chamados
            SET agreed_value = $3,
                value_accepted = TRUE,
                status = 'awaiting_payment',
                payment_status = 'pending',
                commission_percentage = $4,
                commission_amount = $5,
                provider_net_amount = $6,
                commission_source = $7,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2 AND status = 'negotiating'
            RETURNING *
            "#,
        )
        .bind(chamado_id)
        .bind(version)
        .bind(agreed_value)
        .bind(commission_percentage)
        .bind(commission_amount)
        .bind(provider_net_amount)
        .bind(commission_source)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chamado)
    }

    /// Cancelar um chamado não terminal; pagamento já capturado vira
    /// reembolso.
    pub async fn cancel(
        &self,
        chamado_id: Uuid,
        version: i64,
        reason: &str,
    ) -> Result<Option<Chamado>, AppError> {
        let chamado = sqlx::query_as::<_, Chamado>(
            r#"
            UPDATE chamados
            SET status = 'canceled',
                cancel_reason = $3,
                payment_status = CASE
                    WHEN payment_status = 'paid' THEN 'refunded'
                    ELSE payment_status
                END,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2 AND status NOT IN ('finished', 'canceled')
            RETURNING *
            "#,
        )
        .bind(chamado_id)
        .bind(version)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chamado)
    }

    pub async fn confirm_payment(
        &self,
        chamado_id: Uuid,
        version: i64,
    ) -> Result<Option<Chamado>, AppError> {
        let chamado = sqlx::query_as::<_, Chamado>(
            r#"
            UPDATE chamados
            SET status = 'in_service',
                payment_status = 'paid',
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2 AND status = 'awaiting_payment'
            RETURNING *
            "#,
        )
        .bind(chamado_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chamado)
    }

    pub async fn request_finish(
        &self,
        chamado_id: Uuid,
        version: i64,
    ) -> Result<Option<Chamado>, AppError> {
        let chamado = sqlx::query_as::<_, Chamado>(
            r#"
            UPDATE chamados
            SET status = 'pending_confirmation',
                provider_finish_requested_at = NOW(),
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2 AND status = 'in_service'
            RETURNING *
            "#,
        )
        .bind(chamado_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chamado)
    }

    /// Concluir o chamado (confirmação do cliente ou auto-finish).
    /// `provider_finish_requested_at` é preservado para auditoria.
    pub async fn finish(
        &self,
        chamado_id: Uuid,
        version: i64,
    ) -> Result<Option<Chamado>, AppError> {
        let chamado = sqlx::query_as::<_, Chamado>(
            r#"
            UPDATE chamados
            SET status = 'finished',
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2 AND status = 'pending_confirmation'
            RETURNING *
            "#,
        )
        .bind(chamado_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chamado)
    }

    /// Contestação do cliente: volta para in_service e limpa o timer
    pub async fn dispute(
        &self,
        chamado_id: Uuid,
        version: i64,
    ) -> Result<Option<Chamado>, AppError> {
        let chamado = sqlx::query_as::<_, Chamado>(
            r#"
            UPDATE chamados
            SET status = 'in_service',
                provider_finish_requested_at = NULL,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2 AND status = 'pending_confirmation'
            RETURNING *
            "#,
        )
        .bind(chamado_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chamado)
    }

    /// Chamados aguardando confirmação com a carência vencida
    pub async fn find_auto_finish_due(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Chamado>, AppError> {
        let chamados = sqlx::query_as::<_, Chamado>(
            r#"
            SELECT * FROM chamados
            WHERE status = 'pending_confirmation'
              AND provider_finish_requested_at <= $1
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(chamados)
    }

    /// Buscas antigas sem nenhuma oferta pendente restante
    pub async fn find_search_timed_out(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Chamado>, AppError> {
        let chamados = sqlx::query_as::<_, Chamado>(
            r#"
            SELECT * FROM chamados c
            WHERE c.status = 'searching'
              AND c.created_at <= $1
              AND NOT EXISTS (
                  SELECT 1 FROM chamado_offers o
                  WHERE o.chamado_id = c.id AND o.status = 'pending'
              )
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(chamados)
    }
}
