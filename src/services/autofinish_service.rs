//! Auto-finish e scheduler
//!
//! A janela de carência é aplicada no servidor por reavaliação
//! periódica; o contador visível no aplicativo é só cosmético, porque o
//! cliente pode estar offline quando a janela vence. O tick usa a mesma
//! disciplina de transição condicional de qualquer outro evento: uma
//! confirmação tardia do cliente e o auto-finish nunca se aplicam ambos.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::environment::EnvironmentConfig;
use crate::metrics;
use crate::repositories::chamado_repository::ChamadoRepository;
use crate::services::lifecycle_service::{transition, ChamadoEvent};
use crate::services::matching_service::MatchingService;
use crate::services::notification_service::{NotificationEvent, NotificationSink};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct AutoFinishService {
    repository: ChamadoRepository,
    config: EnvironmentConfig,
    notifier: Arc<dyn NotificationSink>,
}

impl AutoFinishService {
    pub fn new(
        pool: PgPool,
        config: EnvironmentConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            repository: ChamadoRepository::new(pool),
            config,
            notifier,
        }
    }

    /// Concluir os chamados cuja carência venceu sem ação do cliente
    pub async fn run_tick(&self) -> Result<usize, AppError> {
        let cutoff = Utc::now() - Duration::minutes(self.config.grace_period_minutes);
        let due = self.repository.find_auto_finish_due(cutoff).await?;

        let mut finished = 0;
        for chamado in due {
            if transition(chamado.status, ChamadoEvent::AutoFinish).is_err() {
                continue;
            }
            match self.repository.finish(chamado.id, chamado.version).await? {
                Some(updated) => {
                    finished += 1;
                    metrics::AUTO_FINISHED.inc();
                    // provider_finish_requested_at fica preservado para auditoria
                    tracing::info!("⏱️ Chamado {} concluído por auto-finish", updated.id);
                    self.notifier
                        .notify(NotificationEvent::AutoFinished {
                            chamado_id: updated.id,
                        })
                        .await;
                }
                // Confirmação ou contestação do cliente venceu a corrida
                None => tracing::debug!(
                    "Chamado {} mudou antes do auto-finish, tick ignorado",
                    chamado.id
                ),
            }
        }

        Ok(finished)
    }
}

/// Disparar o worker periódico do coordenador
pub fn spawn_scheduler(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let autofinish = AutoFinishService::new(
            state.pool.clone(),
            state.config.clone(),
            state.notifier.clone(),
        );
        let matching = MatchingService::new(
            state.pool.clone(),
            state.config.clone(),
            state.notifier.clone(),
        );

        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(state.config.scheduler_tick_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "⏰ Scheduler iniciado (tick de {}s, carência de {}min)",
            state.config.scheduler_tick_seconds,
            state.config.grace_period_minutes
        );

        loop {
            interval.tick().await;

            if let Err(e) = autofinish.run_tick().await {
                tracing::error!("❌ Erro no tick de auto-finish: {}", e);
            }
            if let Err(e) = matching.run_expiry_tick().await {
                tracing::error!("❌ Erro no tick de expiração de ofertas: {}", e);
            }
        }
    })
}
