//! Broadcast & claim de prestadores
//!
//! Seleciona os prestadores elegíveis próximos, envia ofertas
//! temporizadas e resolve o claim com first-claim-wins via UPDATE
//! condicional - sem lock antecipado, que serializaria as ofertas à toa.

use chrono::{Duration, Utc};
use futures::future::join_all;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::metrics;
use crate::models::chamado::Chamado;
use crate::models::offer::ChamadoOffer;
use crate::models::provider::Provider;
use crate::repositories::chamado_repository::ChamadoRepository;
use crate::repositories::offer_repository::OfferRepository;
use crate::repositories::provider_repository::ProviderRepository;
use crate::services::eligibility_service::EligibilityService;
use crate::services::lifecycle_service::{transition, ChamadoEvent};
use crate::services::notification_service::{NotificationEvent, NotificationSink};
use crate::utils::errors::{stale_state, AppError};
use crate::utils::geo::haversine_km;

pub struct MatchingService {
    chamados: ChamadoRepository,
    offers: OfferRepository,
    providers: ProviderRepository,
    eligibility: EligibilityService,
    config: EnvironmentConfig,
    notifier: Arc<dyn NotificationSink>,
}

impl MatchingService {
    pub fn new(
        pool: PgPool,
        config: EnvironmentConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            chamados: ChamadoRepository::new(pool.clone()),
            offers: OfferRepository::new(pool.clone()),
            providers: ProviderRepository::new(pool.clone()),
            eligibility: EligibilityService::new(pool),
            config,
            notifier,
        }
    }

    /// Prestador dentro do próprio raio de busca em relação à origem
    fn within_radius(provider: &Provider, chamado: &Chamado) -> bool {
        match (provider.current_lat, provider.current_lng) {
            (Some(lat), Some(lng)) => {
                haversine_km(chamado.origin_lat, chamado.origin_lng, lat, lng)
                    <= provider.search_radius_km
            }
            _ => false,
        }
    }

    /// Enviar ofertas temporizadas aos candidatos. Sem nenhum candidato
    /// o chamado é cancelado imediatamente.
    pub async fn broadcast(&self, chamado: &Chamado) -> Result<usize, AppError> {
        let candidates = self.providers.find_candidates(chamado.service_type).await?;

        let mut selected = Vec::new();
        for provider in candidates
            .into_iter()
            .filter(|p| Self::within_radius(p, chamado))
        {
            // Filtro barato de elegibilidade; o claim refaz a checagem
            // com dados frescos
            let check = self.eligibility.check_can_accept(provider.id).await?;
            if check.can_accept {
                selected.push(provider);
            }
        }

        if selected.is_empty() {
            tracing::info!("🔍 Nenhum prestador disponível para o chamado {}", chamado.id);
            transition(chamado.status, ChamadoEvent::SearchTimeout)?;
            if let Some(canceled) = self
                .chamados
                .cancel(chamado.id, chamado.version, "no_providers")
                .await?
            {
                self.notify_state(&canceled).await;
            }
            return Ok(0);
        }

        let expires_at = Utc::now() + Duration::seconds(self.config.offer_window_seconds);
        let mut events = Vec::new();
        for provider in &selected {
            self.offers.create(chamado.id, provider.id, expires_at).await?;
            events.push(NotificationEvent::OfferMade {
                chamado_id: chamado.id,
                provider_id: provider.id,
                expires_at,
            });
        }

        join_all(events.into_iter().map(|event| self.notifier.notify(event))).await;

        metrics::OFFERS_SENT.inc_by(selected.len() as u64);
        tracing::info!(
            "📢 Chamado {} ofertado para {} prestador(es)",
            chamado.id,
            selected.len()
        );
        Ok(selected.len())
    }

    /// Claim do prestador: exatamente uma aceitação concorrente vence.
    ///
    /// A elegibilidade é reavaliada aqui com dados frescos - um
    /// prestador bloqueado entre o broadcast e o claim não passa.
    pub async fn accept_offer(
        &self,
        chamado_id: Uuid,
        provider_id: Uuid,
    ) -> Result<Chamado, AppError> {
        let now = Utc::now();
        let offer = self
            .offers
            .find_open(chamado_id, provider_id, now)
            .await?
            .ok_or_else(|| {
                AppError::InvalidTransition(
                    "Oferta não está mais disponível para aceitação".to_string(),
                )
            })?;

        // Checagem autoritativa no momento do claim
        self.eligibility.ensure_can_accept(provider_id).await?;

        let claimed = match self.chamados.claim_provider(chamado_id, provider_id).await? {
            Some(chamado) => chamado,
            None => {
                // Outro prestador chegou primeiro; a camada de composição
                // mostra apenas um toast de "chamado já atendido"
                metrics::CLAIMS_LOST.inc();
                return Err(stale_state("offer"));
            }
        };

        self.offers.mark_accepted(offer.id).await?;
        self.offers.withdraw_siblings(chamado_id, provider_id).await?;

        metrics::CLAIMS_WON.inc();
        self.notify_state(&claimed).await;
        Ok(claimed)
    }

    /// Recusa explícita de uma oferta pendente
    pub async fn decline_offer(
        &self,
        chamado_id: Uuid,
        provider_id: Uuid,
    ) -> Result<(), AppError> {
        let declined = self.offers.mark_declined(chamado_id, provider_id).await?;
        if !declined {
            return Err(AppError::NotFound(
                "No pending offer for this provider".to_string(),
            ));
        }
        Ok(())
    }

    /// Oferta pendente (com o chamado) para a tela do prestador
    pub async fn pending_offer_for(
        &self,
        provider_id: Uuid,
    ) -> Result<Option<(ChamadoOffer, Chamado)>, AppError> {
        let now = Utc::now();
        let Some(offer) = self.offers.find_pending_for_provider(provider_id, now).await? else {
            return Ok(None);
        };

        match self.chamados.find_by_id(offer.chamado_id).await? {
            Some(chamado) if chamado.status == crate::models::chamado::ChamadoStatus::Searching => {
                Ok(Some((offer, chamado)))
            }
            // Chamado já tomado ou cancelado: a oferta morreu junto
            _ => Ok(None),
        }
    }

    /// Tick do scheduler: expira ofertas vencidas e cancela buscas
    /// esgotadas. Expiração de janela não é erro, é transição normal.
    pub async fn run_expiry_tick(&self) -> Result<(), AppError> {
        let now = Utc::now();

        let expired = self.offers.expire_overdue(now).await?;
        if expired > 0 {
            tracing::info!("⏱️ {} oferta(s) expiraram a janela de aceitação", expired);
        }

        let cutoff = now - Duration::seconds(self.config.search_timeout_seconds);
        let timed_out = self.chamados.find_search_timed_out(cutoff).await?;
        for chamado in timed_out {
            if transition(chamado.status, ChamadoEvent::SearchTimeout).is_err() {
                continue;
            }
            match self
                .chamados
                .cancel(chamado.id, chamado.version, "search_timeout")
                .await?
            {
                Some(canceled) => {
                    tracing::info!("🔍 Busca do chamado {} esgotada, cancelando", canceled.id);
                    self.notify_state(&canceled).await;
                }
                // Um claim tardio venceu a corrida; nada a fazer
                None => tracing::debug!(
                    "Chamado {} mudou antes do cancelamento por timeout",
                    chamado.id
                ),
            }
        }

        Ok(())
    }

    async fn notify_state(&self, chamado: &Chamado) {
        self.notifier
            .notify(NotificationEvent::StateChanged {
                chamado_id: chamado.id,
                status: chamado.status,
            })
            .await;
    }
}
