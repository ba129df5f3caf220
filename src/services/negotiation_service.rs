//! Protocolo de negociação de valor
//!
//! Turnos alternados: uma parte só propõe quando não é a autora da
//! proposta em aberto, e só a parte oposta pode aceitar. Isso impede
//! alguém de "aceitar a própria oferta" e deixa o histórico
//! determinístico para resolução de disputas.

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::chamado::{Chamado, ProposalAuthor};
use crate::repositories::chamado_repository::ChamadoRepository;
use crate::services::fee_service::FeeService;
use crate::services::lifecycle_service::{transition, ChamadoEvent};
use crate::services::notification_service::{NotificationEvent, NotificationSink};
use crate::utils::errors::{forbidden_error, stale_state, AppError};

/// Guard de turno: quem propõe não pode ser o autor da proposta aberta
pub fn can_propose(last_proposal_by: ProposalAuthor, actor: ProposalAuthor) -> bool {
    last_proposal_by != actor
}

/// Guard de aceite: precisa existir proposta em aberto e o ator precisa
/// ser a parte oposta ao autor. Retorna o valor a congelar.
pub fn acceptable_value(chamado: &Chamado, actor: ProposalAuthor) -> Result<Decimal, AppError> {
    let value = match (chamado.proposed_value, chamado.last_proposal_by) {
        (Some(value), ProposalAuthor::Client) | (Some(value), ProposalAuthor::Provider) => value,
        _ => {
            return Err(AppError::InvalidTransition(
                "Não há proposta de valor em aberto".to_string(),
            ))
        }
    };

    if chamado.last_proposal_by == actor {
        return Err(AppError::InvalidTransition(
            "Não é possível aceitar a própria proposta".to_string(),
        ));
    }

    Ok(value)
}

pub struct NegotiationService {
    repository: ChamadoRepository,
    fees: FeeService,
    notifier: Arc<dyn NotificationSink>,
}

impl NegotiationService {
    pub fn new(pool: PgPool, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            repository: ChamadoRepository::new(pool.clone()),
            fees: FeeService::new(pool),
            notifier,
        }
    }

    async fn load(&self, chamado_id: Uuid) -> Result<Chamado, AppError> {
        self.repository
            .find_by_id(chamado_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Chamado with id '{}' not found", chamado_id))
            })
    }

    /// Propor (ou contra-propor) um valor
    pub async fn propose(
        &self,
        chamado_id: Uuid,
        actor_id: Uuid,
        value: Decimal,
    ) -> Result<Chamado, AppError> {
        if value <= Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "Valor proposto deve ser positivo: {}",
                value
            )));
        }

        let chamado = self.load(chamado_id).await?;
        let author = chamado
            .proposal_author_of(actor_id)
            .ok_or_else(|| forbidden_error("propose value", "user is not a party"))?;

        transition(chamado.status, ChamadoEvent::Propose)?;

        if !can_propose(chamado.last_proposal_by, author) {
            return Err(AppError::InvalidTransition(
                "Aguarde a resposta da outra parte antes de propor de novo".to_string(),
            ));
        }

        let updated = self
            .repository
            .save_proposal(chamado.id, chamado.version, value, author)
            .await?
            .ok_or_else(|| stale_state("chamado"))?;

        self.notifier
            .notify(NotificationEvent::ProposalReceived {
                chamado_id: updated.id,
                value,
                author,
            })
            .await;

        Ok(updated)
    }

    /// Aceitar a proposta em aberto, congelando o valor acordado e a
    /// comissão resolvida neste instante.
    pub async fn accept(&self, chamado_id: Uuid, actor_id: Uuid) -> Result<Chamado, AppError> {
        let chamado = self.load(chamado_id).await?;
        let author = chamado
            .proposal_author_of(actor_id)
            .ok_or_else(|| forbidden_error("accept value", "user is not a party"))?;

        transition(chamado.status, ChamadoEvent::AcceptValue)?;

        let value = acceptable_value(&chamado, author)?;

        let provider_id = chamado.provider_id.ok_or_else(|| {
            AppError::Internal("Chamado em negociação sem prestador atribuído".to_string())
        })?;

        // Bloqueio duro: comissão mal configurada impede a liquidação
        let (breakdown, source) = self.fees.freeze_for(provider_id, value).await?;

        let updated = self
            .repository
            .freeze_agreement(
                chamado.id,
                chamado.version,
                value,
                breakdown.fee_percentage,
                breakdown.fee_amount,
                breakdown.provider_net_amount,
                source,
            )
            .await?
            .ok_or_else(|| stale_state("chamado"))?;

        self.notifier
            .notify(NotificationEvent::StateChanged {
                chamado_id: updated.id,
                status: updated.status,
            })
            .await;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chamado::{ChamadoStatus, PaymentStatus, ServiceType};
    use chrono::Utc;

    fn chamado_negotiating(
        proposed_value: Option<Decimal>,
        last_proposal_by: ProposalAuthor,
    ) -> Chamado {
        Chamado {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            provider_id: Some(Uuid::new_v4()),
            service_type: ServiceType::Tire,
            origin_lat: -23.55,
            origin_lng: -46.63,
            origin_address: "Av. Paulista, 1000".to_string(),
            destination_lat: None,
            destination_lng: None,
            destination_address: None,
            proposed_value,
            last_proposal_by,
            value_accepted: false,
            agreed_value: None,
            payment_status: PaymentStatus::Unpaid,
            commission_percentage: None,
            commission_amount: None,
            provider_net_amount: None,
            commission_source: None,
            provider_finish_requested_at: None,
            status: ChamadoStatus::Negotiating,
            cancel_reason: None,
            version: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn test_can_propose_alternates_turns() {
        // Sem proposta aberta, qualquer parte abre
        assert!(can_propose(ProposalAuthor::None, ProposalAuthor::Client));
        assert!(can_propose(ProposalAuthor::None, ProposalAuthor::Provider));
        // Contra-proposta da parte oposta
        assert!(can_propose(ProposalAuthor::Client, ProposalAuthor::Provider));
        assert!(can_propose(ProposalAuthor::Provider, ProposalAuthor::Client));
        // Nunca duas propostas seguidas do mesmo autor
        assert!(!can_propose(ProposalAuthor::Client, ProposalAuthor::Client));
        assert!(!can_propose(ProposalAuthor::Provider, ProposalAuthor::Provider));
    }

    #[test]
    fn test_acceptable_value_requires_open_proposal() {
        let chamado = chamado_negotiating(None, ProposalAuthor::None);
        assert!(acceptable_value(&chamado, ProposalAuthor::Client).is_err());
    }

    #[test]
    fn test_acceptable_value_rejects_own_proposal() {
        let chamado = chamado_negotiating(Some(dec("250")), ProposalAuthor::Provider);
        assert!(acceptable_value(&chamado, ProposalAuthor::Provider).is_err());
    }

    #[test]
    fn test_acceptable_value_opposite_party_gets_value() {
        // Prestador propôs 250; cliente aceita
        let chamado = chamado_negotiating(Some(dec("250")), ProposalAuthor::Provider);
        assert_eq!(
            acceptable_value(&chamado, ProposalAuthor::Client).unwrap(),
            dec("250")
        );
        // E o simétrico
        let chamado = chamado_negotiating(Some(dec("180")), ProposalAuthor::Client);
        assert_eq!(
            acceptable_value(&chamado, ProposalAuthor::Provider).unwrap(),
            dec("180")
        );
    }
}
