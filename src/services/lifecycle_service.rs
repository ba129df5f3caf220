//! Coordenador do ciclo de vida do chamado
//!
//! A tabela de transições autoritativa vive aqui, junto com as
//! operações que a aplicam. Cada operação carrega o agregado, valida o
//! guard e aplica a mutação inteira num único UPDATE condicionado à
//! versão; perder a corrida resulta em `StaleState` tipado, nunca em
//! retry silencioso dentro do coordenador.

use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::models::chamado::{Chamado, ChamadoStatus};
use crate::repositories::chamado_repository::ChamadoRepository;
use crate::services::notification_service::{NotificationEvent, NotificationSink};
use crate::utils::errors::{forbidden_error, invalid_transition, stale_state, AppError};

/// Eventos do ciclo de vida
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChamadoEvent {
    Matched,
    Propose,
    AcceptValue,
    Cancel,
    PaymentConfirmed,
    ProviderRequestsFinish,
    ClientConfirms,
    ClientDisputes,
    AutoFinish,
    SearchTimeout,
}

impl ChamadoEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChamadoEvent::Matched => "matched",
            ChamadoEvent::Propose => "propose",
            ChamadoEvent::AcceptValue => "accept_value",
            ChamadoEvent::Cancel => "cancel",
            ChamadoEvent::PaymentConfirmed => "payment_confirmed",
            ChamadoEvent::ProviderRequestsFinish => "provider_requests_finish",
            ChamadoEvent::ClientConfirms => "client_confirms",
            ChamadoEvent::ClientDisputes => "client_disputes",
            ChamadoEvent::AutoFinish => "auto_finish",
            ChamadoEvent::SearchTimeout => "search_timeout",
        }
    }
}

/// Tabela de transições autoritativa
///
/// A criação não passa por aqui: o INSERT já nasce em `searching`.
/// Qualquer combinação não listada falha com `InvalidTransition`.
pub fn transition(
    status: ChamadoStatus,
    event: ChamadoEvent,
) -> Result<ChamadoStatus, AppError> {
    use ChamadoEvent::*;
    use ChamadoStatus::*;

    let next = match (status, event) {
        (Searching, Matched) => Negotiating,
        (Searching, Cancel) => Canceled,
        (Searching, SearchTimeout) => Canceled,
        (Negotiating, Propose) => Negotiating,
        (Negotiating, AcceptValue) => AwaitingPayment,
        (Negotiating, Cancel) => Canceled,
        (AwaitingPayment, PaymentConfirmed) => InService,
        (AwaitingPayment, Cancel) => Canceled,
        (InService, ProviderRequestsFinish) => PendingConfirmation,
        (InService, Cancel) => Canceled,
        (PendingConfirmation, ClientConfirms) => Finished,
        (PendingConfirmation, ClientDisputes) => InService,
        (PendingConfirmation, AutoFinish) => Finished,
        (PendingConfirmation, Cancel) => Canceled,
        (status, event) => return Err(invalid_transition(status.as_str(), event.as_str())),
    };

    Ok(next)
}

pub struct LifecycleService {
    repository: ChamadoRepository,
    config: EnvironmentConfig,
    notifier: Arc<dyn NotificationSink>,
}

impl LifecycleService {
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

    async fn load(&self, chamado_id: Uuid) -> Result<Chamado, AppError> {
        self.repository
            .find_by_id(chamado_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Chamado with id '{}' not found", chamado_id))
            })
    }

    /// Cancelamento por qualquer uma das partes. Pagamento já capturado
    /// vira reembolso no mesmo UPDATE.
    pub async fn cancel(
        &self,
        chamado_id: Uuid,
        actor_id: Uuid,
        reason: Option<String>,
    ) -> Result<Chamado, AppError> {
        let chamado = self.load(chamado_id).await?;
        if !chamado.is_party(actor_id) {
            return Err(forbidden_error("cancel chamado", "user is not a party"));
        }
        transition(chamado.status, ChamadoEvent::Cancel)?;

        let reason = reason.unwrap_or_else(|| {
            if chamado.is_client(actor_id) {
                "client_canceled".to_string()
            } else {
                "provider_canceled".to_string()
            }
        });

        let updated = self
            .repository
            .cancel(chamado.id, chamado.version, &reason)
            .await?
            .ok_or_else(|| stale_state("chamado"))?;

        self.notify_state(&updated).await;
        Ok(updated)
    }

    /// Confirmação de pagamento do processador externo. O valor
    /// reportado precisa bater com o valor acordado.
    pub async fn payment_confirmed(
        &self,
        chamado_id: Uuid,
        actor_id: Uuid,
        amount: rust_decimal::Decimal,
    ) -> Result<Chamado, AppError> {
        let chamado = self.load(chamado_id).await?;
        if !chamado.is_client(actor_id) {
            return Err(forbidden_error("confirm payment", "user is not the client"));
        }
        transition(chamado.status, ChamadoEvent::PaymentConfirmed)?;

        if chamado.agreed_value != Some(amount) {
            return Err(AppError::Validation(format!(
                "Valor confirmado ({}) difere do valor acordado",
                amount
            )));
        }

        let updated = self
            .repository
            .confirm_payment(chamado.id, chamado.version)
            .await?
            .ok_or_else(|| stale_state("chamado"))?;

        self.notify_state(&updated).await;
        Ok(updated)
    }

    /// Prestador sinaliza que o trabalho terminou; abre a janela de
    /// carência do auto-finish.
    pub async fn provider_requests_finish(
        &self,
        chamado_id: Uuid,
        provider_id: Uuid,
    ) -> Result<Chamado, AppError> {
        let chamado = self.load(chamado_id).await?;
        if !chamado.is_provider(provider_id) {
            return Err(forbidden_error(
                "request finish",
                "user is not the provider of this chamado",
            ));
        }
        transition(chamado.status, ChamadoEvent::ProviderRequestsFinish)?;

        let updated = self
            .repository
            .request_finish(chamado.id, chamado.version)
            .await?
            .ok_or_else(|| stale_state("chamado"))?;

        if let Some(requested_at) = updated.provider_finish_requested_at {
            self.notifier
                .notify(NotificationEvent::FinishPending {
                    chamado_id: updated.id,
                    auto_finish_at: requested_at
                        + Duration::minutes(self.config.grace_period_minutes),
                })
                .await;
        }
        Ok(updated)
    }

    /// Cliente confirma a conclusão
    pub async fn client_confirms(
        &self,
        chamado_id: Uuid,
        client_id: Uuid,
    ) -> Result<Chamado, AppError> {
        let chamado = self.load(chamado_id).await?;
        if !chamado.is_client(client_id) {
            return Err(forbidden_error("confirm finish", "user is not the client"));
        }
        transition(chamado.status, ChamadoEvent::ClientConfirms)?;

        let updated = self
            .repository
            .finish(chamado.id, chamado.version)
            .await?
            .ok_or_else(|| stale_state("chamado"))?;

        self.notify_state(&updated).await;
        Ok(updated)
    }

    /// Cliente contesta a conclusão: volta para in_service e o prestador
    /// pode sinalizar o término de novo quantas vezes for preciso.
    pub async fn client_disputes(
        &self,
        chamado_id: Uuid,
        client_id: Uuid,
    ) -> Result<Chamado, AppError> {
        let chamado = self.load(chamado_id).await?;
        if !chamado.is_client(client_id) {
            return Err(forbidden_error("dispute finish", "user is not the client"));
        }
        transition(chamado.status, ChamadoEvent::ClientDisputes)?;

        let updated = self
            .repository
            .dispute(chamado.id, chamado.version)
            .await?
            .ok_or_else(|| stale_state("chamado"))?;

        crate::metrics::DISPUTES.inc();
        self.notify_state(&updated).await;
        Ok(updated)
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

#[cfg(test)]
mod tests {
    use super::*;
    use super::ChamadoEvent::*;
    use super::ChamadoStatus::*;

    #[test]
    fn test_happy_path_transitions() {
        assert_eq!(transition(Searching, Matched).unwrap(), Negotiating);
        assert_eq!(transition(Negotiating, Propose).unwrap(), Negotiating);
        assert_eq!(transition(Negotiating, AcceptValue).unwrap(), AwaitingPayment);
        assert_eq!(transition(AwaitingPayment, PaymentConfirmed).unwrap(), InService);
        assert_eq!(
            transition(InService, ProviderRequestsFinish).unwrap(),
            PendingConfirmation
        );
        assert_eq!(transition(PendingConfirmation, ClientConfirms).unwrap(), Finished);
    }

    #[test]
    fn test_dispute_reverts_to_in_service() {
        assert_eq!(transition(PendingConfirmation, ClientDisputes).unwrap(), InService);
        // E o prestador pode sinalizar o término de novo
        assert_eq!(
            transition(InService, ProviderRequestsFinish).unwrap(),
            PendingConfirmation
        );
    }

    #[test]
    fn test_auto_finish_is_a_first_class_transition() {
        assert_eq!(transition(PendingConfirmation, AutoFinish).unwrap(), Finished);
    }

    #[test]
    fn test_cancel_reachable_from_every_non_terminal_state() {
        for status in [
            Searching,
            Negotiating,
            AwaitingPayment,
            InService,
            PendingConfirmation,
        ] {
            assert_eq!(transition(status, Cancel).unwrap(), Canceled);
        }
    }

    #[test]
    fn test_search_timeout_only_from_searching() {
        assert_eq!(transition(Searching, SearchTimeout).unwrap(), Canceled);
        assert!(transition(Negotiating, SearchTimeout).is_err());
    }

    #[test]
    fn test_terminal_states_admit_nothing() {
        let events = [
            Matched,
            Propose,
            AcceptValue,
            Cancel,
            PaymentConfirmed,
            ProviderRequestsFinish,
            ClientConfirms,
            ClientDisputes,
            AutoFinish,
            SearchTimeout,
        ];
        for status in [Finished, Canceled] {
            for event in events {
                assert!(
                    transition(status, event).is_err(),
                    "{:?} não deveria aceitar {:?}",
                    status,
                    event
                );
            }
        }
    }

    #[test]
    fn test_out_of_order_events_are_rejected() {
        assert!(transition(Searching, AcceptValue).is_err());
        assert!(transition(Searching, PaymentConfirmed).is_err());
        assert!(transition(Negotiating, PaymentConfirmed).is_err());
        assert!(transition(Negotiating, ProviderRequestsFinish).is_err());
        assert!(transition(AwaitingPayment, Propose).is_err());
        assert!(transition(AwaitingPayment, ClientConfirms).is_err());
        assert!(transition(InService, AutoFinish).is_err());
        assert!(transition(InService, Matched).is_err());
        assert!(transition(PendingConfirmation, Propose).is_err());
    }
}
