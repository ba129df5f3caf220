//! Sink de notificações
//!
//! O coordenador emite eventos abstratos; a entrega (push, toast) é
//! responsabilidade de um componente separado. O sink é injetado via
//! `AppState` - nada de singletons globais.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::chamado::{ChamadoStatus, ProposalAuthor};

/// Eventos emitidos pelo coordenador
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    OfferMade {
        chamado_id: Uuid,
        provider_id: Uuid,
        expires_at: DateTime<Utc>,
    },
    StateChanged {
        chamado_id: Uuid,
        status: ChamadoStatus,
    },
    ProposalReceived {
        chamado_id: Uuid,
        value: Decimal,
        author: ProposalAuthor,
    },
    FinishPending {
        chamado_id: Uuid,
        auto_finish_at: DateTime<Utc>,
    },
    AutoFinished {
        chamado_id: Uuid,
    },
}

/// Contrato do componente de entrega de notificações
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: NotificationEvent);
}

/// Implementação padrão: loga o evento estruturado
///
/// Em produção o worker de push consome os mesmos eventos.
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, event: NotificationEvent) {
        tracing::info!(event = ?event, "📣 Evento de notificação emitido");
    }
}
