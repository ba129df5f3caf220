//! Modelo de mensagem de chat
//!
//! Mensagens pertencem a exatamente um chamado, são imutáveis depois de
//! criadas e ordenadas por data de criação.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Papel do remetente dentro do chamado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sender_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    Client,
    Provider,
}

/// Mensagem de chat - mapeia a tabela chat_messages
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub chamado_id: Uuid,
    pub sender_type: SenderType,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
