//! DTOs de chat

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::chat::{ChatMessage, SenderType};

/// Request para enviar uma mensagem
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

/// Response de mensagem
#[derive(Debug, Serialize)]
pub struct ChatMessageResponse {
    pub id: Uuid,
    pub chamado_id: Uuid,
    pub sender_type: SenderType,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            chamado_id: message.chamado_id,
            sender_type: message.sender_type,
            sender_id: message.sender_id,
            content: message.content,
            created_at: message.created_at,
        }
    }
}
