//! Repositório de mensagens de chat
//!
//! Mensagens são imutáveis: só há append e listagem ordenada.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::chat::{ChatMessage, SenderType};
use crate::utils::errors::AppError;

pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn append(
        &self,
        chamado_id: Uuid,
        sender_type: SenderType,
        sender_id: Uuid,
        content: String,
    ) -> Result<ChatMessage, AppError> {
        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (id, chamado_id, sender_type, sender_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(chamado_id)
        .bind(sender_type)
        .bind(sender_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn list_by_chamado(
        &self,
        chamado_id: Uuid,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_messages WHERE chamado_id = $1 ORDER BY created_at ASC",
        )
        .bind(chamado_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
