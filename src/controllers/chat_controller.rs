//! Controller de chat
//!
//! Mensagens entre as duas partes de um chamado ativo. Imutáveis depois
//! de criadas; chamado terminal não recebe mensagem nova.

use uuid::Uuid;
use validator::Validate;

use crate::dto::chat_dto::{ChatMessageResponse, SendMessageRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::chamado::{Chamado, ChamadoStatus};
use crate::models::chat::SenderType;
use crate::repositories::chamado_repository::ChamadoRepository;
use crate::repositories::chat_repository::ChatRepository;
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, AppError};

pub struct ChatController {
    chamados: ChamadoRepository,
    messages: ChatRepository,
}

impl ChatController {
    pub fn new(state: &AppState) -> Self {
        Self {
            chamados: ChamadoRepository::new(state.pool.clone()),
            messages: ChatRepository::new(state.pool.clone()),
        }
    }

    async fn load_as_party(
        &self,
        chamado_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Chamado, AppError> {
        let chamado = self
            .chamados
            .find_by_id(chamado_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Chamado with id '{}' not found", chamado_id))
            })?;

        if !chamado.is_party(user.user_id) {
            return Err(forbidden_error("access chat", "user is not a party"));
        }

        Ok(chamado)
    }

    pub async fn send(
        &self,
        chamado_id: Uuid,
        user: &AuthenticatedUser,
        request: SendMessageRequest,
    ) -> Result<ChatMessageResponse, AppError> {
        request.validate()?;
        let chamado = self.load_as_party(chamado_id, user).await?;

        // Chat só existe entre o match e a conclusão
        if chamado.status == ChamadoStatus::Searching || chamado.status.is_terminal() {
            return Err(AppError::InvalidTransition(
                "Chat indisponível para o status atual do chamado".to_string(),
            ));
        }

        let sender_type = if chamado.is_client(user.user_id) {
            SenderType::Client
        } else {
            SenderType::Provider
        };

        let message = self
            .messages
            .append(chamado.id, sender_type, user.user_id, request.content)
            .await?;

        Ok(message.into())
    }

    pub async fn list(
        &self,
        chamado_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Vec<ChatMessageResponse>, AppError> {
        let chamado = self.load_as_party(chamado_id, user).await?;

        let messages = self.messages.list_by_chamado(chamado.id).await?;
        Ok(messages.into_iter().map(ChatMessageResponse::from).collect())
    }
}
