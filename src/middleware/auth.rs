//! Middleware de autenticação JWT
//!
//! Valida o token do aplicativo (cliente ou prestador) e injeta o
//! usuário autenticado nas requests. A emissão do token fica na camada
//! de identidade; a titularidade sobre cada chamado é verificada por
//! operação nos controllers.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::{extract_token_from_header, verify_token, JwtConfig};

/// Papel do usuário autenticado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Client,
    Provider,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Client => "client",
            UserType::Provider => "provider",
        }
    }
}

/// Usuário autenticado injetado nas requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub user_type: UserType,
}

/// Middleware de autenticação JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autorização requerido".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &JwtConfig::from(&state.config))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("ID de usuário inválido".to_string()))?;

    let user_type = match claims.user_type.as_str() {
        "client" => UserType::Client,
        "provider" => UserType::Provider,
        _ => return Err(AppError::Unauthorized("Tipo de usuário inválido".to_string())),
    };

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id, user_type });

    Ok(next.run(request).await)
}
