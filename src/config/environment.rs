//! Configuração de variáveis de ambiente
//!
//! Este módulo gerencia a configuração do ambiente e os parâmetros de
//! tempo do coordenador (janela de oferta, período de carência, tick do
//! scheduler).

use std::env;

/// Configuração do ambiente
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    // Parâmetros do coordenador de chamados
    pub offer_window_seconds: i64,
    pub grace_period_minutes: i64,
    pub scheduler_tick_seconds: u64,
    pub search_timeout_seconds: i64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").expect("ENVIRONMENT must be set"),
            port: env::var("PORT")
                .expect("PORT must be set")
                .parse()
                .expect("PORT must be a valid number"),
            host: env::var("HOST").expect("HOST must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_expiration: env::var("JWT_EXPIRATION")
                .expect("JWT_EXPIRATION must be set")
                .parse()
                .expect("JWT_EXPIRATION must be a valid number"),
            cors_origins: env::var("CORS_ORIGINS")
                .expect("CORS_ORIGINS must be set")
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            // Janela de aceitação das ofertas (30 s por padrão)
            offer_window_seconds: env::var("OFFER_WINDOW_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("OFFER_WINDOW_SECONDS must be a valid number"),
            // Janela de carência do auto-finish (15 min por padrão)
            grace_period_minutes: env::var("GRACE_PERIOD_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .expect("GRACE_PERIOD_MINUTES must be a valid number"),
            scheduler_tick_seconds: env::var("SCHEDULER_TICK_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("SCHEDULER_TICK_SECONDS must be a valid number"),
            search_timeout_seconds: env::var("SEARCH_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "180".to_string())
                .parse()
                .expect("SEARCH_TIMEOUT_SECONDS must be a valid number"),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar se estamos em modo de desenvolvimento
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar se estamos em modo de produção
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obter a URL do servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
