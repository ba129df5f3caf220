//! Shared application state
//!
//! Este módulo define o estado compartilhado da aplicação que é passado
//! através do router do Axum. Os colaboradores externos (sink de
//! notificações) entram aqui por injeção explícita.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::services::notification_service::NotificationSink;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub notifier: Arc<dyn NotificationSink>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: EnvironmentConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            pool,
            config,
            notifier,
        }
    }
}
