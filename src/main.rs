mod config;
mod controllers;
mod database;
mod dto;
mod metrics;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use axum::{middleware as axum_middleware, response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use database::DatabaseConnection;
use middleware::auth::auth_middleware;
use middleware::cors::cors_middleware;
use services::autofinish_service::spawn_scheduler;
use services::notification_service::LogNotifier;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Carregar variáveis de ambiente
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚗 Assistência Rodoviária - Coordenador de Chamados");
    info!("===================================================");

    // Inicializar banco de dados
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Erro conectando ao banco de dados: {}", e);
            return Err(anyhow::anyhow!("Erro de banco de dados: {}", e));
        }
    };

    let pool = db_connection.pool().clone();

    // Montar o estado compartilhado com o sink de notificações injetado
    let app_state = AppState::new(pool, EnvironmentConfig::default(), Arc::new(LogNotifier));

    // Worker autoritativo: auto-finish + expiração de ofertas
    let _scheduler = spawn_scheduler(app_state.clone());

    // Rotas autenticadas dos aplicativos
    let protected = Router::new()
        .nest(
            "/api/chamado",
            routes::chamado_routes::create_chamado_router()
                .merge(routes::chat_routes::create_chat_router()),
        )
        .nest("/api/offer", routes::offer_routes::create_offer_router())
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let app = Router::new()
        .route("/health", get(health_endpoint))
        .route("/metrics", get(metrics::metrics_handler))
        .merge(protected)
        .layer(cors_middleware())
        .with_state(app_state);

    // Porta do servidor
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    info!("🌐 Servidor iniciando em http://{}", addr);
    info!("🔍 Endpoints disponíveis:");
    info!("   GET  /health - Health check");
    info!("   GET  /metrics - Métricas Prometheus");
    info!("📋 Endpoints - Chamado:");
    info!("   POST /api/chamado - Criar chamado");
    info!("   GET  /api/chamado/current - Chamado ativo do usuário");
    info!("   GET  /api/chamado/:id - Obter chamado");
    info!("   POST /api/chamado/:id/propose - Propor valor");
    info!("   POST /api/chamado/:id/accept-value - Aceitar proposta");
    info!("   POST /api/chamado/:id/cancel - Cancelar chamado");
    info!("   POST /api/chamado/:id/payment-confirmed - Confirmar pagamento");
    info!("   POST /api/chamado/:id/finish-request - Sinalizar conclusão");
    info!("   POST /api/chamado/:id/confirm - Confirmar conclusão");
    info!("   POST /api/chamado/:id/dispute - Contestar conclusão");
    info!("💬 Endpoints - Chat:");
    info!("   GET  /api/chamado/:id/messages - Histórico de mensagens");
    info!("   POST /api/chamado/:id/messages - Enviar mensagem");
    info!("📢 Endpoints - Oferta:");
    info!("   GET  /api/offer/pending - Oferta pendente do prestador");
    info!("   POST /api/offer/:chamado_id/accept - Aceitar oferta (claim)");
    info!("   POST /api/offer/:chamado_id/decline - Recusar oferta");

    // Iniciar servidor em background
    let server_handle = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("❌ Erro do servidor: {}", e);
                e
            })
    });

    // Esperar o servidor terminar
    if let Err(e) = server_handle.await? {
        error!("❌ Servidor terminou com erro: {}", e);
    }

    info!("👋 Servidor encerrado");
    Ok(())
}

/// Endpoint simples de health check
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "service": "roadside-assistance",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Sinal de desligamento graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Sinal Ctrl+C recebido, desligando servidor...");
        },
        _ = terminate => {
            info!("🛑 Sinal de término recebido, desligando servidor...");
        },
    }
}
