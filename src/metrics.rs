//! Métricas Prometheus
//!
//! Contadores do coordenador expostos em /metrics. Expirações de janela
//! e auto-finish são transições normais dirigidas por timer e contam
//! como tal, não como falhas.

use lazy_static::lazy_static;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

lazy_static! {
    pub static ref CHAMADOS_CREATED: IntCounter = register_int_counter!(
        "chamados_created_total",
        "Total de chamados criados"
    )
    .expect("metric registration");
    pub static ref OFFERS_SENT: IntCounter = register_int_counter!(
        "chamado_offers_sent_total",
        "Total de ofertas enviadas a prestadores"
    )
    .expect("metric registration");
    pub static ref CLAIMS_WON: IntCounter = register_int_counter!(
        "chamado_claims_won_total",
        "Total de claims vencedores (prestador atribuído)"
    )
    .expect("metric registration");
    pub static ref CLAIMS_LOST: IntCounter = register_int_counter!(
        "chamado_claims_lost_total",
        "Total de claims perdidos (chamado já tomado)"
    )
    .expect("metric registration");
    pub static ref AUTO_FINISHED: IntCounter = register_int_counter!(
        "chamados_auto_finished_total",
        "Total de chamados concluídos por auto-finish"
    )
    .expect("metric registration");
    pub static ref DISPUTES: IntCounter = register_int_counter!(
        "chamado_disputes_total",
        "Total de contestações de conclusão pelo cliente"
    )
    .expect("metric registration");
}

/// Handler do endpoint /metrics (formato de texto Prometheus)
pub async fn metrics_handler() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Erro codificando métricas: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
