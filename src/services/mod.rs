//! Services module
//!
//! Este módulo contém a lógica de negócio do coordenador de chamados.
//! Os serviços encapsulam operações que envolvem múltiplos modelos ou
//! colaboradores externos.

pub mod autofinish_service;
pub mod eligibility_service;
pub mod fee_service;
pub mod lifecycle_service;
pub mod matching_service;
pub mod negotiation_service;
pub mod notification_service;
