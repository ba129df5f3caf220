//! Modelos do sistema
//!
//! Este módulo contém todos os modelos de dados que mapeiam exatamente
//! o schema PostgreSQL com as convenções padrão.

pub mod chamado;
pub mod chat;
pub mod fee;
pub mod offer;
pub mod provider;
