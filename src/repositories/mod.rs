//! Repositórios de acesso a dados
//!
//! Cada repositório encapsula as queries SQLx de uma tabela/agregado.

pub mod chamado_repository;
pub mod chat_repository;
pub mod fee_repository;
pub mod offer_repository;
pub mod provider_repository;
