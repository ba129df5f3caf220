//! Controllers da API
//!
//! Camada entre os handlers HTTP e os serviços/repositórios.

pub mod chamado_controller;
pub mod chat_controller;
pub mod offer_controller;
