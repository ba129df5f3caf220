//! Utilidades do sistema
//!
//! Este módulo contém utilidades para tratamento de erros, validação,
//! JWT, geodistância e outras funcionalidades comuns.

pub mod errors;
pub mod geo;
pub mod jwt;
pub mod validation;
