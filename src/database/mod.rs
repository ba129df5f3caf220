//! Módulo de banco de dados
//!
//! Gerencia a conexão e operações com PostgreSQL.

pub mod connection;

pub use connection::DatabaseConnection;
