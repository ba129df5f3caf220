pub mod chamado_routes;
pub mod chat_routes;
pub mod offer_routes;
