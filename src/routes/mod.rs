//! Rotas da aplicação

pub mod objeto_routes;
pub mod ordem_routes;
