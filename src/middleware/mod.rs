//! Middlewares da aplicação

pub mod cors;
