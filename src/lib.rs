//! Backend administrativo de ordens de serviço
//!
//! Painel web para registrar, listar, editar e cancelar ordens de serviço
//! gravadas direto no banco relacional legado da empresa.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod utils;
pub mod views;
