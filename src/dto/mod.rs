//! DTOs da camada web

pub mod objeto_dto;
pub mod ordem_dto;
