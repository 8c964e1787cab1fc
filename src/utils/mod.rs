//! Utilidades compartilhadas

pub mod errors;
pub mod validation;

pub use errors::AppError;
