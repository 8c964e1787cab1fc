//! Sistema de tratamento de erros
//!
//! Este módulo define os tipos de erro da aplicação e a conversão deles
//! em respostas HTTP com o envelope JSON padrão.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Erros principais da aplicação
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Resposta de erro da API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_response = match &self {
            AppError::Database(e) => {
                tracing::error!("Erro de banco: {}", e);
                ErrorResponse {
                    error: "Database Error".to_string(),
                    message: "Erro ao acessar o banco de dados".to_string(),
                    details: Some(json!({ "sql_error": e.to_string() })),
                    code: Some("DB_ERROR".to_string()),
                }
            }
            AppError::Validation(e) => ErrorResponse {
                error: "Validation Error".to_string(),
                message: "Os dados informados são inválidos".to_string(),
                details: Some(json!(e)),
                code: Some("VALIDATION_ERROR".to_string()),
            },
            AppError::NotFound(msg) => ErrorResponse {
                error: "Not Found".to_string(),
                message: msg.clone(),
                details: None,
                code: Some("NOT_FOUND".to_string()),
            },
            AppError::BadRequest(msg) => ErrorResponse {
                error: "Bad Request".to_string(),
                message: msg.clone(),
                details: None,
                code: Some("BAD_REQUEST".to_string()),
            },
            AppError::Conflict(msg) => ErrorResponse {
                error: "Conflict".to_string(),
                message: msg.clone(),
                details: None,
                code: Some("CONFLICT".to_string()),
            },
            AppError::Internal(msg) => {
                tracing::error!("Erro interno: {}", msg);
                ErrorResponse {
                    error: "Internal Server Error".to_string(),
                    message: msg.clone(),
                    details: None,
                    code: Some("INTERNAL_ERROR".to_string()),
                }
            }
        };

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_por_tipo() {
        assert_eq!(
            AppError::NotFound("Ordem não encontrada".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("campo inválido".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("falhou".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
