//! Rotas JSON de consulta de objetos (usadas pelo JS do formulário)

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::controllers::objeto_controller::ObjetoController;
use crate::dto::objeto_dto::{ApiResponse, ObjetoResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_objeto_router() -> Router<AppState> {
    Router::new()
        .route("/por-proprietario/:cliente_id", get(objetos_por_proprietario))
        .route("/:pk", get(objeto_detail))
}

async fn objetos_por_proprietario(
    State(state): State<AppState>,
    Path(cliente_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ObjetoResponse>>>, AppError> {
    let controller = ObjetoController::new(state.db.clone());
    let objetos = controller.listar_por_proprietario(cliente_id).await?;
    Ok(Json(ApiResponse::success(objetos)))
}

async fn objeto_detail(
    State(state): State<AppState>,
    Path(pk): Path<i64>,
) -> Result<Json<ObjetoResponse>, AppError> {
    let controller = ObjetoController::new(state.db.clone());
    let objeto = controller.obter(pk).await?;
    Ok(Json(objeto))
}
