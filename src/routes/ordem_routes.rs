//! Rotas HTML do fluxo de ordem de serviço

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};

use crate::controllers::ordem_controller::OrdemController;
use crate::dto::ordem_dto::{ErrosFormulario, OrdemServicoForm};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::views;

pub fn create_ordem_router() -> Router<AppState> {
    Router::new()
        .route("/", get(listar_os))
        .route("/abrir", get(form_abrir).post(submeter_abrir))
        .route("/sucesso/:pk", get(sucesso))
        .route("/editar/:pk", get(form_editar).post(submeter_editar))
        .route(
            "/cancelar/:pk",
            get(confirmar_cancelamento).post(efetivar_cancelamento),
        )
}

/// Painel com as ordens da empresa configurada
async fn listar_os(State(state): State<AppState>) -> Result<Response, AppError> {
    let controller = OrdemController::new(state.db.clone());
    let ordens = controller.listar().await?;
    Ok(views::pagina_listar(&ordens).into_response())
}

/// Formulário público para abrir uma OS
async fn form_abrir(State(_state): State<AppState>) -> Response {
    views::pagina_abrir_os(&OrdemServicoForm::default(), &ErrosFormulario::default())
        .into_response()
}

async fn submeter_abrir(
    State(state): State<AppState>,
    Form(form): Form<OrdemServicoForm>,
) -> Response {
    let controller = OrdemController::new(state.db.clone());
    match controller.abrir(&form).await {
        Ok(id) => Redirect::to(&format!("/os/sucesso/{}", id)).into_response(),
        Err(erros) => views::pagina_abrir_os(&form, &erros).into_response(),
    }
}

/// Página de sucesso mostrando a OS criada
async fn sucesso(
    State(state): State<AppState>,
    Path(pk): Path<i64>,
) -> Result<Response, AppError> {
    let controller = OrdemController::new(state.db.clone());
    match controller.obter(pk).await? {
        Some(registro) => Ok(views::pagina_sucesso(pk, &registro).into_response()),
        None => Ok(nao_encontrada()),
    }
}

/// GET preenche o formulário com o registro atual
async fn form_editar(
    State(state): State<AppState>,
    Path(pk): Path<i64>,
) -> Result<Response, AppError> {
    let controller = OrdemController::new(state.db.clone());
    match controller.obter(pk).await? {
        Some(registro) => {
            let form = OrdemServicoForm::de_registro(&registro);
            Ok(views::pagina_editar_os(pk, &form, &ErrosFormulario::default()).into_response())
        }
        None => Ok(nao_encontrada()),
    }
}

async fn submeter_editar(
    State(state): State<AppState>,
    Path(pk): Path<i64>,
    Form(form): Form<OrdemServicoForm>,
) -> Result<Response, AppError> {
    let controller = OrdemController::new(state.db.clone());
    if controller.obter(pk).await?.is_none() {
        return Ok(nao_encontrada());
    }

    match controller.editar(pk, &form).await {
        Ok(()) => Ok(Redirect::to("/os").into_response()),
        Err(erros) => Ok(views::pagina_editar_os(pk, &form, &erros).into_response()),
    }
}

/// Página de confirmação do cancelamento
async fn confirmar_cancelamento(
    State(state): State<AppState>,
    Path(pk): Path<i64>,
) -> Result<Response, AppError> {
    let controller = OrdemController::new(state.db.clone());
    match controller.obter(pk).await? {
        Some(registro) => {
            Ok(views::pagina_confirmar_cancelamento(pk, &registro, None).into_response())
        }
        None => Ok(nao_encontrada()),
    }
}

/// POST efetiva o cancelamento lógico e volta ao painel.
///
/// Cancelar uma OS já cancelada não muda nada e segue para o painel do
/// mesmo jeito.
async fn efetivar_cancelamento(
    State(state): State<AppState>,
    Path(pk): Path<i64>,
) -> Result<Response, AppError> {
    let controller = OrdemController::new(state.db.clone());
    let registro = match controller.obter(pk).await? {
        Some(registro) => registro,
        None => return Ok(nao_encontrada()),
    };

    match controller.cancelar(pk).await {
        Ok(_) => Ok(Redirect::to("/os").into_response()),
        Err(erro) => Ok(views::pagina_confirmar_cancelamento(
            pk,
            &registro,
            Some(&format!("Erro ao cancelar: {}", erro)),
        )
        .into_response()),
    }
}

fn nao_encontrada() -> Response {
    (
        StatusCode::NOT_FOUND,
        views::pagina_nao_encontrada("Ordem não encontrada"),
    )
        .into_response()
}
