use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use ordemservico_backend::config::{EnvironmentConfig, LegacyDbConfig};
use ordemservico_backend::database::connection::{mascarar_url, verificar_conexao};
use ordemservico_backend::middleware::cors::cors_middleware;
use ordemservico_backend::routes;
use ordemservico_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Carregar variáveis de ambiente
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("🔧 Painel de Ordens de Serviço");
    info!("==============================");

    let config = EnvironmentConfig::default();
    let db = LegacyDbConfig::default();

    info!("🗄️  Banco legado: {}", mascarar_url(&db.url));
    info!("🏢 Empresa padrão: {}", db.empresa_default);

    // Sondagem única de conectividade; cada operação abre a própria conexão
    if let Err(e) = verificar_conexao(&db).await {
        error!("❌ Erro conectando ao banco legado: {}", e);
        return Err(anyhow::anyhow!("Erro de banco de dados: {}", e));
    }
    info!("✅ Banco legado acessível");

    let endereco = config.endereco();
    let app_state = AppState::new(config, db);

    let app = Router::new()
        .route("/health", get(health))
        .nest("/os", routes::ordem_routes::create_ordem_router())
        .nest("/api/objetos", routes::objeto_routes::create_objeto_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_middleware())
        .with_state(app_state);

    let addr: SocketAddr = endereco.parse()?;

    info!("🌐 Servidor iniciando em http://{}", addr);
    info!("🔍 Endpoints disponíveis:");
    info!("   GET  /health - Sondagem de vida");
    info!("📋 Fluxo de OS:");
    info!("   GET  /os - Painel de ordens");
    info!("   GET  /os/abrir - Formulário de abertura");
    info!("   POST /os/abrir - Abrir OS");
    info!("   GET  /os/sucesso/:pk - Página de sucesso");
    info!("   GET  /os/editar/:pk - Formulário de edição");
    info!("   POST /os/editar/:pk - Salvar edição");
    info!("   GET  /os/cancelar/:pk - Confirmação de cancelamento");
    info!("   POST /os/cancelar/:pk - Cancelar OS");
    info!("🚗 Consultas de objetos:");
    info!("   GET  /api/objetos/por-proprietario/:cliente_id - Objetos do cliente");
    info!("   GET  /api/objetos/:pk - Detalhe do objeto");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Erro do servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Sondagem de vida
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "service": "ordemservico-backend",
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Sinal de desligamento graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Ctrl+C recebido, desligando servidor...");
        },
        _ = terminate => {
            info!("🛑 SIGTERM recebido, desligando servidor...");
        },
    }
}
