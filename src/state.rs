//! Estado compartilhado da aplicação
//!
//! Este módulo define o estado passado pelo router do Axum: só a
//! configuração carregada na inicialização. Não há pool de conexões nem
//! estado mutável de processo; cada operação abre a própria conexão.

use crate::config::{EnvironmentConfig, LegacyDbConfig};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub db: LegacyDbConfig,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, db: LegacyDbConfig) -> Self {
        Self { config, db }
    }
}
