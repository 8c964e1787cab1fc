//! Configuração de variáveis de ambiente
//!
//! Este módulo cuida da configuração do servidor HTTP (host/porta).

use std::env;

/// Configuração do ambiente de execução
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub host: String,
    pub port: u16,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT deve ser um número válido"),
        }
    }
}

impl EnvironmentConfig {
    /// Endereço completo para o bind do servidor
    pub fn endereco(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
