//! Configuração do projeto
//!
//! Este módulo contém a configuração do banco legado, variáveis de ambiente
//! e outras configurações do sistema. Tudo é carregado uma única vez na
//! inicialização do processo.

pub mod database;
pub mod environment;

pub use database::LegacyDbConfig;
pub use environment::EnvironmentConfig;
