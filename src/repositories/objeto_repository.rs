//! Repositório de objetos (tabela TOBJETO)
//!
//! Consultas read-only usadas pelos widgets dependentes do formulário:
//! objetos de um proprietário e detalhe de um objeto.

use sqlx::Connection;

use crate::config::LegacyDbConfig;
use crate::database::connection::abrir_conexao;
use crate::database::ops::{self, OpcoesTabela};
use crate::database::record::{linha_para_registro, Registro};
use crate::utils::errors::AppError;

pub const TABELA_OBJETO: &str = "TOBJETO";
pub const COLUNA_ID: &str = "IDOBJETO";
pub const COLUNA_EMPRESA: &str = "EMPRESA";

pub struct ObjetoRepository {
    config: LegacyDbConfig,
}

impl ObjetoRepository {
    pub fn new(config: LegacyDbConfig) -> Self {
        Self { config }
    }

    fn opcoes(&self) -> OpcoesTabela<'static> {
        OpcoesTabela::nova(TABELA_OBJETO, COLUNA_ID, COLUNA_EMPRESA)
    }

    pub async fn obter(&self, id: i64) -> Result<Option<Registro>, AppError> {
        ops::obter(&self.config, self.opcoes(), self.config.empresa_default, id).await
    }

    /// Objetos pertencentes a um cliente, na ordem do id
    pub async fn listar_por_proprietario(
        &self,
        cliente_id: i64,
    ) -> Result<Vec<Registro>, AppError> {
        let mut conexao = abrir_conexao(&self.config).await?;
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1 AND IDPROPRIETARIO = $2 ORDER BY {}",
            TABELA_OBJETO, COLUNA_EMPRESA, COLUNA_ID
        );

        let linhas = sqlx::query(&sql)
            .bind(self.config.empresa_default)
            .bind(cliente_id)
            .fetch_all(&mut conexao)
            .await?;
        conexao.close().await.ok();

        Ok(linhas
            .iter()
            .map(|linha| linha_para_registro(linha, self.config.charset))
            .collect())
    }
}
