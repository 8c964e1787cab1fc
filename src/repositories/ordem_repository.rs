//! Repositório de ordens de serviço (tabela TORDEMSERVICO)

use tracing::warn;

use crate::config::LegacyDbConfig;
use crate::database::idgen::{eh_violacao_unicidade, ATRASO_TENTATIVA, MAX_TENTATIVAS};
use crate::database::ops::{self, OpcoesTabela};
use crate::database::record::{Registro, SqlValue};
use crate::utils::errors::AppError;

pub const TABELA_OS: &str = "TORDEMSERVICO";
pub const COLUNA_ID: &str = "IDORDEM";
pub const COLUNA_EMPRESA: &str = "EMPRESA";

pub const SITUACAO_REGISTRADA: &str = "REGISTRADA";
pub const SITUACAO_CANCELADA: &str = "CANCELADA";

pub struct OrdemRepository {
    config: LegacyDbConfig,
}

impl OrdemRepository {
    pub fn new(config: LegacyDbConfig) -> Self {
        Self { config }
    }

    fn opcoes(&self) -> OpcoesTabela<'static> {
        OpcoesTabela::nova(TABELA_OS, COLUNA_ID, COLUNA_EMPRESA)
    }

    /// Insere uma ordem para a empresa configurada e retorna o id criado.
    ///
    /// Sem generator configurado o id vem de MAX+1, que pode colidir com
    /// outro escritor; nesse caso o insert é refeito com id recalculado,
    /// até um limite fixo de tentativas. Qualquer outro erro aborta na hora.
    pub async fn inserir(&self, dados: Registro) -> Result<i64, AppError> {
        let empresa = self.config.empresa_default;
        let mut tentativa = 1u32;
        loop {
            match ops::inserir(&self.config, self.opcoes(), dados.clone(), empresa).await {
                Ok(id) => return Ok(id),
                Err(AppError::Database(ref erro))
                    if eh_violacao_unicidade(erro) && tentativa < MAX_TENTATIVAS =>
                {
                    warn!(
                        tentativa,
                        "Colisão de id na inserção da OS, recalculando e tentando de novo"
                    );
                    tokio::time::sleep(ATRASO_TENTATIVA).await;
                    tentativa += 1;
                }
                Err(erro) => return Err(erro),
            }
        }
    }

    /// Lista as ordens da empresa, mais recentes primeiro
    pub async fn listar(&self) -> Result<Vec<Registro>, AppError> {
        ops::listar(
            &self.config,
            self.opcoes(),
            self.config.empresa_default,
            Some("ABERTURADATA"),
            None,
        )
        .await
    }

    pub async fn obter(&self, id: i64) -> Result<Option<Registro>, AppError> {
        ops::obter(&self.config, self.opcoes(), self.config.empresa_default, id).await
    }

    /// Atualiza campos de uma ordem; retorna as linhas afetadas
    pub async fn atualizar(&self, id: i64, mudancas: Registro) -> Result<u64, AppError> {
        ops::atualizar(
            &self.config,
            self.opcoes(),
            self.config.empresa_default,
            id,
            mudancas,
        )
        .await
    }

    /// Cancelamento lógico: marca a situação como CANCELADA.
    ///
    /// Cancelar duas vezes é idempotente no efeito; a segunda chamada pode
    /// reportar zero linhas afetadas quando nada muda.
    pub async fn cancelar(&self, id: i64) -> Result<u64, AppError> {
        let mut mudancas = Registro::new();
        mudancas.insert(
            "SITUACAO".to_string(),
            SqlValue::Text(SITUACAO_CANCELADA.to_string()),
        );
        self.atualizar(id, mudancas).await
    }

    /// Remoção física, usada apenas por rotinas administrativas
    pub async fn remover(&self, id: i64) -> Result<u64, AppError> {
        ops::remover(&self.config, self.opcoes(), self.config.empresa_default, id).await
    }
}
