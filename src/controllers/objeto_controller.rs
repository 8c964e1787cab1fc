//! Controller dos endpoints JSON de objetos

use crate::config::LegacyDbConfig;
use crate::dto::objeto_dto::ObjetoResponse;
use crate::repositories::objeto_repository::ObjetoRepository;
use crate::utils::errors::AppError;

pub struct ObjetoController {
    repository: ObjetoRepository,
}

impl ObjetoController {
    pub fn new(config: LegacyDbConfig) -> Self {
        Self {
            repository: ObjetoRepository::new(config),
        }
    }

    /// Objetos de um cliente, para preencher o widget do formulário
    pub async fn listar_por_proprietario(
        &self,
        cliente_id: i64,
    ) -> Result<Vec<ObjetoResponse>, AppError> {
        let registros = self.repository.listar_por_proprietario(cliente_id).await?;
        Ok(registros.iter().map(ObjetoResponse::de_registro).collect())
    }

    /// Detalhe de um objeto por id
    pub async fn obter(&self, id: i64) -> Result<ObjetoResponse, AppError> {
        let registro = self
            .repository
            .obter(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Objeto não encontrado".to_string()))?;
        Ok(ObjetoResponse::de_registro(&registro))
    }
}
