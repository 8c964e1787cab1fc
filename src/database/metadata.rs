//! Introspecção de metadados
//!
//! Este módulo consulta o catálogo do próprio banco para descobrir as
//! colunas reais de cada tabela alvo, seus tipos declarados e o tipo
//! interno. É essa informação que decide quando um texto precisa ser
//! convertido em BLOB binário antes do INSERT/UPDATE.
//!
//! A consulta é feita a cada chamada, sem cache, porque o schema pertence
//! ao sistema legado e pode mudar por fora.

use sqlx::{PgConnection, Row};

/// Metadados de uma coluna da tabela alvo
#[derive(Debug, Clone)]
pub struct ColunaMeta {
    /// Tipo declarado (ex.: "character varying", "bytea")
    pub tipo: String,
    /// Nome do tipo interno (ex.: "varchar", "bytea")
    pub tipo_interno: String,
}

impl ColunaMeta {
    /// Coluna que armazena texto como bytes (BLOB binário no legado)
    pub fn eh_blob(&self) -> bool {
        self.tipo_interno.eq_ignore_ascii_case("bytea")
    }
}

/// Metadados de uma tabela: colunas em ordem de posição + consulta por nome
#[derive(Debug, Clone, Default)]
pub struct TabelaMeta {
    colunas: Vec<(String, ColunaMeta)>,
}

impl TabelaMeta {
    pub fn nova(colunas: Vec<(String, ColunaMeta)>) -> Self {
        Self { colunas }
    }

    /// Nomes das colunas (maiúsculos), na ordem do catálogo
    pub fn nomes(&self) -> impl Iterator<Item = &str> {
        self.colunas.iter().map(|(nome, _)| nome.as_str())
    }

    pub fn get(&self, nome: &str) -> Option<&ColunaMeta> {
        self.colunas
            .iter()
            .find(|(n, _)| n == nome)
            .map(|(_, meta)| meta)
    }

    pub fn eh_blob(&self, nome: &str) -> bool {
        self.get(nome).map(|m| m.eh_blob()).unwrap_or(false)
    }

    /// O catálogo não conhece a tabela (nenhuma coluna retornada)
    pub fn vazia(&self) -> bool {
        self.colunas.is_empty()
    }
}

/// Consulta o catálogo do banco e retorna os metadados da tabela.
///
/// Uma consulta read-only por chamada; erro de conectividade sobe para o
/// chamador.
pub async fn metadados_da_tabela(
    conexao: &mut PgConnection,
    tabela: &str,
) -> Result<TabelaMeta, sqlx::Error> {
    let sql = r#"
        SELECT UPPER(TRIM(column_name)) AS nome,
               CAST(data_type AS TEXT) AS data_type,
               CAST(udt_name AS TEXT) AS udt_name
        FROM information_schema.columns
        WHERE UPPER(table_name) = UPPER($1)
        ORDER BY ordinal_position
    "#;

    let linhas = sqlx::query(sql)
        .bind(tabela.trim())
        .fetch_all(conexao)
        .await?;

    let colunas = linhas
        .iter()
        .map(|linha| {
            let nome: String = linha.get("nome");
            let meta = ColunaMeta {
                tipo: linha.get("data_type"),
                tipo_interno: linha.get("udt_name"),
            };
            (nome, meta)
        })
        .collect();

    Ok(TabelaMeta::nova(colunas))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta_exemplo() -> TabelaMeta {
        TabelaMeta::nova(vec![
            (
                "IDORDEM".to_string(),
                ColunaMeta {
                    tipo: "integer".to_string(),
                    tipo_interno: "int4".to_string(),
                },
            ),
            (
                "DEFEITO".to_string(),
                ColunaMeta {
                    tipo: "bytea".to_string(),
                    tipo_interno: "bytea".to_string(),
                },
            ),
            (
                "SITUACAO".to_string(),
                ColunaMeta {
                    tipo: "character varying".to_string(),
                    tipo_interno: "varchar".to_string(),
                },
            ),
        ])
    }

    #[test]
    fn test_detecta_blob() {
        let meta = meta_exemplo();
        assert!(meta.eh_blob("DEFEITO"));
        assert!(!meta.eh_blob("SITUACAO"));
        assert!(!meta.eh_blob("INEXISTENTE"));
    }

    #[test]
    fn test_ordem_das_colunas() {
        let meta = meta_exemplo();
        let nomes: Vec<&str> = meta.nomes().collect();
        assert_eq!(nomes, vec!["IDORDEM", "DEFEITO", "SITUACAO"]);
    }

    #[test]
    fn test_tabela_desconhecida_fica_vazia() {
        assert!(TabelaMeta::default().vazia());
        assert!(!meta_exemplo().vazia());
    }
}
