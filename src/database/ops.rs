//! Operações CRUD genéricas sobre uma tabela do banco legado
//!
//! Cada operação abre a própria conexão, executa um único statement
//! parametrizado e fecha a conexão; nenhuma transação atravessa operações.
//! O SQL é montado em tempo de execução a partir dos metadados da tabela:
//! só entram no statement as colunas que existem de fato no catálogo.

use sqlx::Connection;
use tracing::warn;

use crate::config::LegacyDbConfig;
use crate::database::connection::abrir_conexao;
use crate::database::idgen::{extrair_escalar, proximo_id};
use crate::database::metadata::{metadados_da_tabela, TabelaMeta};
use crate::database::record::{
    chaves_maiusculas, linha_para_registro, vincular_valor, Registro, SqlValue,
};
use crate::utils::errors::AppError;

/// Identificação da tabela alvo e de suas colunas de controle
#[derive(Debug, Clone, Copy)]
pub struct OpcoesTabela<'a> {
    pub tabela: &'a str,
    pub coluna_id: &'a str,
    pub coluna_empresa: &'a str,
}

impl<'a> OpcoesTabela<'a> {
    pub fn nova(tabela: &'a str, coluna_id: &'a str, coluna_empresa: &'a str) -> Self {
        Self {
            tabela,
            coluna_id,
            coluna_empresa,
        }
    }
}

/// Insere um registro e retorna o id criado.
///
/// Garante EMPRESA e a coluna de id (gerando um valor quando ausente),
/// cruza os campos do chamador com as colunas reais da tabela e codifica
/// textos destinados a colunas BLOB. Tenta `INSERT ... RETURNING`; se o
/// banco recusar, repete uma vez sem RETURNING e devolve o id calculado
/// localmente.
pub async fn inserir(
    config: &LegacyDbConfig,
    opcoes: OpcoesTabela<'_>,
    dados: Registro,
    empresa: i64,
) -> Result<i64, AppError> {
    let mut conexao = abrir_conexao(config).await?;
    let meta = metadados_da_tabela(&mut conexao, opcoes.tabela).await?;
    if meta.vazia() {
        conexao.close().await.ok();
        return Err(AppError::BadRequest(format!(
            "Tabela {} não existe no catálogo do banco.",
            opcoes.tabela.to_uppercase()
        )));
    }

    let coluna_id = opcoes.coluna_id.to_uppercase();
    let coluna_empresa = opcoes.coluna_empresa.to_uppercase();

    let mut dados = chaves_maiusculas(dados);

    let id_local = match dados.get(&coluna_id).and_then(SqlValue::como_i64) {
        Some(id) => id,
        None => {
            let id = proximo_id(
                &mut conexao,
                config.gen_name.as_deref(),
                opcoes.tabela,
                empresa,
                &coluna_id,
                &coluna_empresa,
            )
            .await?;
            dados.insert(coluna_id.clone(), SqlValue::Int(id));
            id
        }
    };

    dados.insert(coluna_empresa.clone(), SqlValue::Int(empresa));

    let colunas = colunas_para_insert(&meta, &dados);
    if colunas.is_empty() {
        return Err(AppError::BadRequest(
            "Nenhuma coluna válida para inserção.".to_string(),
        ));
    }

    let parametros: Vec<SqlValue> = colunas
        .iter()
        .map(|c| codificar_se_blob(&meta, c, dados[c].clone(), config))
        .collect();

    let sql = montar_sql_insert(opcoes.tabela, &colunas, &coluna_id, true);
    let mut consulta = sqlx::query(&sql);
    for parametro in &parametros {
        consulta = vincular_valor(consulta, parametro);
    }

    let resultado = match consulta.fetch_optional(&mut conexao).await {
        Ok(Some(linha)) => Ok(extrair_escalar(&linha).unwrap_or(id_local)),
        Ok(None) => Ok(id_local),
        Err(erro) => {
            // tentativa de fallback sem RETURNING
            warn!(
                tabela = opcoes.tabela,
                "INSERT com RETURNING falhou, repetindo sem RETURNING: {}", erro
            );
            let sql = montar_sql_insert(opcoes.tabela, &colunas, &coluna_id, false);
            let mut consulta = sqlx::query(&sql);
            for parametro in &parametros {
                consulta = vincular_valor(consulta, parametro);
            }
            match consulta.execute(&mut conexao).await {
                Ok(_) => Ok(id_local),
                Err(erro) => Err(erro.into()),
            }
        }
    };
    conexao.close().await.ok();
    resultado
}

/// Lista os registros da empresa, com ordenação descendente opcional e
/// limite opcional de linhas
pub async fn listar(
    config: &LegacyDbConfig,
    opcoes: OpcoesTabela<'_>,
    empresa: i64,
    ordenar_por: Option<&str>,
    limite: Option<u32>,
) -> Result<Vec<Registro>, AppError> {
    let mut conexao = abrir_conexao(config).await?;
    let sql = montar_sql_listar(opcoes.tabela, opcoes.coluna_empresa, ordenar_por, limite);

    let linhas = sqlx::query(&sql)
        .bind(empresa)
        .fetch_all(&mut conexao)
        .await?;
    conexao.close().await.ok();

    Ok(linhas
        .iter()
        .map(|linha| linha_para_registro(linha, config.charset))
        .collect())
}

/// Busca um registro por empresa + id; None quando ausente
pub async fn obter(
    config: &LegacyDbConfig,
    opcoes: OpcoesTabela<'_>,
    empresa: i64,
    id: i64,
) -> Result<Option<Registro>, AppError> {
    let mut conexao = abrir_conexao(config).await?;
    let sql = format!(
        "SELECT * FROM {} WHERE {} = $1 AND {} = $2",
        opcoes.tabela.to_uppercase(),
        opcoes.coluna_empresa.to_uppercase(),
        opcoes.coluna_id.to_uppercase()
    );

    let linha = sqlx::query(&sql)
        .bind(empresa)
        .bind(id)
        .fetch_optional(&mut conexao)
        .await?;
    conexao.close().await.ok();

    Ok(linha.map(|l| linha_para_registro(&l, config.charset)))
}

/// Atualiza campos de um registro.
///
/// Só entram no SET as colunas conhecidas pelo catálogo; as colunas de id e
/// de empresa ficam de fora por segurança. Retorna o número de linhas
/// afetadas — zero não é fatal, o chamador decide como reportar.
pub async fn atualizar(
    config: &LegacyDbConfig,
    opcoes: OpcoesTabela<'_>,
    empresa: i64,
    id: i64,
    mudancas: Registro,
) -> Result<u64, AppError> {
    let mut conexao = abrir_conexao(config).await?;
    let meta = metadados_da_tabela(&mut conexao, opcoes.tabela).await?;
    if meta.vazia() {
        conexao.close().await.ok();
        return Err(AppError::BadRequest(format!(
            "Tabela {} não existe no catálogo do banco.",
            opcoes.tabela.to_uppercase()
        )));
    }

    let coluna_id = opcoes.coluna_id.to_uppercase();
    let coluna_empresa = opcoes.coluna_empresa.to_uppercase();

    let mudancas = chaves_maiusculas(mudancas);
    let colunas = colunas_para_update(&meta, &mudancas, &coluna_id, &coluna_empresa);
    if colunas.is_empty() {
        return Err(AppError::BadRequest(
            "Nenhuma coluna válida para atualizar.".to_string(),
        ));
    }

    let parametros: Vec<SqlValue> = colunas
        .iter()
        .map(|c| codificar_se_blob(&meta, c, mudancas[c].clone(), config))
        .collect();

    let sql = montar_sql_update(opcoes.tabela, &colunas, &coluna_empresa, &coluna_id);
    let mut consulta = sqlx::query(&sql);
    for parametro in &parametros {
        consulta = vincular_valor(consulta, parametro);
    }
    consulta = consulta.bind(empresa).bind(id);

    let resultado = consulta.execute(&mut conexao).await?;
    conexao.close().await.ok();
    Ok(resultado.rows_affected())
}

/// Remove um registro por empresa + id; retorna as linhas afetadas
pub async fn remover(
    config: &LegacyDbConfig,
    opcoes: OpcoesTabela<'_>,
    empresa: i64,
    id: i64,
) -> Result<u64, AppError> {
    let mut conexao = abrir_conexao(config).await?;
    let sql = format!(
        "DELETE FROM {} WHERE {} = $1 AND {} = $2",
        opcoes.tabela.to_uppercase(),
        opcoes.coluna_empresa.to_uppercase(),
        opcoes.coluna_id.to_uppercase()
    );

    let resultado = sqlx::query(&sql)
        .bind(empresa)
        .bind(id)
        .execute(&mut conexao)
        .await?;
    conexao.close().await.ok();
    Ok(resultado.rows_affected())
}

/// Colunas do INSERT: interseção entre os campos do chamador e as colunas
/// reais, na ordem do catálogo, descartando valores nulos
pub fn colunas_para_insert(meta: &TabelaMeta, dados: &Registro) -> Vec<String> {
    meta.nomes()
        .filter(|nome| dados.get(*nome).map(|v| !v.eh_nulo()).unwrap_or(false))
        .map(|nome| nome.to_string())
        .collect()
}

/// Colunas do UPDATE: como no INSERT, mas sem a chave primária e a coluna
/// de empresa
pub fn colunas_para_update(
    meta: &TabelaMeta,
    mudancas: &Registro,
    coluna_id: &str,
    coluna_empresa: &str,
) -> Vec<String> {
    colunas_para_insert(meta, mudancas)
        .into_iter()
        .filter(|nome| nome != coluna_id && nome != coluna_empresa)
        .collect()
}

pub fn montar_sql_insert(
    tabela: &str,
    colunas: &[String],
    coluna_id: &str,
    com_returning: bool,
) -> String {
    let marcadores: Vec<String> = (1..=colunas.len()).map(|i| format!("${}", i)).collect();
    let mut sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        tabela.to_uppercase(),
        colunas.join(", "),
        marcadores.join(", ")
    );
    if com_returning {
        sql.push_str(&format!(" RETURNING {}", coluna_id));
    }
    sql
}

pub fn montar_sql_update(
    tabela: &str,
    colunas: &[String],
    coluna_empresa: &str,
    coluna_id: &str,
) -> String {
    let set_partes: Vec<String> = colunas
        .iter()
        .enumerate()
        .map(|(i, nome)| format!("{} = ${}", nome, i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ${} AND {} = ${}",
        tabela.to_uppercase(),
        set_partes.join(", "),
        coluna_empresa,
        colunas.len() + 1,
        coluna_id,
        colunas.len() + 2
    )
}

pub fn montar_sql_listar(
    tabela: &str,
    coluna_empresa: &str,
    ordenar_por: Option<&str>,
    limite: Option<u32>,
) -> String {
    let mut sql = format!(
        "SELECT * FROM {} WHERE {} = $1",
        tabela.to_uppercase(),
        coluna_empresa.to_uppercase()
    );
    if let Some(coluna) = ordenar_por {
        sql.push_str(&format!(" ORDER BY {} DESC", coluna.to_uppercase()));
    }
    if let Some(n) = limite {
        sql.push_str(&format!(" LIMIT {}", n));
    }
    sql
}

fn codificar_se_blob(
    meta: &TabelaMeta,
    coluna: &str,
    valor: SqlValue,
    config: &LegacyDbConfig,
) -> SqlValue {
    match valor {
        SqlValue::Text(texto) if meta.eh_blob(coluna) => {
            SqlValue::Bytes(config.charset.codificar(&texto))
        }
        outro => outro,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::metadata::ColunaMeta;
    use crate::database::record::Charset;

    fn meta_os() -> TabelaMeta {
        let coluna = |tipo: &str, interno: &str| ColunaMeta {
            tipo: tipo.to_string(),
            tipo_interno: interno.to_string(),
        };
        TabelaMeta::nova(vec![
            ("IDORDEM".to_string(), coluna("integer", "int4")),
            ("EMPRESA".to_string(), coluna("integer", "int4")),
            ("SITUACAO".to_string(), coluna("character varying", "varchar")),
            ("DEFEITO".to_string(), coluna("bytea", "bytea")),
            ("DESCRICAOOBJETO".to_string(), coluna("character varying", "varchar")),
        ])
    }

    fn config_teste() -> LegacyDbConfig {
        LegacyDbConfig {
            url: "postgres://localhost/legado".to_string(),
            charset: Charset::Latin1,
            gen_name: None,
            empresa_default: 1,
        }
    }

    #[test]
    fn test_colunas_para_insert_ordem_do_catalogo() {
        let meta = meta_os();
        let mut dados = Registro::new();
        dados.insert("DEFEITO".to_string(), SqlValue::Text("tela quebrada".into()));
        dados.insert("SITUACAO".to_string(), SqlValue::Text("REGISTRADA".into()));
        dados.insert("CAMPO_FANTASMA".to_string(), SqlValue::Text("x".into()));

        let colunas = colunas_para_insert(&meta, &dados);
        // ordem do catálogo, coluna desconhecida descartada
        assert_eq!(colunas, vec!["SITUACAO", "DEFEITO"]);
    }

    #[test]
    fn test_colunas_para_insert_descarta_nulos() {
        let meta = meta_os();
        let mut dados = Registro::new();
        dados.insert("DEFEITO".to_string(), SqlValue::Null);
        dados.insert("SITUACAO".to_string(), SqlValue::Text("REGISTRADA".into()));

        let colunas = colunas_para_insert(&meta, &dados);
        assert_eq!(colunas, vec!["SITUACAO"]);
    }

    #[test]
    fn test_colunas_para_update_exclui_chave_e_empresa() {
        let meta = meta_os();
        let mut mudancas = Registro::new();
        mudancas.insert("IDORDEM".to_string(), SqlValue::Int(9));
        mudancas.insert("EMPRESA".to_string(), SqlValue::Int(2));
        mudancas.insert("DEFEITO".to_string(), SqlValue::Text("nova descrição".into()));

        let colunas = colunas_para_update(&meta, &mudancas, "IDORDEM", "EMPRESA");
        assert_eq!(colunas, vec!["DEFEITO"]);
    }

    #[test]
    fn test_montar_sql_insert() {
        let colunas = vec!["SITUACAO".to_string(), "DEFEITO".to_string()];
        assert_eq!(
            montar_sql_insert("tordemservico", &colunas, "IDORDEM", true),
            "INSERT INTO TORDEMSERVICO (SITUACAO, DEFEITO) VALUES ($1, $2) RETURNING IDORDEM"
        );
        assert_eq!(
            montar_sql_insert("tordemservico", &colunas, "IDORDEM", false),
            "INSERT INTO TORDEMSERVICO (SITUACAO, DEFEITO) VALUES ($1, $2)"
        );
    }

    #[test]
    fn test_montar_sql_update_numeracao() {
        let colunas = vec!["SITUACAO".to_string(), "DEFEITO".to_string()];
        assert_eq!(
            montar_sql_update("tordemservico", &colunas, "EMPRESA", "IDORDEM"),
            "UPDATE TORDEMSERVICO SET SITUACAO = $1, DEFEITO = $2 WHERE EMPRESA = $3 AND IDORDEM = $4"
        );
    }

    #[test]
    fn test_montar_sql_listar() {
        assert_eq!(
            montar_sql_listar("tordemservico", "empresa", Some("aberturadata"), Some(50)),
            "SELECT * FROM TORDEMSERVICO WHERE EMPRESA = $1 ORDER BY ABERTURADATA DESC LIMIT 50"
        );
        assert_eq!(
            montar_sql_listar("tordemservico", "empresa", None, None),
            "SELECT * FROM TORDEMSERVICO WHERE EMPRESA = $1"
        );
    }

    #[test]
    fn test_codificar_se_blob() {
        let meta = meta_os();
        let config = config_teste();
        let codificado = codificar_se_blob(
            &meta,
            "DEFEITO",
            SqlValue::Text("não liga".into()),
            &config,
        );
        assert_eq!(
            codificado,
            SqlValue::Bytes(config.charset.codificar("não liga"))
        );

        // coluna texto comum passa intacta
        let intacto = codificar_se_blob(
            &meta,
            "SITUACAO",
            SqlValue::Text("REGISTRADA".into()),
            &config,
        );
        assert_eq!(intacto, SqlValue::Text("REGISTRADA".into()));
    }
}
