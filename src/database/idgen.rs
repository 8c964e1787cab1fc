//! Geração de ids para as tabelas legadas
//!
//! Quando um generator (sequence) está configurado, o próximo valor vem do
//! banco de forma atômica. Sem generator, cai no MAX(id)+1 escopado por
//! empresa, que pode colidir sob escrita concorrente; o caminho de insert
//! tenta de novo um número limitado de vezes quando detecta violação de
//! unicidade.

use std::time::Duration;

use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};

/// Tentativas máximas de insert após colisão de id
pub const MAX_TENTATIVAS: u32 = 3;

/// Espera fixa entre tentativas
pub const ATRASO_TENTATIVA: Duration = Duration::from_millis(150);

/// Calcula o próximo id para a tabela.
///
/// O nome do generator vem da configuração (não de entrada do usuário) e é
/// interpolado direto no SQL, como no sistema original.
pub async fn proximo_id(
    conexao: &mut PgConnection,
    gen_name: Option<&str>,
    tabela: &str,
    empresa: i64,
    coluna_id: &str,
    coluna_empresa: &str,
) -> Result<i64, sqlx::Error> {
    if let Some(generator) = gen_name {
        let sql = format!("SELECT nextval('{}')", generator.trim());
        let linha = sqlx::query(&sql).fetch_one(conexao).await?;
        return Ok(extrair_escalar(&linha).unwrap_or(1));
    }

    // fallback MAX+1 por empresa (sujeito a corrida entre escritores)
    let sql = format!(
        "SELECT COALESCE(MAX({}), 0) + 1 FROM {} WHERE {} = $1",
        coluna_id.to_uppercase(),
        tabela.to_uppercase(),
        coluna_empresa.to_uppercase()
    );
    let linha = sqlx::query(&sql).bind(empresa).fetch_optional(conexao).await?;
    Ok(linha.as_ref().and_then(extrair_escalar).unwrap_or(1))
}

/// Lê o primeiro valor da linha como inteiro, qualquer que seja a largura
pub fn extrair_escalar(linha: &PgRow) -> Option<i64> {
    linha
        .try_get::<i64, _>(0)
        .ok()
        .or_else(|| linha.try_get::<i32, _>(0).ok().map(i64::from))
        .or_else(|| linha.try_get::<i16, _>(0).ok().map(i64::from))
}

/// Detecta violação de unicidade pelo texto do erro.
///
/// O banco legado não expõe código estruturado por este caminho, então a
/// detecção é por palavras-chave na mensagem, como no sistema original.
pub fn eh_violacao_unicidade(erro: &sqlx::Error) -> bool {
    let texto = erro.to_string().to_lowercase();
    texto.contains("unique")
        || texto.contains("duplicate")
        || texto.contains("primary or unique key")
        || texto.contains("23505")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn erro_de_texto(texto: &str) -> sqlx::Error {
        sqlx::Error::Protocol(texto.to_string())
    }

    #[test]
    fn test_detecta_violacao_unicidade() {
        assert!(eh_violacao_unicidade(&erro_de_texto(
            "duplicate key value violates unique constraint \"tordemservico_pkey\""
        )));
        assert!(eh_violacao_unicidade(&erro_de_texto(
            "violation of PRIMARY or UNIQUE KEY constraint"
        )));
        assert!(eh_violacao_unicidade(&erro_de_texto("SQLSTATE 23505")));
    }

    #[test]
    fn test_nao_confunde_outros_erros() {
        assert!(!eh_violacao_unicidade(&erro_de_texto("connection refused")));
        assert!(!eh_violacao_unicidade(&erro_de_texto(
            "null value in column \"EMPRESA\""
        )));
    }
}
