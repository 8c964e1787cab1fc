//! Configuração do banco de dados legado
//!
//! Este módulo carrega os parâmetros de conexão com o banco legado:
//! URL, charset dos BLOBs, generator opcional de chaves primárias e a
//! empresa (tenant) padrão que escopa todos os registros.

use crate::database::record::Charset;

/// Configuração da conexão com o banco legado
#[derive(Debug, Clone)]
pub struct LegacyDbConfig {
    pub url: String,
    /// Charset usado para codificar/decodificar colunas BLOB
    pub charset: Charset,
    /// Nome do generator de ids; quando ausente, usa MAX(id)+1 por empresa
    pub gen_name: Option<String>,
    /// Empresa padrão que escopa todas as operações
    pub empresa_default: i64,
}

impl Default for LegacyDbConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .expect("DATABASE_URL deve estar definida nas variáveis de ambiente"),
            charset: Charset::from_name(
                &std::env::var("DB_CHARSET").unwrap_or_else(|_| "ISO8859_1".to_string()),
            ),
            gen_name: std::env::var("DB_GEN_NAME").ok().filter(|s| !s.trim().is_empty()),
            empresa_default: std::env::var("EMPRESA_DEFAULT")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .expect("EMPRESA_DEFAULT deve ser um número válido"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_padrao_latin1() {
        let cfg = LegacyDbConfig {
            url: "postgres://localhost/legado".to_string(),
            charset: Charset::from_name("ISO8859_1"),
            gen_name: None,
            empresa_default: 1,
        };
        assert_eq!(cfg.charset, Charset::Latin1);
        assert!(cfg.gen_name.is_none());
    }
}
