//! Mapeamento de registros
//!
//! Este módulo converte entre registros da aplicação (chaves minúsculas,
//! valores `SqlValue`) e linhas do banco legado (colunas maiúsculas),
//! incluindo a codificação/decodificação de BLOBs binários através do
//! charset configurado.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row, TypeInfo};

/// Registro genérico: nome da coluna -> valor
pub type Registro = HashMap<String, SqlValue>;

/// Valor SQL dinâmico suportado pela camada de acesso
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl SqlValue {
    pub fn eh_nulo(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn como_texto(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn como_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Representação amigável para páginas HTML
    pub fn exibir(&self) -> String {
        match self {
            SqlValue::Null => String::new(),
            SqlValue::Bool(v) => v.to_string(),
            SqlValue::Int(v) => v.to_string(),
            SqlValue::Float(v) => v.to_string(),
            SqlValue::Decimal(v) => v.to_string(),
            SqlValue::Text(v) => v.clone(),
            SqlValue::Bytes(v) => format!("<{} bytes>", v.len()),
            SqlValue::Date(v) => v.format("%d/%m/%Y").to_string(),
            SqlValue::Time(v) => v.format("%H:%M").to_string(),
            SqlValue::Timestamp(v) => v.format("%d/%m/%Y %H:%M").to_string(),
        }
    }

    /// Conversão para JSON (endpoints de consulta de objetos)
    pub fn como_json(&self) -> serde_json::Value {
        match self {
            SqlValue::Null => serde_json::Value::Null,
            SqlValue::Bool(v) => serde_json::json!(v),
            SqlValue::Int(v) => serde_json::json!(v),
            SqlValue::Float(v) => serde_json::json!(v),
            SqlValue::Decimal(v) => serde_json::json!(v.to_string()),
            SqlValue::Text(v) => serde_json::json!(v),
            SqlValue::Bytes(v) => serde_json::json!(format!("<{} bytes>", v.len())),
            SqlValue::Date(v) => serde_json::json!(v.format("%Y-%m-%d").to_string()),
            SqlValue::Time(v) => serde_json::json!(v.format("%H:%M:%S").to_string()),
            SqlValue::Timestamp(v) => serde_json::json!(v.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

/// Charset usado nos BLOBs de texto do banco legado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Latin1,
    Utf8,
}

impl Charset {
    /// Interpreta o nome vindo da configuração (ISO8859_1, WIN1252, UTF8...)
    pub fn from_name(nome: &str) -> Self {
        match nome.trim().to_ascii_uppercase().as_str() {
            "UTF8" | "UTF-8" => Charset::Utf8,
            // ISO8859_1, LATIN1, WIN1252 e afins tratados como latin-1
            _ => Charset::Latin1,
        }
    }

    /// Codifica texto para os bytes do BLOB; caracteres fora do charset
    /// são substituídos por '?'
    pub fn codificar(&self, texto: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => texto.as_bytes().to_vec(),
            Charset::Latin1 => texto
                .chars()
                .map(|c| {
                    let cp = c as u32;
                    if cp <= 0xFF {
                        cp as u8
                    } else {
                        b'?'
                    }
                })
                .collect(),
        }
    }

    /// Decodifica os bytes de um BLOB; retorna None quando os bytes não
    /// formam texto válido no charset (o chamador mantém os bytes crus)
    pub fn decodificar(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Charset::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            Charset::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

/// Normaliza as chaves de um registro para maiúsculas (lado do banco)
pub fn chaves_maiusculas(registro: Registro) -> Registro {
    registro
        .into_iter()
        .map(|(k, v)| (k.to_uppercase(), v))
        .collect()
}

/// Converte uma linha do banco em registro com chaves minúsculas.
///
/// BLOBs são decodificados com o charset configurado; quando a decodificação
/// falha, os bytes crus são mantidos, como no sistema original.
pub fn linha_para_registro(linha: &PgRow, charset: Charset) -> Registro {
    let mut registro = Registro::new();
    for (i, coluna) in linha.columns().iter().enumerate() {
        let nome = coluna.name().trim().to_lowercase();
        let valor = decodificar_valor(linha, i, coluna.type_info().name(), charset);
        registro.insert(nome, valor);
    }
    registro
}

fn decodificar_valor(linha: &PgRow, indice: usize, tipo: &str, charset: Charset) -> SqlValue {
    match tipo {
        "INT2" => linha
            .try_get::<Option<i16>, _>(indice)
            .ok()
            .flatten()
            .map(|v| SqlValue::Int(v as i64))
            .unwrap_or(SqlValue::Null),
        "INT4" => linha
            .try_get::<Option<i32>, _>(indice)
            .ok()
            .flatten()
            .map(|v| SqlValue::Int(v as i64))
            .unwrap_or(SqlValue::Null),
        "INT8" => linha
            .try_get::<Option<i64>, _>(indice)
            .ok()
            .flatten()
            .map(SqlValue::Int)
            .unwrap_or(SqlValue::Null),
        "FLOAT4" => linha
            .try_get::<Option<f32>, _>(indice)
            .ok()
            .flatten()
            .map(|v| SqlValue::Float(v as f64))
            .unwrap_or(SqlValue::Null),
        "FLOAT8" => linha
            .try_get::<Option<f64>, _>(indice)
            .ok()
            .flatten()
            .map(SqlValue::Float)
            .unwrap_or(SqlValue::Null),
        "NUMERIC" => linha
            .try_get::<Option<Decimal>, _>(indice)
            .ok()
            .flatten()
            .map(SqlValue::Decimal)
            .unwrap_or(SqlValue::Null),
        "BOOL" => linha
            .try_get::<Option<bool>, _>(indice)
            .ok()
            .flatten()
            .map(SqlValue::Bool)
            .unwrap_or(SqlValue::Null),
        "DATE" => linha
            .try_get::<Option<NaiveDate>, _>(indice)
            .ok()
            .flatten()
            .map(SqlValue::Date)
            .unwrap_or(SqlValue::Null),
        "TIME" => linha
            .try_get::<Option<NaiveTime>, _>(indice)
            .ok()
            .flatten()
            .map(SqlValue::Time)
            .unwrap_or(SqlValue::Null),
        "TIMESTAMP" => linha
            .try_get::<Option<NaiveDateTime>, _>(indice)
            .ok()
            .flatten()
            .map(SqlValue::Timestamp)
            .unwrap_or(SqlValue::Null),
        "TIMESTAMPTZ" => linha
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(indice)
            .ok()
            .flatten()
            .map(|v| SqlValue::Timestamp(v.naive_utc()))
            .unwrap_or(SqlValue::Null),
        "BYTEA" => match linha.try_get::<Option<Vec<u8>>, _>(indice).ok().flatten() {
            Some(bytes) => match charset.decodificar(&bytes) {
                Some(texto) => SqlValue::Text(texto),
                None => SqlValue::Bytes(bytes),
            },
            None => SqlValue::Null,
        },
        // VARCHAR, TEXT, CHAR, BPCHAR e o que mais vier como texto
        _ => linha
            .try_get::<Option<String>, _>(indice)
            .ok()
            .flatten()
            .map(|s| SqlValue::Text(s.trim_end().to_string()))
            .unwrap_or(SqlValue::Null),
    }
}

/// Adiciona um valor dinâmico à consulta parametrizada
pub fn vincular_valor<'q>(
    consulta: Query<'q, Postgres, PgArguments>,
    valor: &SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match valor {
        SqlValue::Null => consulta.bind(Option::<String>::None),
        SqlValue::Bool(v) => consulta.bind(*v),
        SqlValue::Int(v) => consulta.bind(*v),
        SqlValue::Float(v) => consulta.bind(*v),
        SqlValue::Decimal(v) => consulta.bind(*v),
        SqlValue::Text(v) => consulta.bind(v.clone()),
        SqlValue::Bytes(v) => consulta.bind(v.clone()),
        SqlValue::Date(v) => consulta.bind(*v),
        SqlValue::Time(v) => consulta.bind(*v),
        SqlValue::Timestamp(v) => consulta.bind(*v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_ida_e_volta() {
        let charset = Charset::from_name("ISO8859_1");
        let texto = "revisão de suspensão";
        let bytes = charset.codificar(texto);
        assert_eq!(charset.decodificar(&bytes).unwrap(), texto);
    }

    #[test]
    fn test_latin1_substitui_fora_do_charset() {
        let charset = Charset::Latin1;
        let bytes = charset.codificar("ok €");
        assert_eq!(bytes, b"ok ?".to_vec());
    }

    #[test]
    fn test_utf8_invalido_mantem_bytes() {
        let charset = Charset::Utf8;
        assert!(charset.decodificar(&[0xFF, 0xFE]).is_none());
    }

    #[test]
    fn test_charset_desconhecido_vira_latin1() {
        assert_eq!(Charset::from_name("WIN1252"), Charset::Latin1);
        assert_eq!(Charset::from_name("utf-8"), Charset::Utf8);
    }

    #[test]
    fn test_chaves_maiusculas() {
        let mut registro = Registro::new();
        registro.insert("defeito".to_string(), SqlValue::Text("tela quebrada".into()));
        let maiusculo = chaves_maiusculas(registro);
        assert!(maiusculo.contains_key("DEFEITO"));
    }

    #[test]
    fn test_exibir_valores() {
        assert_eq!(SqlValue::Null.exibir(), "");
        assert_eq!(SqlValue::Int(42).exibir(), "42");
        assert_eq!(
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()).exibir(),
            "05/03/2024"
        );
    }

    #[test]
    fn test_como_json() {
        assert_eq!(SqlValue::Null.como_json(), serde_json::Value::Null);
        assert_eq!(SqlValue::Text("abc".into()).como_json(), serde_json::json!("abc"));
        assert_eq!(SqlValue::Int(7).como_json(), serde_json::json!(7));
    }
}
