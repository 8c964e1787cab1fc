//! Utilidades de validação
//!
//! Este módulo contém funções helper para validação e conversão dos campos
//! do formulário de ordem de serviço.

use chrono::{NaiveDate, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

lazy_static! {
    // formato antigo AAA9999 e formato Mercosul AAA9A99
    static ref RE_PLACA: Regex =
        Regex::new(r"^[A-Z]{3}-?\d[A-Z0-9]\d{2}$").unwrap();
}

/// Validar e converter string para data (AAAA-MM-DD, como vem do input date)
pub fn validar_data(valor: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(valor, "%Y-%m-%d").map_err(|_| {
        let mut erro = ValidationError::new("data");
        erro.add_param("valor".into(), &valor.to_string());
        erro.add_param("formato".into(), &"AAAA-MM-DD".to_string());
        erro
    })
}

/// Validar e converter string para hora (HH:MM ou HH:MM:SS)
pub fn validar_hora(valor: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(valor, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(valor, "%H:%M"))
        .map_err(|_| {
            let mut erro = ValidationError::new("hora");
            erro.add_param("valor".into(), &valor.to_string());
            erro.add_param("formato".into(), &"HH:MM".to_string());
            erro
        })
}

/// Validar e converter string para valor decimal (campo ENTRADA)
pub fn validar_decimal(valor: &str) -> Result<Decimal, ValidationError> {
    // aceita vírgula como separador decimal, comum nos formulários
    let normalizado = valor.trim().replace(',', ".");
    normalizado.parse::<Decimal>().map_err(|_| {
        let mut erro = ValidationError::new("decimal");
        erro.add_param("valor".into(), &valor.to_string());
        erro
    })
}

/// Validar placa de veículo (formato antigo ou Mercosul)
pub fn validar_placa(valor: &str) -> Result<(), ValidationError> {
    if RE_PLACA.is_match(&valor.trim().to_uppercase()) {
        Ok(())
    } else {
        let mut erro = ValidationError::new("placa");
        erro.add_param("valor".into(), &valor.to_string());
        Err(erro)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validar_data() {
        assert!(validar_data("2024-03-05").is_ok());
        assert!(validar_data("05/03/2024").is_err());
        assert!(validar_data("").is_err());
    }

    #[test]
    fn test_validar_hora() {
        assert!(validar_hora("14:30").is_ok());
        assert!(validar_hora("14:30:15").is_ok());
        assert!(validar_hora("25:00").is_err());
    }

    #[test]
    fn test_validar_decimal_aceita_virgula() {
        assert_eq!(validar_decimal("150,50").unwrap().to_string(), "150.50");
        assert_eq!(validar_decimal("150.50").unwrap().to_string(), "150.50");
        assert!(validar_decimal("abc").is_err());
    }

    #[test]
    fn test_validar_placa() {
        assert!(validar_placa("ABC1234").is_ok());
        assert!(validar_placa("abc-1234").is_ok());
        assert!(validar_placa("ABC1D23").is_ok());
        assert!(validar_placa("A1B2C3").is_err());
    }
}
