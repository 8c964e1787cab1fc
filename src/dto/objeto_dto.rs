//! DTOs dos endpoints JSON de objetos (veículos e afins)

use serde::Serialize;

use crate::database::record::Registro;

/// Resposta de objeto para os widgets dependentes do formulário
#[derive(Debug, Serialize)]
pub struct ObjetoResponse {
    pub id: Option<i64>,
    pub tipo: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub cor: Option<String>,
    pub placa: Option<String>,
}

impl ObjetoResponse {
    pub fn de_registro(registro: &Registro) -> Self {
        let texto = |nome: &str| {
            registro
                .get(nome)
                .and_then(|v| v.como_texto())
                .map(|s| s.to_string())
        };
        Self {
            id: registro.get("idobjeto").and_then(|v| v.como_i64()),
            tipo: texto("tipoobjeto"),
            marca: texto("marca"),
            modelo: texto("modelo"),
            cor: texto("cor"),
            placa: texto("placa"),
        }
    }
}

/// Resposta genérica da API
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::record::SqlValue;

    #[test]
    fn test_de_registro() {
        let mut registro = Registro::new();
        registro.insert("idobjeto".to_string(), SqlValue::Int(12));
        registro.insert("tipoobjeto".to_string(), SqlValue::Text("Moto".into()));
        registro.insert("placa".to_string(), SqlValue::Text("ABC1D23".into()));
        registro.insert("cor".to_string(), SqlValue::Null);

        let resposta = ObjetoResponse::de_registro(&registro);
        assert_eq!(resposta.id, Some(12));
        assert_eq!(resposta.tipo.as_deref(), Some("Moto"));
        assert_eq!(resposta.placa.as_deref(), Some("ABC1D23"));
        assert!(resposta.cor.is_none());
    }
}
