//! DTOs do fluxo de ordem de serviço

use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationErrors};

use crate::database::record::{Registro, SqlValue};

/// Campo de formulário: string vazia vira None
pub fn vazio_como_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let valor = Option::<String>::deserialize(deserializer)?;
    Ok(valor
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Formulário de abertura/edição de ordem de serviço.
///
/// Todos os campos são opcionais, como no formulário original; a conversão
/// para colunas do banco é feita pelo controller.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct OrdemServicoForm {
    #[serde(default, deserialize_with = "vazio_como_none")]
    pub idobjeto: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    #[validate(length(max = 80, message = "Tipo muito longo"))]
    pub tipo_objeto: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    #[validate(length(max = 80, message = "Marca muito longa"))]
    pub marca: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    #[validate(length(max = 120, message = "Modelo muito longo"))]
    pub modelo: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    #[validate(length(max = 300, message = "Descrição do objeto muito longa"))]
    pub descricaoobjeto: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    pub defeito: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    pub idusuario: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    #[validate(length(max = 32, message = "Placa muito longa"))]
    pub placa: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    #[validate(length(max = 100, message = "Localização muito longa"))]
    pub localizacao: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    pub previsao_data: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    pub previsao_hora: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    pub pertencentes: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    pub observacoes: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    pub entrada: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    #[validate(length(max = 120, message = "Proprietário muito longo"))]
    pub proprietario: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    #[validate(length(max = 50, message = "Condição de pagamento muito longa"))]
    pub cond_pagto: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    #[validate(length(max = 80, message = "Natureza muito longa"))]
    pub natureza: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    #[validate(length(max = 120, message = "Vendedor muito longo"))]
    pub vendedor: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    #[validate(length(max = 120, message = "Técnico muito longo"))]
    pub tecnico: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    #[validate(length(max = 200, message = "Nome muito longo"))]
    pub nome_cliente: Option<String>,

    #[serde(default, deserialize_with = "vazio_como_none")]
    #[validate(email(message = "Email inválido"))]
    pub email_cliente: Option<String>,
}

impl OrdemServicoForm {
    /// Preenche o formulário a partir de um registro do banco (edição)
    pub fn de_registro(registro: &Registro) -> Self {
        let campo = |nome: &str| registro.get(nome).and_then(valor_para_input);
        Self {
            idobjeto: campo("idobjeto"),
            tipo_objeto: campo("tipoobjeto"),
            marca: campo("marca"),
            modelo: campo("modelo"),
            descricaoobjeto: campo("descricaoobjeto"),
            defeito: campo("defeito"),
            idusuario: campo("idusuario"),
            placa: campo("placa"),
            localizacao: campo("localizacao"),
            previsao_data: campo("previsaodata"),
            previsao_hora: campo("previsaohora"),
            pertencentes: campo("pertencentes"),
            observacoes: campo("observacoes"),
            entrada: campo("entrada"),
            proprietario: campo("proprietario"),
            cond_pagto: campo("condpagto"),
            natureza: campo("natureza"),
            vendedor: campo("vendedor"),
            tecnico: campo("tecnico"),
            nome_cliente: campo("nomecliente"),
            email_cliente: campo("emailcliente"),
        }
    }
}

/// Valor do banco no formato esperado pelos inputs HTML
fn valor_para_input(valor: &SqlValue) -> Option<String> {
    match valor {
        SqlValue::Null => None,
        SqlValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        SqlValue::Time(t) => Some(t.format("%H:%M").to_string()),
        outro => {
            let texto = outro.exibir();
            if texto.is_empty() {
                None
            } else {
                Some(texto)
            }
        }
    }
}

/// Erros de formulário: por campo e gerais, no estilo do form original
#[derive(Debug, Clone, Default)]
pub struct ErrosFormulario {
    pub campos: Vec<(String, String)>,
    pub gerais: Vec<String>,
}

impl ErrosFormulario {
    pub fn vazio(&self) -> bool {
        self.campos.is_empty() && self.gerais.is_empty()
    }

    pub fn adicionar_campo(&mut self, campo: &str, mensagem: impl Into<String>) {
        self.campos.push((campo.to_string(), mensagem.into()));
    }

    pub fn adicionar_geral(&mut self, mensagem: impl Into<String>) {
        self.gerais.push(mensagem.into());
    }

    pub fn do_campo(&self, campo: &str) -> Option<&str> {
        self.campos
            .iter()
            .find(|(c, _)| c == campo)
            .map(|(_, m)| m.as_str())
    }

    pub fn de_validacao(erros: &ValidationErrors) -> Self {
        let mut resultado = Self::default();
        for (campo, lista) in erros.field_errors() {
            for erro in lista {
                let mensagem = erro
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Valor inválido ({})", erro.code));
                resultado.adicionar_campo(campo, mensagem);
            }
        }
        resultado
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_validacao_email_invalido() {
        let form = OrdemServicoForm {
            email_cliente: Some("nao-eh-email".to_string()),
            ..Default::default()
        };
        let erros = form.validate().unwrap_err();
        let convertidos = ErrosFormulario::de_validacao(&erros);
        assert!(convertidos.do_campo("email_cliente").is_some());
    }

    #[test]
    fn test_validacao_form_vazio_passa() {
        let form = OrdemServicoForm::default();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_de_registro_preenche_inputs() {
        let mut registro = Registro::new();
        registro.insert("defeito".to_string(), SqlValue::Text("tela quebrada".into()));
        registro.insert(
            "previsaodata".to_string(),
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()),
        );
        registro.insert("idusuario".to_string(), SqlValue::Int(7));
        registro.insert("observacoes".to_string(), SqlValue::Null);

        let form = OrdemServicoForm::de_registro(&registro);
        assert_eq!(form.defeito.as_deref(), Some("tela quebrada"));
        assert_eq!(form.previsao_data.as_deref(), Some("2024-03-05"));
        assert_eq!(form.idusuario.as_deref(), Some("7"));
        assert!(form.observacoes.is_none());
    }
}
