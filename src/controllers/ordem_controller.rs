//! Controller do fluxo de ordem de serviço
//!
//! Orquestra validação do formulário, o mapeamento manual dos campos para
//! as colunas maiúsculas do banco e as chamadas ao repositório.

use validator::Validate;

use crate::config::LegacyDbConfig;
use crate::database::record::{Registro, SqlValue};
use crate::dto::ordem_dto::{ErrosFormulario, OrdemServicoForm};
use crate::repositories::ordem_repository::{OrdemRepository, SITUACAO_REGISTRADA};
use crate::utils::errors::AppError;
use crate::utils::validation::{validar_data, validar_decimal, validar_hora, validar_placa};

pub struct OrdemController {
    repository: OrdemRepository,
}

impl OrdemController {
    pub fn new(config: LegacyDbConfig) -> Self {
        Self {
            repository: OrdemRepository::new(config),
        }
    }

    /// Abre uma OS nova: valida, monta o registro e insere. Erros de banco
    /// voltam como erro geral do formulário, como no fluxo original.
    pub async fn abrir(&self, form: &OrdemServicoForm) -> Result<i64, ErrosFormulario> {
        let registro = montar_registro(form)?;
        match self.repository.inserir(registro).await {
            Ok(id) => Ok(id),
            Err(erro) => {
                let mut erros = ErrosFormulario::default();
                erros.adicionar_geral(format!("Erro ao salvar no banco: {}", erro));
                Err(erros)
            }
        }
    }

    pub async fn listar(&self) -> Result<Vec<Registro>, AppError> {
        self.repository.listar().await
    }

    pub async fn obter(&self, id: i64) -> Result<Option<Registro>, AppError> {
        self.repository.obter(id).await
    }

    /// Edita uma OS existente com sobrescrita campo a campo.
    ///
    /// Zero linhas afetadas não derruba a requisição: vira mensagem de erro
    /// visível no formulário.
    pub async fn editar(&self, id: i64, form: &OrdemServicoForm) -> Result<(), ErrosFormulario> {
        let mudancas = montar_mudancas(form)?;
        match self.repository.atualizar(id, mudancas).await {
            Ok(0) => {
                let mut erros = ErrosFormulario::default();
                erros.adicionar_geral("Nenhuma linha foi atualizada.");
                Err(erros)
            }
            Ok(_) => Ok(()),
            Err(AppError::BadRequest(mensagem)) => {
                let mut erros = ErrosFormulario::default();
                erros.adicionar_geral(mensagem);
                Err(erros)
            }
            Err(erro) => {
                let mut erros = ErrosFormulario::default();
                erros.adicionar_geral(format!("Erro ao atualizar: {}", erro));
                Err(erros)
            }
        }
    }

    /// Cancelamento lógico; retorna as linhas afetadas (zero na segunda vez)
    pub async fn cancelar(&self, id: i64) -> Result<u64, AppError> {
        self.repository.cancelar(id).await
    }
}

/// Mapeamento manual do formulário para as colunas do banco, usado na
/// abertura de OS. Colunas que não existirem na tabela são descartadas
/// adiante pela interseção com o catálogo.
pub fn montar_registro(form: &OrdemServicoForm) -> Result<Registro, ErrosFormulario> {
    let mut erros = match form.validate() {
        Ok(()) => ErrosFormulario::default(),
        Err(e) => ErrosFormulario::de_validacao(&e),
    };

    let mut registro = montar_campos_tipados(form, &mut erros);
    for (coluna, valor) in campos_texto(form) {
        if let Some(v) = valor {
            registro.insert(coluna.to_string(), SqlValue::Text(v.clone()));
        }
    }

    // defaults do fluxo de abertura
    registro.insert(
        "DESCRICAOOBJETO".to_string(),
        SqlValue::Text(form.descricaoobjeto.clone().unwrap_or_default()),
    );
    registro.insert(
        "DEFEITO".to_string(),
        SqlValue::Text(form.defeito.clone().unwrap_or_default()),
    );
    registro.insert(
        "SITUACAO".to_string(),
        SqlValue::Text(SITUACAO_REGISTRADA.to_string()),
    );
    if !registro.contains_key("IDUSUARIO") {
        registro.insert("IDUSUARIO".to_string(), SqlValue::Int(1));
    }
    registro.insert(
        "ABERTURADATA".to_string(),
        SqlValue::Timestamp(chrono::Local::now().naive_local()),
    );

    if erros.vazio() {
        Ok(registro)
    } else {
        Err(erros)
    }
}

/// Mapeamento usado na edição: sobrescrita campo a campo.
///
/// O formulário de edição sempre envia todos os campos de texto; um campo
/// apagado pelo usuário vira string vazia no SET e sobrescreve o valor
/// antigo. Campos tipados (data, hora, valores, ids) só entram quando
/// preenchidos.
pub fn montar_mudancas(form: &OrdemServicoForm) -> Result<Registro, ErrosFormulario> {
    let mut erros = match form.validate() {
        Ok(()) => ErrosFormulario::default(),
        Err(e) => ErrosFormulario::de_validacao(&e),
    };

    let mut mudancas = montar_campos_tipados(form, &mut erros);
    for (coluna, valor) in campos_texto(form) {
        mudancas.insert(
            coluna.to_string(),
            SqlValue::Text(valor.clone().unwrap_or_default()),
        );
    }
    mudancas.insert(
        "DESCRICAOOBJETO".to_string(),
        SqlValue::Text(form.descricaoobjeto.clone().unwrap_or_default()),
    );
    mudancas.insert(
        "DEFEITO".to_string(),
        SqlValue::Text(form.defeito.clone().unwrap_or_default()),
    );
    // placa apagada também sobrescreve com vazio
    if form.placa.is_none() {
        mudancas.insert("PLACA".to_string(), SqlValue::Text(String::new()));
    }

    if erros.vazio() {
        Ok(mudancas)
    } else {
        Err(erros)
    }
}

/// Campos de texto livre e a coluna correspondente no banco
fn campos_texto(form: &OrdemServicoForm) -> Vec<(&'static str, &Option<String>)> {
    vec![
        ("TIPOOBJETO", &form.tipo_objeto),
        ("MARCA", &form.marca),
        ("MODELO", &form.modelo),
        ("LOCALIZACAO", &form.localizacao),
        ("PERTENCENTES", &form.pertencentes),
        ("OBSERVACOES", &form.observacoes),
        ("PROPRIETARIO", &form.proprietario),
        ("CONDPAGTO", &form.cond_pagto),
        ("NATUREZA", &form.natureza),
        ("VENDEDOR", &form.vendedor),
        ("TECNICO", &form.tecnico),
        ("NOMECLIENTE", &form.nome_cliente),
        ("EMAILCLIENTE", &form.email_cliente),
    ]
}

fn montar_campos_tipados(form: &OrdemServicoForm, erros: &mut ErrosFormulario) -> Registro {
    let mut registro = Registro::new();

    if let Some(placa) = &form.placa {
        match validar_placa(placa) {
            Ok(()) => {
                registro.insert(
                    "PLACA".to_string(),
                    SqlValue::Text(placa.trim().to_uppercase()),
                );
            }
            Err(_) => erros.adicionar_campo("placa", "Placa inválida"),
        }
    }

    if let Some(data) = &form.previsao_data {
        match validar_data(data) {
            Ok(d) => {
                registro.insert("PREVISAODATA".to_string(), SqlValue::Date(d));
            }
            Err(_) => erros.adicionar_campo("previsao_data", "Data inválida (use AAAA-MM-DD)"),
        }
    }

    if let Some(hora) = &form.previsao_hora {
        match validar_hora(hora) {
            Ok(h) => {
                registro.insert("PREVISAOHORA".to_string(), SqlValue::Time(h));
            }
            Err(_) => erros.adicionar_campo("previsao_hora", "Hora inválida (use HH:MM)"),
        }
    }

    if let Some(entrada) = &form.entrada {
        match validar_decimal(entrada) {
            Ok(valor) => {
                registro.insert("ENTRADA".to_string(), SqlValue::Decimal(valor));
            }
            Err(_) => erros.adicionar_campo("entrada", "Valor de entrada inválido"),
        }
    }

    if let Some(idusuario) = &form.idusuario {
        match idusuario.parse::<i64>() {
            Ok(id) => {
                registro.insert("IDUSUARIO".to_string(), SqlValue::Int(id));
            }
            Err(_) => erros.adicionar_campo("idusuario", "Usuário inválido"),
        }
    }

    if let Some(idobjeto) = &form.idobjeto {
        match idobjeto.parse::<i64>() {
            Ok(id) => {
                registro.insert("IDOBJETO".to_string(), SqlValue::Int(id));
            }
            Err(_) => erros.adicionar_campo("idobjeto", "Objeto inválido"),
        }
    }

    registro
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_montar_registro_defaults() {
        let form = OrdemServicoForm {
            defeito: Some("tela quebrada".to_string()),
            nome_cliente: Some("Maria".to_string()),
            ..Default::default()
        };
        let registro = montar_registro(&form).unwrap();

        assert_eq!(
            registro["DEFEITO"],
            SqlValue::Text("tela quebrada".to_string())
        );
        assert_eq!(
            registro["SITUACAO"],
            SqlValue::Text("REGISTRADA".to_string())
        );
        assert_eq!(registro["DESCRICAOOBJETO"], SqlValue::Text(String::new()));
        assert_eq!(registro["IDUSUARIO"], SqlValue::Int(1));
        assert_eq!(registro["NOMECLIENTE"], SqlValue::Text("Maria".to_string()));
        // a empresa é imposta pela camada de operações, não pelo formulário
        assert!(!registro.contains_key("EMPRESA"));
        assert!(registro.contains_key("ABERTURADATA"));
    }

    #[test]
    fn test_montar_registro_converte_tipos() {
        let form = OrdemServicoForm {
            previsao_data: Some("2024-03-05".to_string()),
            previsao_hora: Some("14:30".to_string()),
            entrada: Some("150,50".to_string()),
            placa: Some("abc1d23".to_string()),
            idusuario: Some("7".to_string()),
            ..Default::default()
        };
        let registro = montar_registro(&form).unwrap();

        assert!(matches!(registro["PREVISAODATA"], SqlValue::Date(_)));
        assert!(matches!(registro["PREVISAOHORA"], SqlValue::Time(_)));
        assert!(matches!(registro["ENTRADA"], SqlValue::Decimal(_)));
        assert_eq!(registro["PLACA"], SqlValue::Text("ABC1D23".to_string()));
        assert_eq!(registro["IDUSUARIO"], SqlValue::Int(7));
    }

    #[test]
    fn test_montar_registro_acumula_erros_de_campo() {
        let form = OrdemServicoForm {
            previsao_data: Some("05/03/2024".to_string()),
            entrada: Some("abc".to_string()),
            placa: Some("ZZZ".to_string()),
            ..Default::default()
        };
        let erros = montar_registro(&form).unwrap_err();
        assert!(erros.do_campo("previsao_data").is_some());
        assert!(erros.do_campo("entrada").is_some());
        assert!(erros.do_campo("placa").is_some());
    }

    #[test]
    fn test_montar_mudancas_sem_situacao() {
        let form = OrdemServicoForm {
            defeito: Some("não liga".to_string()),
            ..Default::default()
        };
        let mudancas = montar_mudancas(&form).unwrap();
        assert_eq!(mudancas["DEFEITO"], SqlValue::Text("não liga".to_string()));
        // edição não mexe na situação nem na data de abertura
        assert!(!mudancas.contains_key("SITUACAO"));
        assert!(!mudancas.contains_key("ABERTURADATA"));
    }

    #[test]
    fn test_montar_mudancas_sobrescreve_campo_apagado() {
        let form = OrdemServicoForm {
            defeito: Some("novo defeito".to_string()),
            observacoes: None,
            ..Default::default()
        };
        let mudancas = montar_mudancas(&form).unwrap();

        assert_eq!(
            mudancas["DEFEITO"],
            SqlValue::Text("novo defeito".to_string())
        );
        // campo de texto apagado entra no SET como vazio, não fica de fora
        assert_eq!(mudancas["OBSERVACOES"], SqlValue::Text(String::new()));
        assert_eq!(mudancas["PLACA"], SqlValue::Text(String::new()));
    }

    #[test]
    fn test_montar_mudancas_nao_inventa_campos_tipados() {
        let mudancas = montar_mudancas(&OrdemServicoForm::default()).unwrap();
        // tipados ausentes ficam de fora; textos viram vazio
        assert!(!mudancas.contains_key("PREVISAODATA"));
        assert!(!mudancas.contains_key("ENTRADA"));
        assert!(!mudancas.contains_key("IDUSUARIO"));
        assert_eq!(mudancas["NOMECLIENTE"], SqlValue::Text(String::new()));
    }
}
