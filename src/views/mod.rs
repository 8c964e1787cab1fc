//! Páginas HTML do painel de ordens de serviço
//!
//! Este módulo monta as páginas do fluxo (abrir, listar, editar, cancelar,
//! sucesso) direto em strings, sem engine de template. O formulário é
//! re-renderizado com os erros de campo quando a validação falha.

use axum::response::Html;

use crate::database::record::Registro;
use crate::dto::ordem_dto::{ErrosFormulario, OrdemServicoForm};

/// Escapa texto para interpolação segura em HTML
pub fn escapar_html(texto: &str) -> String {
    texto
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn layout(titulo: &str, corpo: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-br">
<head>
<meta charset="utf-8">
<title>{titulo} - Ordens de Serviço</title>
<style>
body {{ font-family: sans-serif; margin: 2rem auto; max-width: 60rem; color: #222; }}
label {{ display: block; margin-top: .6rem; font-weight: bold; }}
input, textarea {{ width: 100%; padding: .3rem; box-sizing: border-box; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #ccc; padding: .4rem .6rem; text-align: left; }}
.erro {{ color: #b00020; margin: .2rem 0; }}
.acoes a {{ margin-right: .6rem; }}
nav a {{ margin-right: 1rem; }}
button {{ margin-top: 1rem; padding: .4rem 1.2rem; }}
</style>
</head>
<body>
<nav><a href="/os">Painel de OS</a><a href="/os/abrir">Abrir OS</a></nav>
<h1>{titulo}</h1>
{corpo}
</body>
</html>"#,
        titulo = escapar_html(titulo),
        corpo = corpo
    )
}

fn erros_gerais(erros: &ErrosFormulario) -> String {
    erros
        .gerais
        .iter()
        .map(|mensagem| format!("<p class=\"erro\">{}</p>", escapar_html(mensagem)))
        .collect()
}

fn campo(
    rotulo: &str,
    nome: &str,
    tipo: &str,
    valor: &Option<String>,
    erros: &ErrosFormulario,
) -> String {
    let erro = erros
        .do_campo(nome)
        .map(|m| format!("<p class=\"erro\">{}</p>", escapar_html(m)))
        .unwrap_or_default();
    format!(
        r#"<label for="id_{nome}">{rotulo}</label>
<input type="{tipo}" id="id_{nome}" name="{nome}" value="{valor}">{erro}"#,
        nome = nome,
        rotulo = escapar_html(rotulo),
        tipo = tipo,
        valor = escapar_html(valor.as_deref().unwrap_or("")),
        erro = erro
    )
}

fn campo_textarea(
    rotulo: &str,
    nome: &str,
    linhas: u8,
    valor: &Option<String>,
    erros: &ErrosFormulario,
) -> String {
    let erro = erros
        .do_campo(nome)
        .map(|m| format!("<p class=\"erro\">{}</p>", escapar_html(m)))
        .unwrap_or_default();
    format!(
        r#"<label for="id_{nome}">{rotulo}</label>
<textarea id="id_{nome}" name="{nome}" rows="{linhas}">{valor}</textarea>{erro}"#,
        nome = nome,
        rotulo = escapar_html(rotulo),
        linhas = linhas,
        valor = escapar_html(valor.as_deref().unwrap_or("")),
        erro = erro
    )
}

fn formulario_os(
    form: &OrdemServicoForm,
    erros: &ErrosFormulario,
    acao: &str,
    botao: &str,
) -> String {
    let mut corpo = String::new();
    corpo.push_str(&erros_gerais(erros));
    corpo.push_str(&format!("<form method=\"post\" action=\"{}\">\n", acao));
    corpo.push_str(&format!(
        "<input type=\"hidden\" id=\"id_idobjeto\" name=\"idobjeto\" value=\"{}\">\n",
        escapar_html(form.idobjeto.as_deref().unwrap_or(""))
    ));
    corpo.push_str(&campo("Nome / Cliente", "nome_cliente", "text", &form.nome_cliente, erros));
    corpo.push_str(&campo("Email do cliente", "email_cliente", "email", &form.email_cliente, erros));
    corpo.push_str(&campo("Tipo", "tipo_objeto", "text", &form.tipo_objeto, erros));
    corpo.push_str(&campo("Marca", "marca", "text", &form.marca, erros));
    corpo.push_str(&campo("Modelo", "modelo", "text", &form.modelo, erros));
    corpo.push_str(&campo("Placa", "placa", "text", &form.placa, erros));
    corpo.push_str(&campo("Descrição do objeto", "descricaoobjeto", "text", &form.descricaoobjeto, erros));
    corpo.push_str(&campo_textarea("Defeito", "defeito", 4, &form.defeito, erros));
    corpo.push_str(&campo("Localização", "localizacao", "text", &form.localizacao, erros));
    corpo.push_str(&campo("Previsão (data)", "previsao_data", "date", &form.previsao_data, erros));
    corpo.push_str(&campo("Previsão (hora)", "previsao_hora", "time", &form.previsao_hora, erros));
    corpo.push_str(&campo_textarea("Pertences", "pertencentes", 2, &form.pertencentes, erros));
    corpo.push_str(&campo_textarea("Observações", "observacoes", 2, &form.observacoes, erros));
    corpo.push_str(&campo("Entrada (R$)", "entrada", "text", &form.entrada, erros));
    corpo.push_str(&campo("Proprietário", "proprietario", "text", &form.proprietario, erros));
    corpo.push_str(&campo("Condição Pagto", "cond_pagto", "text", &form.cond_pagto, erros));
    corpo.push_str(&campo("Natureza", "natureza", "text", &form.natureza, erros));
    corpo.push_str(&campo("Vendedor", "vendedor", "text", &form.vendedor, erros));
    corpo.push_str(&campo("Técnico", "tecnico", "text", &form.tecnico, erros));
    corpo.push_str(&campo("Usuário", "idusuario", "number", &form.idusuario, erros));
    corpo.push_str(&format!("<button type=\"submit\">{}</button>\n</form>", escapar_html(botao)));
    corpo
}

fn valor_do_registro(registro: &Registro, chave: &str) -> String {
    registro
        .get(chave)
        .map(|v| escapar_html(&v.exibir()))
        .unwrap_or_default()
}

pub fn pagina_abrir_os(form: &OrdemServicoForm, erros: &ErrosFormulario) -> Html<String> {
    Html(layout(
        "Abrir Ordem de Serviço",
        &formulario_os(form, erros, "/os/abrir", "Abrir OS"),
    ))
}

pub fn pagina_editar_os(
    pk: i64,
    form: &OrdemServicoForm,
    erros: &ErrosFormulario,
) -> Html<String> {
    Html(layout(
        &format!("Editar OS #{}", pk),
        &formulario_os(form, erros, &format!("/os/editar/{}", pk), "Salvar"),
    ))
}

pub fn pagina_sucesso(pk: i64, registro: &Registro) -> Html<String> {
    let corpo = format!(
        r#"<p>Ordem de serviço registrada com sucesso.</p>
<table>
<tr><th>Número</th><td>{pk}</td></tr>
<tr><th>Situação</th><td>{situacao}</td></tr>
<tr><th>Cliente</th><td>{cliente}</td></tr>
<tr><th>Objeto</th><td>{objeto}</td></tr>
<tr><th>Defeito</th><td>{defeito}</td></tr>
<tr><th>Abertura</th><td>{abertura}</td></tr>
</table>
<p><a href="/os">Voltar ao painel</a></p>"#,
        pk = pk,
        situacao = valor_do_registro(registro, "situacao"),
        cliente = valor_do_registro(registro, "nomecliente"),
        objeto = valor_do_registro(registro, "descricaoobjeto"),
        defeito = valor_do_registro(registro, "defeito"),
        abertura = valor_do_registro(registro, "aberturadata"),
    );
    Html(layout(&format!("OS #{} registrada", pk), &corpo))
}

pub fn pagina_listar(ordens: &[Registro]) -> Html<String> {
    let mut linhas = String::new();
    for ordem in ordens {
        let id = ordem
            .get("idordem")
            .and_then(|v| v.como_i64())
            .unwrap_or_default();
        linhas.push_str(&format!(
            r#"<tr><td>{id}</td><td>{abertura}</td><td>{cliente}</td><td>{objeto}</td><td>{situacao}</td>
<td class="acoes"><a href="/os/editar/{id}">editar</a><a href="/os/cancelar/{id}">cancelar</a></td></tr>
"#,
            id = id,
            abertura = valor_do_registro(ordem, "aberturadata"),
            cliente = valor_do_registro(ordem, "nomecliente"),
            objeto = valor_do_registro(ordem, "descricaoobjeto"),
            situacao = valor_do_registro(ordem, "situacao"),
        ));
    }
    let corpo = format!(
        r#"<table>
<tr><th>Nº</th><th>Abertura</th><th>Cliente</th><th>Objeto</th><th>Situação</th><th>Ações</th></tr>
{}
</table>"#,
        linhas
    );
    Html(layout("Painel de Ordens de Serviço", &corpo))
}

pub fn pagina_confirmar_cancelamento(
    pk: i64,
    registro: &Registro,
    erro: Option<&str>,
) -> Html<String> {
    let aviso = erro
        .map(|m| format!("<p class=\"erro\">{}</p>", escapar_html(m)))
        .unwrap_or_default();
    let corpo = format!(
        r#"{aviso}<p>Confirma o cancelamento da OS #{pk} ({cliente} - {objeto})?</p>
<form method="post" action="/os/cancelar/{pk}">
<button type="submit">Cancelar OS</button>
</form>
<p><a href="/os">Voltar sem cancelar</a></p>"#,
        aviso = aviso,
        pk = pk,
        cliente = valor_do_registro(registro, "nomecliente"),
        objeto = valor_do_registro(registro, "descricaoobjeto"),
    );
    Html(layout(&format!("Cancelar OS #{}", pk), &corpo))
}

pub fn pagina_nao_encontrada(mensagem: &str) -> Html<String> {
    Html(layout(
        "Não encontrado",
        &format!("<p class=\"erro\">{}</p>", escapar_html(mensagem)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::record::SqlValue;

    #[test]
    fn test_escapar_html() {
        assert_eq!(
            escapar_html(r#"<b onclick="x('1')">&"#),
            "&lt;b onclick=&quot;x(&#39;1&#39;)&quot;&gt;&amp;"
        );
    }

    #[test]
    fn test_formulario_re_renderiza_valores_e_erros() {
        let form = OrdemServicoForm {
            defeito: Some("não liga".to_string()),
            ..Default::default()
        };
        let mut erros = ErrosFormulario::default();
        erros.adicionar_campo("entrada", "Valor de entrada inválido");
        erros.adicionar_geral("Erro ao salvar no banco: timeout");

        let Html(pagina) = pagina_abrir_os(&form, &erros);
        assert!(pagina.contains("não liga"));
        assert!(pagina.contains("Valor de entrada inválido"));
        assert!(pagina.contains("Erro ao salvar no banco: timeout"));
    }

    #[test]
    fn test_pagina_listar_escapa_conteudo() {
        let mut ordem = Registro::new();
        ordem.insert("idordem".to_string(), SqlValue::Int(3));
        ordem.insert(
            "nomecliente".to_string(),
            SqlValue::Text("<script>alert(1)</script>".to_string()),
        );
        let Html(pagina) = pagina_listar(&[ordem]);
        assert!(!pagina.contains("<script>alert"));
        assert!(pagina.contains("&lt;script&gt;"));
        assert!(pagina.contains("/os/editar/3"));
    }

    #[test]
    fn test_pagina_sucesso_mostra_defeito() {
        let mut registro = Registro::new();
        registro.insert("defeito".to_string(), SqlValue::Text("tela quebrada".into()));
        registro.insert("situacao".to_string(), SqlValue::Text("REGISTRADA".into()));
        let Html(pagina) = pagina_sucesso(10, &registro);
        assert!(pagina.contains("tela quebrada"));
        assert!(pagina.contains("REGISTRADA"));
    }
}
