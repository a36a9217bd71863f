//! Server-side HTML for the monitoring page.

use crate::dashboard::{DashboardPage, TableView};
use crate::layout::ColumnKind;
use crate::status::StatusCategory;
use std::fmt::Write;

const TEMPLATE: &str = include_str!("./static/dashboard.html");

/// Escapes text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Fills the `{{SOURCE}}` and `{{CONTENT}}` markers of the page template.
fn page(source: &str, content: &str) -> String {
    let (head, rest) = TEMPLATE.split_once("{{SOURCE}}").unwrap_or((TEMPLATE, ""));
    let (middle, tail) = rest.split_once("{{CONTENT}}").unwrap_or((rest, ""));
    let mut out = String::with_capacity(TEMPLATE.len() + source.len() + content.len());
    out.push_str(head);
    out.push_str(&escape(source));
    out.push_str(middle);
    out.push_str(content);
    out.push_str(tail);
    out
}

/// Full page for a rendered dashboard.
pub fn render_page(page_data: &DashboardPage) -> String {
    let mut body = String::new();
    body.push_str("<h3>Monitoramento da execução do Planejamento Estratégico</h3>");

    let tally = &page_data.tally;
    if tally.is_empty() {
        body.push_str(
            "<p class=\"info\">Não encontrei ações com OKR_USED preenchido para montar o dashboard.</p>",
        );
    } else {
        body.push_str("<div class=\"metrics\">");
        let metrics = [
            ("Ações (total)", tally.total()),
            ("Pendente", tally.count_of(&StatusCategory::Pending)),
            ("Em andamento", tally.count_of(&StatusCategory::InProgress)),
            ("Concluída", tally.count_of(&StatusCategory::Completed)),
        ];
        for (label, value) in metrics {
            let _ = write!(body, "<div class=\"metric\">{}<b>{}</b></div>", label, value);
        }
        body.push_str("</div>");
        body.push_str("<h4>Ações por OKR e Status (barra empilhada)</h4>");
        body.push_str("<img src=\"/chart.svg\" alt=\"Ações por OKR e Status\">");
    }

    body.push_str(
        "<h3>Clique na linha desejada para fixar o filtro (clique novamente para remover)</h3>",
    );
    for view in &page_data.tables {
        body.push_str(&render_table(view));
    }
    body.push_str(
        "<p><small>Dica: clique novamente na linha selecionada (checkbox) para remover o filtro.</small></p>",
    );
    page(&page_data.source, &body)
}

/// One selectable table, or a notice when the filters left it empty.
pub fn render_table(view: &TableView) -> String {
    let mut out = format!("<section><h2>{}</h2>", escape(view.title));
    if view.is_empty() {
        out.push_str("<p class=\"info\">Nenhum registro após os filtros atuais.</p></section>");
        return out;
    }

    out.push_str("<table><thead><tr>");
    for column in &view.columns {
        let _ = write!(
            out,
            "<th style=\"width:{}\">{}</th>",
            column.width.css(),
            escape(&column.label)
        );
    }
    out.push_str("</tr></thead><tbody>");

    for (row, id) in view.table.iter().zip(&view.row_ids) {
        let selected = view.selected_id.as_deref() == Some(id.as_str());
        out.push_str(if selected { "<tr class=\"selected\">" } else { "<tr>" });
        for column in &view.columns {
            match column.kind {
                ColumnKind::Checkbox => {
                    let _ = write!(
                        out,
                        "<td><form method=\"post\" action=\"/select\">\
                         <input type=\"hidden\" name=\"entity\" value=\"{}\">\
                         <input type=\"hidden\" name=\"id\" value=\"{}\">\
                         <button type=\"submit\">{}</button></form></td>",
                        view.entity.layout_key(),
                        escape(id),
                        if selected { "☑" } else { "☐" }
                    );
                }
                ColumnKind::Text => {
                    let _ = write!(out, "<td>{}</td>", escape(row.get(&column.name)));
                }
            }
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table></section>");
    out
}

/// Blocking failure page: nothing but the message and the sidebar.
pub fn render_error(source: &str, message: &str) -> String {
    let content = format!(
        "<p class=\"error\">Não foi possível carregar a planilha: {}</p>",
        escape(message)
    );
    page(source, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ColumnConfig, ColumnWidth};
    use crate::selection::Entity;
    use crate::table::Table;

    fn view(selected: Option<&str>) -> TableView {
        TableView {
            entity: Entity::KeyResult,
            title: "KRs",
            columns: vec![
                ColumnConfig {
                    name: "_selected".into(),
                    label: "Selecionado".into(),
                    kind: ColumnKind::Checkbox,
                    width: ColumnWidth::Small,
                },
                ColumnConfig {
                    name: "KR_ID".into(),
                    label: "KR".into(),
                    kind: ColumnKind::Text,
                    width: ColumnWidth::Pixels(90),
                },
            ],
            table: Table::from_rows(
                vec!["_selected".into(), "KR_ID".into()],
                vec![vec!["false".into(), "K<1>".into()], vec!["true".into(), "K2".into()]],
            ),
            row_ids: vec!["K<1>".into(), "K2".into()],
            selected_id: selected.map(String::from),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn table_marks_selected_row_and_posts_toggles() {
        let html = render_table(&view(Some("K2")));
        assert!(html.contains("<th style=\"width:90px\">KR</th>"));
        assert!(html.contains("K&lt;1&gt;"));
        assert!(html.contains("name=\"entity\" value=\"krs\""));
        assert_eq!(html.matches("<tr class=\"selected\">").count(), 1);
        assert_eq!(html.matches('☑').count(), 1);
    }

    #[test]
    fn empty_table_renders_notice() {
        let mut v = view(None);
        v.table = v.table.empty_like();
        v.row_ids.clear();
        let html = render_table(&v);
        assert!(html.contains("Nenhum registro"));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn error_page_escapes_message() {
        let html = render_error("plan.xlsx", "sheet '<KRs>' not found");
        assert!(html.contains("sheet &#39;&lt;KRs&gt;&#39; not found"));
    }

    #[test]
    fn template_is_filled_once() {
        let html = render_error("{{CONTENT}} & co.xlsx", "boom");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Fonte: {{CONTENT}} &amp; co.xlsx"));
        assert_eq!(html.matches("boom").count(), 1);
        assert!(!html.contains("{{SOURCE}}"));
        assert!(html.contains("action=\"/selections/clear\""));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
