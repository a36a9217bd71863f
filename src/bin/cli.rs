#![cfg(not(tarpaulin_include))]

use okr_monitor::dashboard::{Dashboard, DashboardPage, TableView};
use okr_monitor::{Entity, Settings, StatusCategory};
use std::env;
use std::io::{self, Write};
use std::time::Instant;

const MAX_CELL_WIDTH: usize = 40;

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        format!("{}…", cut)
    }
}

fn print_table(view: &TableView) {
    println!("\n== {} ==", view.title);
    if view.is_empty() {
        println!("Nenhum registro após os filtros atuais.");
        return;
    }

    let headers: Vec<String> = view.columns.iter().map(|c| truncate(&c.label)).collect();
    let rows: Vec<Vec<String>> = view
        .table
        .iter()
        .map(|row| {
            view.columns
                .iter()
                .map(|c| match row.get(&c.name) {
                    "true" if c.name == "_selected" => "[x]".to_string(),
                    "false" if c.name == "_selected" => "[ ]".to_string(),
                    v => truncate(v),
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };
    println!("{}", line(&headers[..]));
    println!("{}", widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
    for row in &rows {
        println!("{}", line(&row[..]));
    }
}

fn print_page(page: &DashboardPage) {
    println!("\nFonte: {}", page.source);
    let tally = &page.tally;
    if tally.is_empty() {
        println!("Não encontrei ações com OKR_USED preenchido para montar o dashboard.");
    } else {
        println!(
            "Ações (total): {}  Pendente: {}  Em andamento: {}  Concluída: {}",
            tally.total(),
            tally.count_of(&StatusCategory::Pending),
            tally.count_of(&StatusCategory::InProgress),
            tally.count_of(&StatusCategory::Completed)
        );
        for count in &tally.counts {
            println!("  {:<10} {:<16} {}", count.objective, count.category, count.count);
        }
    }
    for view in &page.tables {
        print_table(view);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let mut dashboard = Dashboard::new(Settings::from_args(&args));

    let mut start_time = Instant::now();
    let mut status = String::from("ok");
    let mut show = true;
    loop {
        if show {
            match dashboard.render() {
                Ok(page) => print_page(&page),
                Err(e) => println!("Erro ao carregar a planilha: {}", e),
            }
        }

        print!("[{:.1}] ({}) > ", start_time.elapsed().as_secs_f64(), status);
        io::stdout().flush()?;

        let mut command = String::new();
        if io::stdin().read_line(&mut command)? == 0 {
            break;
        }
        let command = command.trim();
        start_time = Instant::now();
        show = true;

        let mut parts = command.splitn(3, ' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("q"), _, _) => break,
            (Some("help"), _, _) => {
                println!("Commands:");
                println!("  q: Quit");
                println!("  select <okr|kr|acao|kpi> <id>: Pin a row (again to unpin)");
                println!("  clear: Clear all selections");
                println!("  reload: Clear the workbook cache and re-read the layout");
                println!("  load <path>: Use another workbook");
                println!("  default: Go back to the default workbook");
                show = false;
                status = String::from("ok");
            }
            (Some("select"), Some(entity), Some(id)) => match Entity::parse(entity) {
                Some(entity) => {
                    dashboard.toggle(entity, id.trim());
                    status = String::from("ok");
                }
                None => {
                    status = String::from("unknown table");
                    show = false;
                }
            },
            (Some("clear"), None, _) => {
                dashboard.clear_selections();
                status = String::from("ok");
            }
            (Some("reload"), None, _) => {
                dashboard.reload_layout();
                status = String::from("ok");
            }
            (Some("load"), Some(path), rest) => {
                let path = match rest {
                    Some(rest) => format!("{} {}", path, rest),
                    None => path.to_string(),
                };
                dashboard.use_file(path);
                status = String::from("ok");
            }
            (Some("default"), None, _) => {
                dashboard.use_default_workbook();
                status = String::from("ok");
            }
            _ => {
                status = String::from("invalid command");
                show = false;
            }
        }
    }

    Ok(())
}
