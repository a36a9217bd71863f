use okr_monitor::layout::SELECTED_COLUMN;
use okr_monitor::workbook::columns;
use okr_monitor::{
    Dashboard, Entity, LoadError, Selection, Settings, StatusCategory, load_workbook,
    load_workbook_bytes,
};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::Path;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn write_sheet(workbook: &mut Workbook, name: &str, rows: &[&[&str]]) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            match value.parse::<f64>() {
                Ok(number) => sheet.write_number(r as u32, c as u16, number)?,
                Err(_) => sheet.write_string(r as u32, c as u16, *value)?,
            };
        }
    }
    Ok(())
}

fn sample_workbook(with_actions: bool) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    write_sheet(
        &mut workbook,
        "OKRs",
        &[
            &["OKR_ID", "Eixo_CAPES", "Objetivo"],
            &[" O1 ", "Pesquisa", "Ampliar a produção"],
            &["O2", "Formação", "Qualificar egressos"],
        ],
    )?;
    write_sheet(
        &mut workbook,
        "KRs",
        &[
            &["KR_ID", "OKR_ID", "Resultado-chave", "Meta_2028", "Frequência"],
            &["K1", "O1", "Publicar mais", "40", "Anual"],
            &["K2", "O2", "Titular mais", "", "Anual"],
        ],
    )?;
    write_sheet(
        &mut workbook,
        "KPIs",
        &[
            &["KPI_ID", "KPI", "Unidade", "Frequência", "Fonte"],
            &["I1", "Artigos", "un", "Anual", "Lattes"],
            &["I2", "Titulados", "un", "Anual", "Sucupira"],
        ],
    )?;
    write_sheet(
        &mut workbook,
        "OKR_KPI",
        &[
            &["OKR_ID", "KR_ID", "KPI_ID"],
            &["O1", "K1", "I1"],
            &["O2", "K2", "I2"],
            &["O2", "K2", "I1"],
        ],
    )?;
    if with_actions {
        write_sheet(
            &mut workbook,
            "Ações_KR",
            &[
                &["ID", "EIXO", "O QUÊ?", "STATUS", "KR_ID_FINAL", "KR_ID_SUGERIDA", "OKR_ID_SUGERIDA"],
                &["A1", "Pesquisa", "Edital", "Em andamento", "", "K1", "O1"],
                &["A2", "Formação", "Bolsas", "Concluída", "K2", "K1", "O2"],
                &["A3", "Formação", "Eventos", "", "", "K2", ""],
            ],
        )?;
    }
    Ok(workbook)
}

fn save_sample(dir: &Path) -> Result<std::path::PathBuf, XlsxError> {
    let path = dir.join("plan.xlsx");
    sample_workbook(true)?.save(&path)?;
    Ok(path)
}

fn settings(dir: &Path, workbook: &Path) -> Settings {
    Settings {
        workbook_path: workbook.to_path_buf(),
        layout_path: dir.join("column_layout.json"),
        ..Settings::default()
    }
}

#[test]
fn loads_and_normalizes_all_sheets() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = save_sample(dir.path())?;
    let dataset = load_workbook(&path)?;

    assert_eq!(dataset.objectives.get(0, columns::OBJECTIVE_ID), "O1");
    assert_eq!(dataset.key_results.get(0, "Meta_2028"), "40");
    assert_eq!(
        dataset.actions.column_values(columns::KEY_RESULT_USED),
        vec!["K1", "K2", "K2"]
    );
    assert_eq!(
        dataset.actions.column_values(columns::OBJECTIVE_USED),
        vec!["O1", "O2", ""]
    );
    assert_eq!(
        dataset.indicators.column_values(columns::RELATED_OBJECTIVES),
        vec!["O1, O2", "O2"]
    );
    Ok(())
}

#[test]
fn loading_is_repeatable() -> TestResult {
    let bytes = sample_workbook(true)?.save_to_buffer()?;
    assert_eq!(load_workbook_bytes(&bytes)?, load_workbook_bytes(&bytes)?);
    Ok(())
}

#[test]
fn missing_sheet_blocks_loading() -> TestResult {
    let bytes = sample_workbook(false)?.save_to_buffer()?;
    let err = load_workbook_bytes(&bytes).unwrap_err();
    assert!(matches!(err, LoadError::MissingSheet { ref sheet } if sheet == "Ações_KR"));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_workbook("/nonexistent/plan.xlsx").unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn dashboard_drills_down_and_toggles() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = save_sample(dir.path())?;
    let mut dashboard = Dashboard::new(settings(dir.path(), &path));

    let page = dashboard.render()?;
    assert_eq!(page.selection, Selection::None);
    let okrs = page.table(Entity::Objective).unwrap();
    assert_eq!(
        okrs.table.columns(),
        &[SELECTED_COLUMN, "OKR_ID", "Eixo_CAPES", "Objetivo_OKR"]
    );
    assert_eq!(okrs.columns[0].label, "Selecionado");
    assert_eq!(okrs.columns[1].label, "OKR");
    assert_eq!(page.tally.total(), 2);
    assert_eq!(page.tally.count_of(&StatusCategory::InProgress), 1);
    assert_eq!(page.tally.count_of(&StatusCategory::Completed), 1);

    dashboard.toggle(Entity::KeyResult, "K2");
    let page = dashboard.render()?;
    assert_eq!(page.selection, Selection::KeyResult("K2".into()));
    let objectives = page.table(Entity::Objective).unwrap();
    assert_eq!(objectives.row_ids, vec!["O2"]);
    let krs = page.table(Entity::KeyResult).unwrap();
    assert_eq!(krs.table.get(0, SELECTED_COLUMN), "true");
    assert_eq!(page.table(Entity::Action).unwrap().row_ids, vec!["A2", "A3"]);
    assert_eq!(page.table(Entity::Indicator).unwrap().row_ids, vec!["I1", "I2"]);

    dashboard.toggle(Entity::Indicator, "I2");
    let page = dashboard.render()?;
    assert_eq!(dashboard.selection().get(Entity::KeyResult), None);
    assert_eq!(page.table(Entity::KeyResult).unwrap().row_ids, vec!["K2"]);

    dashboard.toggle(Entity::Indicator, "I2");
    let page = dashboard.render()?;
    assert_eq!(page.selection, Selection::None);
    assert_eq!(page.table(Entity::Action).unwrap().row_ids.len(), 3);

    assert_eq!(dashboard.cache().len(), 1);
    Ok(())
}

#[test]
fn dangling_selection_renders_empty_tables() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = save_sample(dir.path())?;
    let mut dashboard = Dashboard::new(settings(dir.path(), &path));

    dashboard.toggle(Entity::Objective, "O9");
    let page = dashboard.render()?;
    for entity in Entity::ALL {
        assert!(page.table(entity).unwrap().is_empty(), "{:?} should be empty", entity);
    }

    dashboard.clear_selections();
    dashboard.toggle(Entity::Objective, "");
    let page = dashboard.render()?;
    assert_eq!(page.selection, Selection::None);
    assert_eq!(page.table(Entity::Action).unwrap().row_ids.len(), 3);
    assert_eq!(page.table(Entity::KeyResult).unwrap().row_ids.len(), 2);

    dashboard.clear_selections();
    dashboard.toggle(Entity::Action, "A9");
    let page = dashboard.render()?;
    assert_eq!(page.table(Entity::Action).unwrap().row_ids.len(), 3);
    Ok(())
}

#[test]
fn reload_re_reads_layout_and_clears_cache() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = save_sample(dir.path())?;
    let mut dashboard = Dashboard::new(settings(dir.path(), &path));
    dashboard.render()?;
    assert_eq!(dashboard.cache().len(), 1);

    std::fs::write(
        dir.path().join("column_layout.json"),
        r#"{"krs": {"order": ["KR_ID", "Meta_2028"], "width": {"Meta_2028": "60px"}, "labels": {"Meta_2028": "Meta"}}}"#,
    )?;
    dashboard.reload_layout();
    assert!(dashboard.cache().is_empty());

    let page = dashboard.render()?;
    let krs = page.table(Entity::KeyResult).unwrap();
    assert_eq!(krs.table.columns(), &["KR_ID", "Meta_2028"]);
    assert_eq!(krs.columns[1].label, "Meta");
    assert_eq!(krs.columns[1].width.css(), "60px");
    // Tables the file leaves out show every column.
    let okrs = page.table(Entity::Objective).unwrap();
    assert_eq!(okrs.table.columns().len(), 4);
    Ok(())
}

#[test]
fn upload_replaces_the_default_workbook() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut dashboard = Dashboard::new(settings(dir.path(), &dir.path().join("missing.xlsx")));
    assert!(matches!(dashboard.render(), Err(LoadError::Io { .. })));

    let bytes = sample_workbook(true)?.save_to_buffer()?;
    dashboard.use_upload("upload.xlsx", bytes);
    let page = dashboard.render()?;
    assert_eq!(page.source, "upload.xlsx");
    assert_eq!(page.table(Entity::Objective).unwrap().row_ids, vec!["O1", "O2"]);

    dashboard.use_default_workbook();
    assert!(dashboard.render().is_err());
    assert!(dashboard.cache().is_empty());
    Ok(())
}

#[test]
fn re_uploading_keeps_one_cached_dataset() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut dashboard = Dashboard::new(settings(dir.path(), &dir.path().join("missing.xlsx")));

    let first = sample_workbook(true)?.save_to_buffer()?;
    dashboard.use_upload("first.xlsx", first.clone());
    dashboard.render()?;
    assert_eq!(dashboard.cache().len(), 1);

    let mut revised = sample_workbook(true)?;
    write_sheet(&mut revised, "Notas", &[&["Nota"], &["revisado"]])?;
    dashboard.use_upload("second.xlsx", revised.save_to_buffer()?);
    dashboard.render()?;
    assert_eq!(dashboard.cache().len(), 1);
    assert!(dashboard.cache().loaded_at(&first).is_none());

    dashboard.use_upload("second-again.xlsx", revised.save_to_buffer()?);
    dashboard.render()?;
    assert_eq!(dashboard.cache().len(), 1);
    Ok(())
}
