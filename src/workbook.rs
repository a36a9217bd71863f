//! Workbook loading.
//!
//! Reads the five monitoring sheets into [`Table`]s, normalizes every id-like
//! column to a trimmed string and derives the columns the filter relies on:
//! the key result and objective each action counts towards, and the list of
//! objectives each indicator is linked to.

use crate::error::LoadError;
use crate::table::Table;
use calamine::{Data, Range, Reader, Xlsx};
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;
use std::path::Path;

pub const SHEET_OBJECTIVES: &str = "OKRs";
pub const SHEET_KEY_RESULTS: &str = "KRs";
pub const SHEET_INDICATORS: &str = "KPIs";
pub const SHEET_LINKS: &str = "OKR_KPI";
pub const SHEET_ACTIONS: &str = "Ações_KR";

/// Column names as they appear in the workbook.
pub mod columns {
    pub const OBJECTIVE_ID: &str = "OKR_ID";
    pub const KEY_RESULT_ID: &str = "KR_ID";
    pub const INDICATOR_ID: &str = "KPI_ID";
    pub const ACTION_ID: &str = "ID";

    pub const AXIS: &str = "Eixo_CAPES";
    pub const OBJECTIVE_TEXT: &str = "Objetivo_OKR";

    pub const KEY_RESULT_USED: &str = "KR_ID_USADA";
    pub const KEY_RESULT_FINAL: &str = "KR_ID_FINAL";
    pub const KEY_RESULT_SUGGESTED: &str = "KR_ID_SUGERIDA";
    pub const OBJECTIVE_USED: &str = "OKR_USED";
    pub const OBJECTIVE_SUGGESTED: &str = "OKR_ID_SUGERIDA";
    pub const STATUS: &str = "STATUS";

    pub const RELATED_OBJECTIVES: &str = "OKRs_relacionadas";
}

use columns::*;

/// The five normalized tables of one workbook.
///
/// A dataset is an immutable snapshot: filtering reads from it and produces new
/// tables, it is never narrowed in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    pub objectives: Table,
    pub key_results: Table,
    pub indicators: Table,
    pub links: Table,
    pub actions: Table,
}

/// Loads a workbook from disk.
pub fn load_workbook(path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_workbook_bytes(&bytes)
}

/// Loads a workbook from the raw bytes of an `.xlsx` file.
///
/// The result depends only on `bytes`, so it can be memoized by content.
pub fn load_workbook_bytes(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

    let objectives = read_sheet(&mut workbook, SHEET_OBJECTIVES)?;
    let key_results = read_sheet(&mut workbook, SHEET_KEY_RESULTS)?;
    let indicators = read_sheet(&mut workbook, SHEET_INDICATORS)?;
    let links = read_sheet(&mut workbook, SHEET_LINKS)?;
    let actions = read_sheet(&mut workbook, SHEET_ACTIONS)?;

    let dataset = normalize(objectives, key_results, indicators, links, actions)?;
    info!(
        "loaded workbook: {} objectives, {} key results, {} indicators, {} links, {} actions",
        dataset.objectives.len(),
        dataset.key_results.len(),
        dataset.indicators.len(),
        dataset.links.len(),
        dataset.actions.len()
    );
    Ok(dataset)
}

/// Normalizes raw sheet tables into a dataset.
///
/// Fails only when an id column the filter joins on is missing. Columns used
/// solely for derived values fall back to empty defaults.
pub fn normalize(
    objectives: Table,
    key_results: Table,
    indicators: Table,
    links: Table,
    actions: Table,
) -> Result<Dataset, LoadError> {
    let objectives = trim_columns(objectives, SHEET_OBJECTIVES, &[OBJECTIVE_ID])?;
    let key_results = trim_columns(key_results, SHEET_KEY_RESULTS, &[KEY_RESULT_ID, OBJECTIVE_ID])?;
    let indicators = trim_columns(indicators, SHEET_INDICATORS, &[INDICATOR_ID])?;
    let links = trim_columns(links, SHEET_LINKS, &[OBJECTIVE_ID, KEY_RESULT_ID, INDICATOR_ID])?;
    let actions = trim_columns(actions, SHEET_ACTIONS, &[ACTION_ID])?;

    let actions = derive_action_links(&actions);
    let indicators = derive_related_objectives(&indicators, &links);

    Ok(Dataset {
        objectives,
        key_results,
        indicators,
        links,
        actions,
    })
}

fn read_sheet<RS>(workbook: &mut Xlsx<RS>, sheet: &str) -> Result<Table, LoadError>
where
    RS: std::io::Read + std::io::Seek,
{
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(LoadError::MissingSheet {
            sheet: sheet.to_string(),
        });
    }
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| LoadError::Sheet {
            sheet: sheet.to_string(),
            message: e.to_string(),
        })?;
    table_from_range(&range).ok_or_else(|| LoadError::EmptySheet {
        sheet: sheet.to_string(),
    })
}

/// First row is the header; fully blank rows are dropped.
fn table_from_range(range: &Range<Data>) -> Option<Table> {
    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()?
        .iter()
        .map(|cell| cell_text(cell).trim().to_string())
        .collect();

    let mut table = Table::new(header);
    for row in rows {
        let values: Vec<String> = row.iter().map(cell_text).collect();
        if values.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        table.push_row(values);
    }
    debug!("read sheet with {} columns and {} rows", table.columns().len(), table.len());
    Some(table)
}

/// Text form of a cell. Integral numbers lose their fractional part so that
/// numeric ids read the same as textual ones.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn trim_columns(table: Table, sheet: &str, id_columns: &[&str]) -> Result<Table, LoadError> {
    let mut table = table;
    for column in id_columns {
        if !table.has_column(column) {
            return Err(LoadError::MissingColumn {
                sheet: sheet.to_string(),
                column: column.to_string(),
            });
        }
        table = table.map_column(column, |v| v.trim().to_string());
    }
    Ok(table)
}

/// Trims a linking value and maps null markers to the empty string.
fn clean_link(value: &str) -> String {
    match value.trim() {
        "nan" | "None" => String::new(),
        v => v.to_string(),
    }
}

/// Adds `KR_ID_USADA` and `OKR_USED` to the actions table.
///
/// An explicit `KR_ID_USADA` column wins. Otherwise a non-empty
/// `KR_ID_FINAL` overrides `KR_ID_SUGERIDA` row by row, and without a final
/// column the suggestion is used directly. `OKR_USED` falls back to
/// `OKR_ID_SUGERIDA` the same way.
pub fn derive_action_links(actions: &Table) -> Table {
    let used_key_results: Vec<String> = if actions.has_column(KEY_RESULT_USED) {
        actions.iter().map(|row| clean_link(row.get(KEY_RESULT_USED))).collect()
    } else if actions.has_column(KEY_RESULT_FINAL) && actions.has_column(KEY_RESULT_SUGGESTED) {
        actions
            .iter()
            .map(|row| {
                let chosen = clean_link(row.get(KEY_RESULT_FINAL));
                if chosen.is_empty() {
                    clean_link(row.get(KEY_RESULT_SUGGESTED))
                } else {
                    chosen
                }
            })
            .collect()
    } else {
        actions
            .iter()
            .map(|row| clean_link(row.get(KEY_RESULT_SUGGESTED)))
            .collect()
    };

    let used_objectives: Vec<String> = if actions.has_column(OBJECTIVE_USED) {
        actions.iter().map(|row| clean_link(row.get(OBJECTIVE_USED))).collect()
    } else {
        actions
            .iter()
            .map(|row| clean_link(row.get(OBJECTIVE_SUGGESTED)))
            .collect()
    };

    actions
        .with_column(KEY_RESULT_USED, used_key_results)
        .with_column(OBJECTIVE_USED, used_objectives)
}

/// Adds `OKRs_relacionadas` to the indicators table: the sorted, comma-joined
/// set of objectives each indicator is linked to.
pub fn derive_related_objectives(indicators: &Table, links: &Table) -> Table {
    let mut by_indicator: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    for link in links.iter() {
        let objective = clean_link(link.get(OBJECTIVE_ID));
        if objective.is_empty() {
            continue;
        }
        by_indicator
            .entry(link.get(INDICATOR_ID))
            .or_default()
            .insert(objective);
    }

    let related = indicators
        .iter()
        .map(|row| {
            by_indicator
                .get(row.get(INDICATOR_ID).trim())
                .map(|set| set.iter().cloned().collect::<Vec<_>>().join(", "))
                .unwrap_or_default()
        })
        .collect();
    indicators.with_column(RELATED_OBJECTIVES, related)
}
