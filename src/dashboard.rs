//! One interaction turn of the monitoring page.
//!
//! Each turn reloads the workbook through the cache, filters it by the current
//! selection, lays the four tables out and tallies action statuses. The only
//! state that changes between turns is the selection, the workbook source and
//! the layout.

use crate::cache::WorkbookCache;
use crate::config::Settings;
use crate::error::LoadError;
use crate::filter::{Selection, Views, filter_views};
use crate::layout::{ColumnConfig, Layout, SELECTED_COLUMN, apply_order};
use crate::selection::{Entity, SelectionState};
use crate::status::{StatusTally, tally_actions};
use crate::table::Table;
use crate::workbook::Dataset;
use crate::workbook::columns::*;
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

const KEY_RESULT_COLUMNS: [&str; 5] = ["KR_ID", "OKR_ID", "Resultado-chave", "Meta_2028", "Frequência"];
const ACTION_COLUMNS: [&str; 6] = ["ID", "EIXO", "O QUÊ?", "STATUS", "OKR_USED", "KR_ID_USADA"];
const INDICATOR_COLUMNS: [&str; 6] = ["KPI_ID", "KPI", "OKRs_relacionadas", "Unidade", "Frequência", "Fonte"];

#[derive(Clone, Debug)]
pub enum WorkbookSource {
    File(PathBuf),
    Upload { name: String, bytes: Arc<Vec<u8>> },
}

impl WorkbookSource {
    pub fn name(&self) -> String {
        match self {
            WorkbookSource::File(path) => path.display().to_string(),
            WorkbookSource::Upload { name, .. } => name.clone(),
        }
    }

    fn bytes(&self) -> Result<Arc<Vec<u8>>, LoadError> {
        match self {
            WorkbookSource::File(path) => std::fs::read(path)
                .map(Arc::new)
                .map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                }),
            WorkbookSource::Upload { bytes, .. } => Ok(Arc::clone(bytes)),
        }
    }
}

/// A table ready for display.
#[derive(Clone, Debug, Serialize)]
pub struct TableView {
    pub entity: Entity,
    pub title: &'static str,
    pub columns: Vec<ColumnConfig>,
    pub table: Table,
    /// Id of each displayed row, even when the layout hides the id column.
    pub row_ids: Vec<String>,
    pub selected_id: Option<String>,
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DashboardPage {
    pub source: String,
    pub selection: Selection,
    pub tally: StatusTally,
    pub tables: Vec<TableView>,
}

impl DashboardPage {
    pub fn table(&self, entity: Entity) -> Option<&TableView> {
        self.tables.iter().find(|t| t.entity == entity)
    }
}

pub struct Dashboard {
    settings: Settings,
    source: WorkbookSource,
    cache: WorkbookCache,
    layout: Layout,
    selection: SelectionState,
}

impl Dashboard {
    pub fn new(settings: Settings) -> Self {
        let layout = Layout::load(&settings.layout_path);
        Dashboard {
            source: WorkbookSource::File(settings.workbook_path.clone()),
            settings,
            cache: WorkbookCache::new(),
            layout,
            selection: SelectionState::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn source(&self) -> &WorkbookSource {
        &self.source
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn cache(&self) -> &WorkbookCache {
        &self.cache
    }

    /// Switches the source, dropping the cached dataset of a replaced upload.
    fn replace_source(&mut self, source: WorkbookSource) {
        let previous = std::mem::replace(&mut self.source, source);
        if let WorkbookSource::Upload { bytes, .. } = previous {
            let still_used = match &self.source {
                WorkbookSource::Upload { bytes: current, .. } => current == &bytes,
                WorkbookSource::File(_) => false,
            };
            if !still_used {
                self.cache.evict(&bytes);
            }
        }
    }

    pub fn use_upload(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let name = name.into();
        info!("using uploaded workbook {} ({} bytes)", name, bytes.len());
        self.replace_source(WorkbookSource::Upload {
            name,
            bytes: Arc::new(bytes),
        });
    }

    pub fn use_file(&mut self, path: impl Into<PathBuf>) {
        self.replace_source(WorkbookSource::File(path.into()));
    }

    pub fn use_default_workbook(&mut self) {
        self.use_file(self.settings.workbook_path.clone());
    }

    pub fn toggle(&mut self, entity: Entity, id: &str) {
        self.selection.toggle(entity, id);
    }

    pub fn apply_checkbox(&mut self, entity: Entity, id: &str, checked: bool) {
        self.selection.apply_checkbox(entity, id, checked);
    }

    pub fn clear_selections(&mut self) {
        info!("clearing all selections");
        self.selection.clear();
    }

    /// Drops cached datasets and re-reads the layout file.
    pub fn reload_layout(&mut self) {
        self.cache.clear();
        self.layout = Layout::load(&self.settings.layout_path);
    }

    pub fn dataset(&mut self) -> Result<Arc<Dataset>, LoadError> {
        let bytes = self.source.bytes()?;
        self.cache.get_or_load(&bytes)
    }

    /// Runs one turn: load, filter, lay out, tally.
    pub fn render(&mut self) -> Result<DashboardPage, LoadError> {
        let dataset = self.dataset()?;
        let selection = self.selection.selection();
        let views = filter_views(&dataset, &selection);

        let tables = Entity::ALL
            .iter()
            .map(|&entity| self.table_view(entity, display_table(entity, &views)))
            .collect();

        Ok(DashboardPage {
            source: self.source.name(),
            selection,
            tally: tally_actions(&dataset.actions),
            tables,
        })
    }

    fn table_view(&self, entity: Entity, table: Table) -> TableView {
        let id_column = entity.id_column();
        let selected_id = self.selection.get(entity).map(str::to_string);
        let row_ids: Vec<String> = table
            .column_values(id_column)
            .into_iter()
            .map(str::to_string)
            .collect();

        let flags = row_ids
            .iter()
            .map(|id| {
                let selected = selected_id.as_deref() == Some(id.as_str());
                (selected && table.has_column(id_column)).to_string()
            })
            .collect();
        let table = table.with_column(SELECTED_COLUMN, flags);

        let layout = self.layout.table(entity.layout_key());
        let table = apply_order(&table, &layout.order);
        let columns = self.layout.column_configs(&table, &layout);

        TableView {
            entity,
            title: entity.title(),
            columns,
            table,
            row_ids,
            selected_id,
        }
    }
}

/// Columns each table shows before the layout is applied. Tables missing
/// some of the expected columns show what they have.
pub fn display_table(entity: Entity, views: &Views) -> Table {
    match entity {
        Entity::Objective => {
            let objectives = &views.objectives;
            let text: Vec<String> = match objectives.last_column() {
                Some(last) => objectives
                    .column_values(last)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                None => Vec::new(),
            };
            objectives
                .select(&[OBJECTIVE_ID, AXIS])
                .with_column(OBJECTIVE_TEXT, text)
        }
        Entity::KeyResult => views.key_results.select(&KEY_RESULT_COLUMNS),
        Entity::Action => select_all_or_nothing(&views.actions, &ACTION_COLUMNS),
        Entity::Indicator => select_all_or_nothing(&views.indicators, &INDICATOR_COLUMNS),
    }
}

fn select_all_or_nothing(table: &Table, names: &[&str]) -> Table {
    if table.has_all_columns(names) {
        table.select(names)
    } else {
        table.clone()
    }
}
