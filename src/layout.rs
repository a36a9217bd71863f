//! Column layout of the four tables.
//!
//! The layout file is plain JSON, edited by hand:
//!
//! ```json
//! {
//!   "okrs": {
//!     "order": ["_selected", "OKR_ID", "Objetivo_OKR"],
//!     "width": {"Objetivo_OKR": "large", "OKR_ID": "80px"},
//!     "labels": {"OKR_ID": "OKR"}
//!   },
//!   "__global__": {"labels": {"_selected": "Selecionado"}}
//! }
//! ```
//!
//! Reading it never fails. A missing, unreadable or non-object file gives the
//! built-in layout, and malformed entries inside a table are ignored.

use crate::table::Table;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::path::Path;

/// Synthetic checkbox column marking the selected row.
pub const SELECTED_COLUMN: &str = "_selected";

const GLOBAL_KEY: &str = "__global__";

lazy_static! {
    static ref PIXEL_WIDTH_REGEX: Regex = Regex::new(r"^([0-9]+)\s*(px)?$").unwrap();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnWidth {
    Small,
    Medium,
    Large,
    Pixels(u32),
}

impl ColumnWidth {
    /// Accepts `small`, `medium`, `large`, a pixel count, or `"NNNpx"`.
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).map(ColumnWidth::Pixels),
            Value::String(s) => {
                let s = s.trim().to_lowercase();
                match s.as_str() {
                    "small" => Some(ColumnWidth::Small),
                    "medium" => Some(ColumnWidth::Medium),
                    "large" => Some(ColumnWidth::Large),
                    _ => PIXEL_WIDTH_REGEX
                        .captures(&s)
                        .and_then(|caps| caps[1].parse().ok())
                        .map(ColumnWidth::Pixels),
                }
            }
            _ => None,
        }
    }

    /// CSS width for the rendered column.
    pub fn css(self) -> String {
        match self {
            ColumnWidth::Small => "75px".to_string(),
            ColumnWidth::Medium => "200px".to_string(),
            ColumnWidth::Large => "400px".to_string(),
            ColumnWidth::Pixels(px) => format!("{}px", px),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Checkbox,
    Text,
}

/// How one column of a table is displayed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnConfig {
    pub name: String,
    pub label: String,
    pub kind: ColumnKind,
    pub width: ColumnWidth,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableLayout {
    pub order: Vec<String>,
    pub width: BTreeMap<String, Value>,
    pub labels: BTreeMap<String, String>,
}

impl TableLayout {
    fn from_value(value: Option<&Value>) -> Self {
        let Some(obj) = value.and_then(Value::as_object) else {
            return TableLayout::default();
        };
        TableLayout {
            order: obj
                .get("order")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            width: obj
                .get("width")
                .and_then(Value::as_object)
                .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default(),
            labels: labels_from(obj.get("labels")),
        }
    }
}

fn labels_from(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|m| {
            m.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| {
                    let label = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), label)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Per-table layouts plus global label fallbacks.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    tables: BTreeMap<String, TableLayout>,
    global_labels: BTreeMap<String, String>,
}

impl Default for Layout {
    fn default() -> Self {
        let value = default_layout_value();
        match value.as_object() {
            Some(obj) => Layout::from_object(obj),
            None => Layout {
                tables: BTreeMap::new(),
                global_labels: BTreeMap::new(),
            },
        }
    }
}

impl Layout {
    fn from_object(obj: &Map<String, Value>) -> Self {
        let tables = obj
            .iter()
            .filter(|(key, _)| key.as_str() != GLOBAL_KEY)
            .map(|(key, value)| (key.clone(), TableLayout::from_value(Some(value))))
            .collect();
        let global_labels = obj
            .get(GLOBAL_KEY)
            .and_then(Value::as_object)
            .map(|g| labels_from(g.get("labels")))
            .unwrap_or_default();
        Layout {
            tables,
            global_labels,
        }
    }

    /// Parses a layout document. Anything but a JSON object yields the
    /// built-in layout.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(obj)) => Layout::from_object(&obj),
            Ok(_) => {
                warn!("layout is not a JSON object; using the default layout");
                Layout::default()
            }
            Err(e) => {
                warn!("invalid layout JSON ({}); using the default layout", e);
                Layout::default()
            }
        }
    }

    /// Reads the layout file, falling back to the built-in layout.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                debug!("read layout from {}", path.display());
                Layout::from_json(&text)
            }
            Err(e) => {
                debug!("no layout at {} ({}); using the default layout", path.display(), e);
                Layout::default()
            }
        }
    }

    /// Layout of one table; tables the file does not mention get an empty one.
    pub fn table(&self, key: &str) -> TableLayout {
        self.tables.get(key).cloned().unwrap_or_default()
    }

    pub fn global_labels(&self) -> &BTreeMap<String, String> {
        &self.global_labels
    }

    /// Table label, then global label, then the column name itself.
    pub fn label_for(&self, table: &TableLayout, column: &str) -> String {
        table
            .labels
            .get(column)
            .or_else(|| self.global_labels.get(column))
            .cloned()
            .unwrap_or_else(|| column.to_string())
    }

    /// Display configuration for every column of `table`.
    pub fn column_configs(&self, table: &Table, layout: &TableLayout) -> Vec<ColumnConfig> {
        table
            .columns()
            .iter()
            .map(|name| {
                let label = self.label_for(layout, name);
                if name == SELECTED_COLUMN {
                    return ColumnConfig {
                        name: name.clone(),
                        label,
                        kind: ColumnKind::Checkbox,
                        width: ColumnWidth::Small,
                    };
                }
                let width = layout
                    .width
                    .get(name)
                    .and_then(ColumnWidth::parse)
                    .unwrap_or(ColumnWidth::Medium);
                ColumnConfig {
                    name: name.clone(),
                    label,
                    kind: ColumnKind::Text,
                    width,
                }
            })
            .collect()
    }
}

/// Reorders `table` by `order`, hiding unlisted columns. When none of the
/// listed columns exist the table is returned as is.
pub fn apply_order(table: &Table, order: &[String]) -> Table {
    if order.is_empty() {
        return table.clone();
    }
    let projected = table.select(order);
    if projected.columns().is_empty() {
        table.clone()
    } else {
        projected
    }
}

/// The layout used when no file is present. Also the starting point for a
/// hand-edited `column_layout.json`.
pub fn default_layout_value() -> Value {
    json!({
        "okrs": {
            "order": ["_selected", "OKR_ID", "Eixo_CAPES", "Objetivo_OKR"],
            "width": {},
            "labels": {"OKR_ID": "OKR", "Eixo_CAPES": "Eixo CAPES", "Objetivo_OKR": "Objetivo"}
        },
        "krs": {
            "order": ["_selected", "KR_ID", "OKR_ID", "Resultado-chave", "Meta_2028", "Frequência"],
            "width": {},
            "labels": {
                "KR_ID": "KR", "OKR_ID": "OKR", "Resultado-chave": "Resultado-chave",
                "Meta_2028": "Meta 2028", "Frequência": "Frequência"
            }
        },
        "acoes": {
            "order": ["_selected", "ID", "EIXO", "O QUÊ?", "STATUS", "OKR_USED", "KR_ID_USADA"],
            "width": {},
            "labels": {
                "ID": "ID", "EIXO": "Eixo", "O QUÊ?": "O quê?", "STATUS": "Status",
                "OKR_USED": "OKR", "KR_ID_USADA": "KR"
            }
        },
        "kpis": {
            "order": ["_selected", "KPI_ID", "KPI", "OKRs_relacionadas", "Unidade", "Frequência", "Fonte"],
            "width": {},
            "labels": {
                "KPI_ID": "KPI", "KPI": "Indicador", "OKRs_relacionadas": "OKRs",
                "Unidade": "Unidade", "Frequência": "Frequência", "Fonte": "Fonte"
            }
        },
        "__global__": {"labels": {"_selected": "Selecionado"}}
    })
}
