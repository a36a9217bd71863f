//! Cross-table drill-down.
//!
//! Given the full dataset and the pinned entity, derives the subset of each
//! table that is related to it through the key result / objective columns and
//! the `OKR_KPI` link table. Views are always computed from the full snapshot;
//! a previous view is never filtered again.

use crate::table::Table;
use crate::workbook::Dataset;
use crate::workbook::columns::*;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The single entity currently pinned by the user, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    None,
    Objective(String),
    KeyResult(String),
    Action(String),
    Indicator(String),
}

/// Filtered objectives, key results, actions and indicators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Views {
    pub objectives: Table,
    pub key_results: Table,
    pub actions: Table,
    pub indicators: Table,
}

impl Views {
    fn identity(dataset: &Dataset) -> Self {
        Views {
            objectives: dataset.objectives.clone(),
            key_results: dataset.key_results.clone(),
            actions: dataset.actions.clone(),
            indicators: dataset.indicators.clone(),
        }
    }
}

/// Computes the views for `selection`.
///
/// Unknown ids never fail: the affected views come back empty. The one
/// exception is an action id that is not in the actions table, which leaves
/// every table unfiltered. An empty id is treated as no selection.
pub fn filter_views(dataset: &Dataset, selection: &Selection) -> Views {
    match selection {
        Selection::Action(id) if !id.is_empty() => by_action(dataset, id),
        Selection::Indicator(id) if !id.is_empty() => by_indicator(dataset, id),
        Selection::KeyResult(id) if !id.is_empty() => by_key_result(dataset, id),
        Selection::Objective(id) if !id.is_empty() => by_objective(dataset, id),
        _ => Views::identity(dataset),
    }
}

fn objective_of_key_result(dataset: &Dataset) -> HashMap<&str, &str> {
    dataset
        .key_results
        .iter()
        .map(|row| (row.get(KEY_RESULT_ID), row.get(OBJECTIVE_ID)))
        .collect()
}

/// The matching objective, or every objective when none is known.
fn objectives_for(objectives: &Table, objective_id: &str) -> Table {
    if objective_id.is_empty() {
        objectives.clone()
    } else {
        objectives.filter_eq(OBJECTIVE_ID, objective_id)
    }
}

/// Indicators linked through `OKR_KPI` where `key_column` equals `key`.
fn linked_indicators(dataset: &Dataset, key_column: &str, key: &str) -> Table {
    if key.is_empty() {
        return dataset.indicators.empty_like();
    }
    let ids = dataset.links.distinct_where(key_column, key, INDICATOR_ID);
    dataset.indicators.filter_in(INDICATOR_ID, &ids)
}

fn by_action(dataset: &Dataset, action_id: &str) -> Views {
    let Some(action) = dataset.actions.find(ACTION_ID, action_id) else {
        debug!("action {} not found; showing all tables", action_id);
        return Views::identity(dataset);
    };

    let key_result_id = action.get(KEY_RESULT_USED);
    let objective_id = match action.get(OBJECTIVE_USED) {
        "" => objective_of_key_result(dataset)
            .get(key_result_id)
            .copied()
            .unwrap_or(""),
        id => id,
    };

    let key_results = if key_result_id.is_empty() {
        dataset.key_results.empty_like()
    } else {
        dataset.key_results.filter_eq(KEY_RESULT_ID, key_result_id)
    };

    Views {
        objectives: objectives_for(&dataset.objectives, objective_id),
        key_results,
        actions: dataset.actions.filter_eq(ACTION_ID, action_id),
        indicators: linked_indicators(dataset, KEY_RESULT_ID, key_result_id),
    }
}

fn by_indicator(dataset: &Dataset, indicator_id: &str) -> Views {
    let key_result_ids = dataset
        .links
        .distinct_where(INDICATOR_ID, indicator_id, KEY_RESULT_ID);
    let objective_ids = dataset
        .links
        .distinct_where(INDICATOR_ID, indicator_id, OBJECTIVE_ID);

    Views {
        objectives: dataset.objectives.filter_in(OBJECTIVE_ID, &objective_ids),
        key_results: dataset.key_results.filter_in(KEY_RESULT_ID, &key_result_ids),
        actions: dataset.actions.filter_in(KEY_RESULT_USED, &key_result_ids),
        indicators: dataset.indicators.filter_eq(INDICATOR_ID, indicator_id),
    }
}

fn by_key_result(dataset: &Dataset, key_result_id: &str) -> Views {
    let objective_id = objective_of_key_result(dataset)
        .get(key_result_id)
        .copied()
        .unwrap_or("");

    Views {
        objectives: objectives_for(&dataset.objectives, objective_id),
        key_results: dataset.key_results.filter_eq(KEY_RESULT_ID, key_result_id),
        actions: dataset.actions.filter_eq(KEY_RESULT_USED, key_result_id),
        indicators: linked_indicators(dataset, KEY_RESULT_ID, key_result_id),
    }
}

fn by_objective(dataset: &Dataset, objective_id: &str) -> Views {
    Views {
        objectives: dataset.objectives.filter_eq(OBJECTIVE_ID, objective_id),
        key_results: dataset.key_results.filter_eq(OBJECTIVE_ID, objective_id),
        actions: dataset.actions.filter_eq(OBJECTIVE_USED, objective_id),
        indicators: linked_indicators(dataset, OBJECTIVE_ID, objective_id),
    }
}
