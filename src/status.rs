use crate::table::Table;
use crate::workbook::columns::{OBJECTIVE_USED, STATUS};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

const COMPLETED_MARKERS: &[&str] = &["concl", "final", "done", "completed"];
const IN_PROGRESS_MARKERS: &[&str] = &["andam", "execu", "prog"];
const IN_PROGRESS_PREFIXES: &[&str] = &["em ", "in "];
const PENDING_MARKERS: &[&str] = &["pend", "a fazer", "todo"];

/// Bucket an action's free-text status falls into.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusCategory {
    Completed,
    InProgress,
    Pending,
    /// A non-empty status no marker recognised, kept verbatim.
    Other(String),
    NoStatus,
}

impl StatusCategory {
    pub fn label(&self) -> &str {
        match self {
            StatusCategory::Completed => "Concluída",
            StatusCategory::InProgress => "Em andamento",
            StatusCategory::Pending => "Pendente",
            StatusCategory::Other(s) => s,
            StatusCategory::NoStatus => "Sem status",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl Serialize for StatusCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Maps a status to its category by case-insensitive substring match.
/// Completion markers win over progress markers, which win over pending ones.
pub fn normalize_status(status: &str) -> StatusCategory {
    let status = status.trim();
    let t = status.to_lowercase();
    if COMPLETED_MARKERS.iter().any(|m| t.contains(m)) {
        StatusCategory::Completed
    } else if IN_PROGRESS_MARKERS.iter().any(|m| t.contains(m))
        || IN_PROGRESS_PREFIXES.iter().any(|p| t.starts_with(p))
    {
        StatusCategory::InProgress
    } else if PENDING_MARKERS.iter().any(|m| t.contains(m)) {
        StatusCategory::Pending
    } else if status.is_empty() || t == "sem status" {
        StatusCategory::NoStatus
    } else {
        StatusCategory::Other(status.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub objective: String,
    pub category: StatusCategory,
    pub count: usize,
}

/// Action counts per `(objective, category)`, ordered by objective then by
/// category label.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusTally {
    pub counts: Vec<StatusCount>,
}

impl StatusTally {
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    pub fn count_of(&self, category: &StatusCategory) -> usize {
        self.counts
            .iter()
            .filter(|c| &c.category == category)
            .map(|c| c.count)
            .sum()
    }

    /// Objectives in tally order, without repeats.
    pub fn objectives(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for c in &self.counts {
            if out.last() != Some(&c.objective.as_str()) {
                out.push(&c.objective);
            }
        }
        out
    }

    /// Categories present, in label order.
    pub fn categories(&self) -> Vec<&StatusCategory> {
        let mut by_label: BTreeMap<&str, &StatusCategory> = BTreeMap::new();
        for c in &self.counts {
            by_label.entry(c.category.label()).or_insert(&c.category);
        }
        by_label.into_values().collect()
    }
}

/// Groups actions that name an objective by `(OKR_USED, category)`.
/// Without a `STATUS` column every action counts as [`StatusCategory::NoStatus`].
pub fn tally_actions(actions: &Table) -> StatusTally {
    let mut groups: BTreeMap<(String, String), (StatusCategory, usize)> = BTreeMap::new();
    for row in actions.iter() {
        let objective = row.get(OBJECTIVE_USED).trim();
        if objective.is_empty() {
            continue;
        }
        let category = normalize_status(row.get(STATUS));
        let key = (objective.to_string(), category.label().to_string());
        groups.entry(key).or_insert((category, 0)).1 += 1;
    }

    StatusTally {
        counts: groups
            .into_iter()
            .map(|((objective, _), (category, count))| StatusCount {
                objective,
                category,
                count,
            })
            .collect(),
    }
}
