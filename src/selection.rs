use crate::filter::Selection;
use crate::workbook::columns;
use log::info;
use serde::{Deserialize, Serialize};

/// The four selectable tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Objective,
    KeyResult,
    Action,
    Indicator,
}

impl Entity {
    /// Display order of the tables on the page.
    pub const ALL: [Entity; 4] = [
        Entity::Objective,
        Entity::KeyResult,
        Entity::Action,
        Entity::Indicator,
    ];

    /// Column holding the row id.
    pub fn id_column(self) -> &'static str {
        match self {
            Entity::Objective => columns::OBJECTIVE_ID,
            Entity::KeyResult => columns::KEY_RESULT_ID,
            Entity::Action => columns::ACTION_ID,
            Entity::Indicator => columns::INDICATOR_ID,
        }
    }

    /// Key of the table's entry in the layout file.
    pub fn layout_key(self) -> &'static str {
        match self {
            Entity::Objective => "okrs",
            Entity::KeyResult => "krs",
            Entity::Action => "acoes",
            Entity::Indicator => "kpis",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Entity::Objective => "OKRs",
            Entity::KeyResult => "KRs",
            Entity::Action => "Ações",
            Entity::Indicator => "KPIs",
        }
    }

    /// Accepts the layout key, the snake_case name, or the short workbook name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "okr" | "okrs" | "objective" => Some(Entity::Objective),
            "kr" | "krs" | "key_result" => Some(Entity::KeyResult),
            "acao" | "acoes" | "ação" | "ações" | "action" => Some(Entity::Action),
            "kpi" | "kpis" | "indicator" => Some(Entity::Indicator),
            _ => None,
        }
    }
}

/// One slot per table. Setting a slot clears the other three, so at most one
/// entity is pinned at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    objective: Option<String>,
    key_result: Option<String>,
    action: Option<String>,
    indicator: Option<String>,
}

impl SelectionState {
    fn slot(&self, entity: Entity) -> &Option<String> {
        match entity {
            Entity::Objective => &self.objective,
            Entity::KeyResult => &self.key_result,
            Entity::Action => &self.action,
            Entity::Indicator => &self.indicator,
        }
    }

    fn slot_mut(&mut self, entity: Entity) -> &mut Option<String> {
        match entity {
            Entity::Objective => &mut self.objective,
            Entity::KeyResult => &mut self.key_result,
            Entity::Action => &mut self.action,
            Entity::Indicator => &mut self.indicator,
        }
    }

    pub fn get(&self, entity: Entity) -> Option<&str> {
        self.slot(entity).as_deref()
    }

    pub fn is_empty(&self) -> bool {
        Entity::ALL.iter().all(|e| self.slot(*e).is_none())
    }

    /// Pins `id` in `entity`'s slot and clears the others.
    pub fn set(&mut self, entity: Entity, id: impl Into<String>) {
        let id = id.into();
        info!("selected {:?} {}", entity, id);
        *self = SelectionState::default();
        *self.slot_mut(entity) = Some(id);
    }

    /// Applies a checkbox change on a row: checking selects it, unchecking
    /// clears the slot only when it still holds that row.
    pub fn apply_checkbox(&mut self, entity: Entity, id: &str, checked: bool) {
        if checked {
            self.set(entity, id);
        } else if self.get(entity) == Some(id) {
            info!("cleared {:?} {}", entity, id);
            *self.slot_mut(entity) = None;
        }
    }

    /// Clicking a row flips its checkbox.
    pub fn toggle(&mut self, entity: Entity, id: &str) {
        let checked = self.get(entity) != Some(id);
        self.apply_checkbox(entity, id, checked);
    }

    pub fn clear(&mut self) {
        *self = SelectionState::default();
    }

    /// The selection the filter honours. Only one slot is normally set; if
    /// several are, action wins over indicator, then key result, then
    /// objective. Empty ids select nothing.
    pub fn selection(&self) -> Selection {
        let pinned = |slot: &Option<String>| slot.clone().filter(|id| !id.is_empty());
        if let Some(id) = pinned(&self.action) {
            Selection::Action(id)
        } else if let Some(id) = pinned(&self.indicator) {
            Selection::Indicator(id)
        } else if let Some(id) = pinned(&self.key_result) {
            Selection::KeyResult(id)
        } else if let Some(id) = pinned(&self.objective) {
            Selection::Objective(id)
        } else {
            Selection::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_one_slot_clears_the_others() {
        let mut state = SelectionState::default();
        state.set(Entity::Objective, "O1");
        state.set(Entity::Indicator, "I1");
        assert_eq!(state.get(Entity::Objective), None);
        assert_eq!(state.get(Entity::Indicator), Some("I1"));
        assert_eq!(state.selection(), Selection::Indicator("I1".into()));
    }

    #[test]
    fn toggling_the_selected_row_clears_it() {
        let mut state = SelectionState::default();
        state.toggle(Entity::KeyResult, "K1");
        assert_eq!(state.selection(), Selection::KeyResult("K1".into()));
        state.toggle(Entity::KeyResult, "K2");
        assert_eq!(state.selection(), Selection::KeyResult("K2".into()));
        state.toggle(Entity::KeyResult, "K2");
        assert!(state.is_empty());
        assert_eq!(state.selection(), Selection::None);
    }

    #[test]
    fn unchecking_another_row_keeps_selection() {
        let mut state = SelectionState::default();
        state.set(Entity::Action, "A1");
        state.apply_checkbox(Entity::Action, "A2", false);
        assert_eq!(state.get(Entity::Action), Some("A1"));
    }

    #[test]
    fn precedence_when_several_slots_are_set() {
        let state = SelectionState {
            objective: Some("O1".into()),
            key_result: Some("K1".into()),
            action: None,
            indicator: Some("I1".into()),
        };
        assert_eq!(state.selection(), Selection::Indicator("I1".into()));

        let state = SelectionState {
            action: Some("A1".into()),
            ..state
        };
        assert_eq!(state.selection(), Selection::Action("A1".into()));
    }

    #[test]
    fn empty_ids_select_nothing() {
        let mut state = SelectionState::default();
        state.toggle(Entity::Objective, "");
        assert_eq!(state.selection(), Selection::None);

        let state = SelectionState {
            key_result: Some("K1".into()),
            action: Some(String::new()),
            ..SelectionState::default()
        };
        assert_eq!(state.selection(), Selection::KeyResult("K1".into()));
    }

    #[test]
    fn clear_resets_all_slots() {
        let mut state = SelectionState::default();
        state.set(Entity::Objective, "O1");
        state.clear();
        assert!(state.is_empty());
    }

    #[test]
    fn entity_names_parse() {
        assert_eq!(Entity::parse("okrs"), Some(Entity::Objective));
        assert_eq!(Entity::parse(" KR "), Some(Entity::KeyResult));
        assert_eq!(Entity::parse("acoes"), Some(Entity::Action));
        assert_eq!(Entity::parse("indicator"), Some(Entity::Indicator));
        assert_eq!(Entity::parse("other"), None);
    }
}
