use okr_monitor::table::Table;
use okr_monitor::workbook::{columns, normalize};
use okr_monitor::{Dataset, Selection, StatusCategory, filter_views, normalize_status};

fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
    Table::from_rows(
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect(),
    )
}

fn ids(table: &Table, column: &str) -> Vec<String> {
    table.column_values(column).into_iter().map(String::from).collect()
}

fn scenario() -> Dataset {
    normalize(
        table(&["OKR_ID"], &[&["O1"]]),
        table(&["KR_ID", "OKR_ID"], &[&["K1", "O1"]]),
        table(&["KPI_ID"], &[&["I1"]]),
        table(&["OKR_ID", "KR_ID", "KPI_ID"], &[&["O1", "K1", "I1"]]),
        table(
            &["ID", "KR_ID_USADA", "OKR_USED", "STATUS"],
            &[&["A1", "K1", "O1", "Em andamento"]],
        ),
    )
    .expect("scenario dataset should normalize")
}

// Selecting the objective pulls in its key result, action and indicator
fn test_select_objective() {
    println!("\n====== Testing objective selection ======");
    let dataset = scenario();
    let views = filter_views(&dataset, &Selection::Objective("O1".into()));

    assert_eq!(ids(&views.key_results, columns::KEY_RESULT_ID), vec!["K1"]);
    println!("✓ Key results view is [K1]");

    assert_eq!(ids(&views.actions, columns::ACTION_ID), vec!["A1"]);
    println!("✓ Actions view is [A1]");

    assert_eq!(ids(&views.indicators, columns::INDICATOR_ID), vec!["I1"]);
    println!("✓ Indicators view is [I1]");
}

fn test_status_of_action() {
    println!("\n====== Testing status category ======");
    let dataset = scenario();
    let status = dataset.actions.get(0, columns::STATUS);
    assert_eq!(normalize_status(status), StatusCategory::InProgress);
    println!("✓ '{}' is {}", status, StatusCategory::InProgress);
}

fn test_identity_and_misses() {
    println!("\n====== Testing identity and dangling selections ======");
    let dataset = scenario();
    let all = filter_views(&dataset, &Selection::None);
    assert_eq!(all.objectives, dataset.objectives);
    assert_eq!(all.actions, dataset.actions);
    println!("✓ No selection returns the full tables");

    let missing = filter_views(&dataset, &Selection::Action("A404".into()));
    assert_eq!(missing, all);
    println!("✓ Unknown action leaves the tables unfiltered");

    let missing = filter_views(&dataset, &Selection::Indicator("I404".into()));
    assert!(missing.key_results.is_empty());
    assert!(missing.objectives.is_empty());
    println!("✓ Unknown indicator empties the related tables");
}

fn main() {
    test_select_objective();
    test_status_of_action();
    test_identity_and_misses();
    println!("\nAll scenario checks passed.");
}
