use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A homogeneous table of text values, as read from one workbook sheet.
///
/// Columns are addressed by name. Reading a column that does not exist never
/// fails: it yields the empty string, which is also how an absent value is
/// stored. Every transforming method returns a new table and leaves `self`
/// untouched, so a loaded table can be shared freely between filter passes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Borrowed view of a single row.
#[derive(Clone, Copy, Debug)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> &'a str {
        self.table.get(self.index, column)
    }

    pub fn values(&self) -> &'a [String] {
        &self.table.rows[self.index]
    }
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from raw rows. Short rows are padded with empty values
    /// and long rows are cut to the header width.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Table::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn last_column(&self) -> Option<&str> {
        self.columns.last().map(String::as_str)
    }

    pub fn get(&self, row: usize, column: &str) -> &str {
        match (self.rows.get(row), self.column_index(column)) {
            (Some(values), Some(col)) => values[col].as_str(),
            _ => "",
        }
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.rows.len()).then_some(Row { table: self, index })
    }

    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows.len()).map(move |index| Row { table: self, index })
    }

    /// Values of one column, top to bottom. An absent column yields one empty
    /// value per row.
    pub fn column_values(&self, column: &str) -> Vec<&str> {
        self.iter().map(|row| row.get(column)).collect()
    }

    /// First row whose `column` equals `value`.
    pub fn find(&self, column: &str, value: &str) -> Option<Row<'_>> {
        self.iter().find(|row| row.get(column) == value)
    }

    /// Zero rows, same columns.
    pub fn empty_like(&self) -> Table {
        Table::new(self.columns.clone())
    }

    pub fn filter<F>(&self, keep: F) -> Table
    where
        F: Fn(&Row<'_>) -> bool,
    {
        let rows = self
            .iter()
            .filter(|row| keep(row))
            .map(|row| row.values().to_vec())
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn filter_eq(&self, column: &str, value: &str) -> Table {
        self.filter(|row| row.get(column) == value)
    }

    pub fn filter_in(&self, column: &str, values: &BTreeSet<String>) -> Table {
        if values.is_empty() {
            return self.empty_like();
        }
        self.filter(|row| values.contains(row.get(column)))
    }

    /// Returns a copy with `name` set to `values`, replacing the column when it
    /// already exists and appending it otherwise.
    pub fn with_column(&self, name: &str, values: Vec<String>) -> Table {
        let mut out = self.clone();
        let col = match out.column_index(name) {
            Some(col) => col,
            None => {
                out.columns.push(name.to_string());
                for row in out.rows.iter_mut() {
                    row.push(String::new());
                }
                out.columns.len() - 1
            }
        };
        for (row, value) in out.rows.iter_mut().zip(values) {
            row[col] = value;
        }
        out
    }

    /// Returns a copy with `f` applied to every value of `column`. A missing
    /// column leaves the table unchanged.
    pub fn map_column<F>(&self, column: &str, f: F) -> Table
    where
        F: Fn(&str) -> String,
    {
        let mut out = self.clone();
        if let Some(col) = out.column_index(column) {
            for row in out.rows.iter_mut() {
                row[col] = f(&row[col]);
            }
        }
        out
    }

    /// Projects onto the named columns that exist, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Table {
        let picked: Vec<(String, usize)> = names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                self.column_index(name).map(|col| (name.to_string(), col))
            })
            .collect();
        Table {
            columns: picked.iter().map(|(name, _)| name.clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| picked.iter().map(|(_, col)| row[*col].clone()).collect())
                .collect(),
        }
    }

    pub fn has_all_columns<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|name| self.has_column(name.as_ref()))
    }

    /// Distinct non-empty values of `column` over the rows where `key_column`
    /// equals `key`.
    pub fn distinct_where(&self, key_column: &str, key: &str, column: &str) -> BTreeSet<String> {
        self.iter()
            .filter(|row| row.get(key_column) == key)
            .map(|row| row.get(column))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()
    }
}
