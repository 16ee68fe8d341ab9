use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// A raw spreadsheet value. Column sets are only known at runtime, so rows
/// carry tagged values instead of typed fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Text form used for classification, grouping and display.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Empty => Cow::Borrowed(""),
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
            CellValue::Number(n) => Cow::Owned(format_number(*n)),
            CellValue::Bool(true) => Cow::Borrowed("True"),
            CellValue::Bool(false) => Cow::Borrowed("False"),
        }
    }

    /// Empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

fn format_number(n: f64) -> String {
    // 整數值不顯示小數點，與試算表的呈現一致
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::Bool(b) => CellValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => CellValue::Number(f),
                None => CellValue::Text(n.to_string()),
            },
            serde_json::Value::String(s) => CellValue::Text(s),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub cells: Vec<CellValue>,
}

impl Row {
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// Ordered columns plus rows. Every row holds exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut table = Self::new(columns);
        for cells in rows {
            table.push_row(cells);
        }
        table
    }

    /// Short rows are padded with `Empty`, long rows are cut to the header width.
    pub fn push_row(&mut self, mut cells: Vec<CellValue>) {
        cells.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(Row { cells });
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    pub fn map_columns<F>(mut self, f: F) -> Self
    where
        F: FnMut(&String) -> String,
    {
        self.columns = self.columns.iter().map(f).collect();
        self
    }

    /// Replaces the first column called `name`, or appends it.
    pub(crate) fn set_column(&mut self, name: &str, values: Vec<CellValue>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.cells[index] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.cells.push(value);
                }
            }
        }
    }
}

/// A table with its booking flag, one entry per row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassifiedTable {
    table: Table,
    flags: Vec<bool>,
}

impl ClassifiedTable {
    pub(crate) fn new(table: Table, flags: Vec<bool>) -> Self {
        debug_assert_eq!(table.len(), flags.len());
        Self { table, flags }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Row, bool)> {
        self.table.rows().iter().zip(self.flags.iter().copied())
    }

    pub fn booked_count(&self) -> usize {
        self.flags.iter().filter(|&&booked| booked).count()
    }

    /// Keeps the rows matching `keep`, columns untouched.
    pub fn filtered<F>(&self, mut keep: F) -> ClassifiedTable
    where
        F: FnMut(&Row) -> bool,
    {
        let mut table = Table::new(self.table.columns().to_vec());
        let mut flags = Vec::new();
        for (row, booked) in self.iter() {
            if keep(row) {
                table.rows.push(row.clone());
                flags.push(booked);
            }
        }
        ClassifiedTable { table, flags }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookingSummary {
    pub total_rooms: usize,
    pub booked_rooms: usize,
    pub available_rooms: usize,
}

/// Booked rooms per group value, ordered by group value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupAggregate(BTreeMap<String, usize>);

impl GroupAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, group: &str, booked: bool) {
        let count = self.0.entry(group.to_string()).or_insert(0);
        if booked {
            *count += 1;
        }
    }

    pub fn get(&self, group: &str) -> Option<usize> {
        self.0.get(group).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

/// Selection of the table filter: everything, or one group value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupFilter {
    #[default]
    All,
    Group(String),
}

impl GroupFilter {
    pub const ALL_LABEL: &'static str = "All";

    /// Blank or the `All` label selects everything. Anything else is kept
    /// verbatim; [`crate::core::filter::resolve_selection`] matches it against
    /// the offered options once the data is known.
    pub fn from_selection(selection: &str) -> Self {
        let trimmed = selection.trim();
        if trimmed.is_empty() || trimmed == Self::ALL_LABEL {
            GroupFilter::All
        } else {
            GroupFilter::Group(selection.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            GroupFilter::All => Self::ALL_LABEL,
            GroupFilter::Group(value) => value,
        }
    }
}

impl fmt::Display for GroupFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything one run hands to presentation and export.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub title: String,
    pub source: String,
    pub group_field: String,
    pub grouping_available: bool,
    pub summary: BookingSummary,
    pub groups: GroupAggregate,
    pub selection: GroupFilter,
    /// Group values offered by the filter, without the leading `All`.
    pub filter_options: Vec<String>,
    pub view: ClassifiedTable,
    pub refreshed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_representation() {
        assert_eq!(CellValue::Empty.as_text(), "");
        assert_eq!(CellValue::from(42i64).as_text(), "42");
        assert_eq!(CellValue::from(2.5).as_text(), "2.5");
        assert_eq!(CellValue::from(true).as_text(), "True");
        assert_eq!(CellValue::from("Booked").as_text(), "Booked");
    }

    #[test]
    fn test_cell_from_json() {
        assert_eq!(CellValue::from(serde_json::json!(null)), CellValue::Empty);
        assert_eq!(CellValue::from(serde_json::json!(101)), CellValue::Number(101.0));
        assert_eq!(CellValue::from(serde_json::json!("A")), CellValue::from("A"));
        assert_eq!(CellValue::from(serde_json::json!(false)), CellValue::Bool(false));
    }

    #[test]
    fn test_push_row_pads_and_truncates() {
        let mut table = Table::new(vec!["Hostel".into(), "Room".into(), "Status".into()]);
        table.push_row(vec!["A".into()]);
        table.push_row(vec!["B".into(), 2i64.into(), "free".into(), "extra".into()]);

        assert_eq!(table.rows()[0].cells.len(), 3);
        assert_eq!(table.rows()[0].cells[2], CellValue::Empty);
        assert_eq!(table.rows()[1].cells.len(), 3);
        assert_eq!(table.value(1, "Status"), Some(&CellValue::from("free")));
    }

    #[test]
    fn test_set_column_replaces_existing() {
        let mut table = Table::from_rows(
            vec!["Room".into(), "Booked".into()],
            vec![vec![1i64.into(), "yes".into()]],
        );
        table.set_column("Booked", vec![CellValue::Bool(true)]);
        assert_eq!(table.columns().len(), 2);
        assert_eq!(table.value(0, "Booked"), Some(&CellValue::Bool(true)));

        table.set_column("Hostel", vec!["A".into()]);
        assert_eq!(table.columns(), &["Room", "Booked", "Hostel"]);
    }

    #[test]
    fn test_group_filter_selection() {
        assert_eq!(GroupFilter::from_selection(" All "), GroupFilter::All);
        assert_eq!(GroupFilter::from_selection("  "), GroupFilter::All);
        assert_eq!(
            GroupFilter::from_selection("all"),
            GroupFilter::Group("all".to_string())
        );
        assert_eq!(
            GroupFilter::from_selection(" Hostel A "),
            GroupFilter::Group(" Hostel A ".to_string())
        );
        assert_eq!(GroupFilter::All.to_string(), "All");
    }
}
