use crate::domain::model::{CellValue, ClassifiedTable, Table};

pub const DEFAULT_MARKER: &str = "BOOKED";
pub const DEFAULT_BOOKED_COLUMN: &str = "Booked";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifySettings {
    /// Matched against uppercased cell text; stored uppercase.
    pub marker: String,
    /// Name of the flag column added to the table.
    pub booked_column: String,
}

impl ClassifySettings {
    pub fn new(marker: &str, booked_column: &str) -> Self {
        Self {
            marker: marker.to_uppercase(),
            booked_column: booked_column.to_string(),
        }
    }
}

impl Default for ClassifySettings {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER, DEFAULT_BOOKED_COLUMN)
    }
}

/// True when any cell's uppercased text contains `marker`.
/// `marker` must already be uppercase.
pub fn is_booked<'a, I>(cells: I, marker: &str) -> bool
where
    I: IntoIterator<Item = &'a CellValue>,
{
    cells
        .into_iter()
        .any(|cell| cell.as_text().to_uppercase().contains(marker))
}

/// Flags every row and adds the flag as a boolean column.
pub fn classify(table: Table, settings: &ClassifySettings) -> ClassifiedTable {
    let flags: Vec<bool> = table
        .rows()
        .iter()
        .map(|row| is_booked(&row.cells, &settings.marker))
        .collect();

    let mut table = table;
    table.set_column(
        &settings.booked_column,
        flags.iter().map(|&booked| CellValue::Bool(booked)).collect(),
    );

    tracing::debug!(
        "Classified {} rows, {} booked",
        flags.len(),
        flags.iter().filter(|&&b| b).count()
    );

    ClassifiedTable::new(table, flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: Vec<CellValue>) -> Vec<CellValue> {
        values
    }

    #[test]
    fn test_marker_is_case_insensitive() {
        assert!(is_booked(&cells(vec!["BOOKED".into()]), DEFAULT_MARKER));
        assert!(is_booked(&cells(vec!["booked".into()]), DEFAULT_MARKER));
        assert!(is_booked(&cells(vec!["Pre-Booked by warden".into()]), DEFAULT_MARKER));
        assert!(!is_booked(&cells(vec!["free".into()]), DEFAULT_MARKER));
    }

    #[test]
    fn test_marker_is_whitespace_sensitive() {
        assert!(!is_booked(&cells(vec!["BOOK ED".into()]), DEFAULT_MARKER));
    }

    #[test]
    fn test_any_cell_may_carry_the_marker() {
        let row = cells(vec!["A".into(), 12i64.into(), "Booked".into()]);
        assert!(is_booked(&row, DEFAULT_MARKER));
    }

    #[test]
    fn test_empty_and_numeric_rows_are_not_booked() {
        assert!(!is_booked(&Vec::<CellValue>::new(), DEFAULT_MARKER));
        assert!(!is_booked(&cells(vec![CellValue::Empty, "".into()]), DEFAULT_MARKER));
        assert!(!is_booked(&cells(vec![42i64.into()]), DEFAULT_MARKER));
    }

    #[test]
    fn test_classify_adds_flag_column() {
        let table = Table::from_rows(
            vec!["Hostel".into(), "Status".into()],
            vec![
                vec!["A".into(), "BOOKED".into()],
                vec!["A".into(), "free".into()],
                vec!["B".into(), "booked".into()],
            ],
        );

        let classified = classify(table, &ClassifySettings::default());

        assert_eq!(classified.flags(), &[true, false, true]);
        assert_eq!(classified.table().columns(), &["Hostel", "Status", "Booked"]);
        assert_eq!(classified.table().value(1, "Booked"), Some(&CellValue::Bool(false)));
        assert_eq!(classified.table().value(0, "Status"), Some(&CellValue::from("BOOKED")));
    }

    #[test]
    fn test_existing_flag_column_is_replaced() {
        let table = Table::from_rows(
            vec!["Room".into(), "Booked".into()],
            vec![vec![101i64.into(), "Booked".into()], vec![102i64.into(), "no".into()]],
        );

        let classified = classify(table, &ClassifySettings::default());

        assert_eq!(classified.table().columns().len(), 2);
        assert_eq!(classified.flags(), &[true, false]);
        assert_eq!(classified.table().value(0, "Booked"), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn test_custom_marker_is_uppercased() {
        let settings = ClassifySettings::new("reserved", "Taken");
        let table = Table::from_rows(vec!["Status".into()], vec![vec!["Reserved".into()]]);

        let classified = classify(table, &settings);

        assert_eq!(classified.flags(), &[true]);
        assert!(classified.table().has_column("Taken"));
    }
}
