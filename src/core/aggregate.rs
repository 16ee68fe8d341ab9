use crate::domain::model::{BookingSummary, ClassifiedTable, GroupAggregate};

pub const DEFAULT_GROUP_FIELD: &str = "Hostel";

pub fn summarize(table: &ClassifiedTable) -> BookingSummary {
    let total_rooms = table.len();
    let booked_rooms = table.booked_count();

    BookingSummary {
        total_rooms,
        booked_rooms,
        available_rooms: total_rooms - booked_rooms,
    }
}

/// Booked count per value of `group_field`.
///
/// Rows with a blank group value are left out of the aggregate (they still
/// count towards [`summarize`]). Returns an empty aggregate when the table
/// has no such column.
pub fn group_bookings(table: &ClassifiedTable, group_field: &str) -> GroupAggregate {
    let mut groups = GroupAggregate::new();

    let Some(index) = table.table().column_index(group_field) else {
        return groups;
    };

    for (row, booked) in table.iter() {
        match row.get(index) {
            Some(value) if !value.is_blank() => groups.record(&value.as_text(), booked),
            _ => {}
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::{classify, ClassifySettings};
    use crate::domain::model::{CellValue, Table};

    fn classified(columns: &[&str], rows: Vec<Vec<CellValue>>) -> ClassifiedTable {
        let table = Table::from_rows(columns.iter().map(|c| c.to_string()).collect(), rows);
        classify(table, &ClassifySettings::default())
    }

    #[test]
    fn test_hostel_scenario() {
        let table = classified(
            &["Hostel", "Status"],
            vec![
                vec!["A".into(), "BOOKED".into()],
                vec!["A".into(), "free".into()],
                vec!["B".into(), "booked".into()],
            ],
        );

        let summary = summarize(&table);
        assert_eq!(
            summary,
            BookingSummary {
                total_rooms: 3,
                booked_rooms: 2,
                available_rooms: 1,
            }
        );

        let groups = group_bookings(&table, DEFAULT_GROUP_FIELD);
        assert_eq!(groups.iter().collect::<Vec<_>>(), vec![("A", 1), ("B", 1)]);
        assert_eq!(groups.total(), summary.booked_rooms);
    }

    #[test]
    fn test_empty_table() {
        let table = classified(&["Hostel", "Status"], vec![]);

        assert_eq!(summarize(&table), BookingSummary::default());
        assert!(group_bookings(&table, DEFAULT_GROUP_FIELD).is_empty());
    }

    #[test]
    fn test_missing_group_field_yields_empty_aggregate() {
        let table = classified(
            &["Room", "Status"],
            vec![vec![101i64.into(), "Booked".into()]],
        );

        assert_eq!(summarize(&table).booked_rooms, 1);
        assert!(group_bookings(&table, DEFAULT_GROUP_FIELD).is_empty());
    }

    #[test]
    fn test_blank_group_values_are_excluded_from_groups_only() {
        let table = classified(
            &["Hostel", "Status"],
            vec![
                vec!["A".into(), "Booked".into()],
                vec![CellValue::Empty, "Booked".into()],
                vec!["  ".into(), "free".into()],
                vec!["C".into(), "free".into()],
            ],
        );

        let summary = summarize(&table);
        let groups = group_bookings(&table, DEFAULT_GROUP_FIELD);

        assert_eq!(summary.total_rooms, 4);
        assert_eq!(summary.booked_rooms, 2);
        assert_eq!(groups.iter().collect::<Vec<_>>(), vec![("A", 1), ("C", 0)]);
        // 被排除的列中有一筆已預訂
        assert_eq!(groups.total(), summary.booked_rooms - 1);
    }

    #[test]
    fn test_groups_sorted_lexicographically() {
        let table = classified(
            &["Hostel", "Status"],
            vec![
                vec!["J".into(), "booked".into()],
                vec![10i64.into(), "booked".into()],
                vec!["A".into(), "free".into()],
                vec![9i64.into(), "booked".into()],
            ],
        );

        let groups = group_bookings(&table, DEFAULT_GROUP_FIELD);
        assert_eq!(groups.groups().collect::<Vec<_>>(), vec!["10", "9", "A", "J"]);
    }

    #[test]
    fn test_counts_always_balance() {
        let statuses = ["booked", "free", "", "BOOKED till Friday", "vacant", "42"];
        let rows = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| vec![CellValue::from(i as i64), CellValue::from(*s)])
            .collect();
        let table = classified(&["Room", "Status"], rows);

        let summary = summarize(&table);
        assert_eq!(summary.available_rooms + summary.booked_rooms, summary.total_rooms);
        assert_eq!(summary.booked_rooms, 2);
    }
}
