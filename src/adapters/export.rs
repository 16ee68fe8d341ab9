//! Serializers for the filtered booking view.
//!
//! Every artifact carries exactly the rows and columns shown in the
//! dashboard table, `Booked` column included.

use crate::domain::model::{
    BookingSummary, CellValue, ClassifiedTable, Dashboard, GroupAggregate, GroupFilter,
};
use crate::utils::error::{DashboardError, Result};
use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const SHEET_NAME: &str = "Bookings";
const MAX_XLSX_COLUMNS: usize = 16_384;

/// Lowercased filter label, safe for file names: `"Hostel A"` → `"hostel_a"`.
/// Anything outside `[a-z0-9_-]` becomes `_`.
pub fn filter_token(selection: &GroupFilter) -> String {
    selection
        .label()
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn export_file_name(prefix: &str, selection: &GroupFilter, extension: &str) -> String {
    format!("{}_{}.{}", prefix, filter_token(selection), extension)
}

pub fn to_xlsx(view: &ClassifiedTable) -> Result<Vec<u8>> {
    let table = view.table();
    if table.columns().len() > MAX_XLSX_COLUMNS {
        return Err(DashboardError::ProcessingError {
            message: format!(
                "{} columns do not fit in one worksheet",
                table.columns().len()
            ),
        });
    }

    let mut workbook = Workbook::new();
    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        let header = Format::new().set_bold();
        for (col, name) in table.columns().iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, name, &header)?;
        }

        for (index, row) in table.rows().iter().enumerate() {
            let r = (index + 1) as u32;
            for (col, cell) in row.cells.iter().enumerate() {
                let c = col as u16;
                match cell {
                    CellValue::Empty => {}
                    CellValue::Text(text) => {
                        worksheet.write_string(r, c, text)?;
                    }
                    CellValue::Number(n) => {
                        worksheet.write_number(r, c, *n)?;
                    }
                    CellValue::Bool(b) => {
                        worksheet.write_boolean(r, c, *b)?;
                    }
                }
            }
        }

        worksheet.set_freeze_panes(1, 0)?;
        worksheet.autofit();
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn to_csv(view: &ClassifiedTable) -> Result<Vec<u8>> {
    let table = view.table();
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.cells.iter().map(|cell| cell.as_text().into_owned()))?;
    }

    writer
        .into_inner()
        .map_err(|e| DashboardError::IoError(e.into_error()))
}

#[derive(Debug, Serialize)]
struct SummaryDocument<'a> {
    title: &'a str,
    source: &'a str,
    generated_at: DateTime<Utc>,
    filter: &'a str,
    rows_exported: usize,
    #[serde(flatten)]
    summary: BookingSummary,
    group_field: &'a str,
    bookings_per_group: &'a GroupAggregate,
}

pub fn summary_json(dashboard: &Dashboard) -> Result<Vec<u8>> {
    let document = SummaryDocument {
        title: &dashboard.title,
        source: &dashboard.source,
        generated_at: dashboard.refreshed_at,
        filter: dashboard.selection.label(),
        rows_exported: dashboard.view.len(),
        summary: dashboard.summary,
        group_field: &dashboard.group_field,
        bookings_per_group: &dashboard.groups,
    };
    Ok(serde_json::to_vec_pretty(&document)?)
}

/// Packs `(name, bytes)` pairs into one ZIP archive.
pub fn bundle(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for (name, data) in files {
        zip.start_file(name.as_str(), SimpleFileOptions::default())?;
        zip.write_all(data)?;
    }

    // 完成並取回底層 Vec<u8>
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::{classify, ClassifySettings};
    use crate::domain::model::Table;
    use calamine::{Data, Reader, Xlsx};
    use std::io::{Cursor, Read};

    fn view() -> ClassifiedTable {
        let table = Table::from_rows(
            vec!["Hostel".into(), "Room".into(), "Status".into()],
            vec![
                vec!["A".into(), 101i64.into(), "BOOKED".into()],
                vec!["A".into(), 102i64.into(), CellValue::Empty],
            ],
        );
        classify(table, &ClassifySettings::default())
    }

    #[test]
    fn test_export_file_name_embeds_lowercase_filter() {
        assert_eq!(
            export_file_name("guest_rooms", &GroupFilter::All, "xlsx"),
            "guest_rooms_all.xlsx"
        );
        assert_eq!(
            export_file_name("guest_rooms", &GroupFilter::Group("Hostel A/B".into()), "csv"),
            "guest_rooms_hostel_a_b.csv"
        );
        assert_eq!(
            export_file_name("guest_rooms", &GroupFilter::Group("Hôstel Ä".into()), "xlsx"),
            "guest_rooms_h_stel__.xlsx"
        );
    }

    #[test]
    fn test_xlsx_matches_visible_table() {
        let bytes = to_xlsx(&view()).unwrap();

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        let rows: Vec<_> = range.rows().collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            &[
                Data::String("Hostel".into()),
                Data::String("Room".into()),
                Data::String("Status".into()),
                Data::String("Booked".into()),
            ]
        );
        assert_eq!(rows[1][1], Data::Float(101.0));
        assert_eq!(rows[1][3], Data::Bool(true));
        assert_eq!(rows[2][2], Data::Empty);
        assert_eq!(rows[2][3], Data::Bool(false));
    }

    #[test]
    fn test_csv_matches_visible_table() {
        let bytes = to_csv(&view()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(
            text,
            "Hostel,Room,Status,Booked\nA,101,BOOKED,True\nA,102,,False\n"
        );
    }

    #[test]
    fn test_bundle_contains_every_file() {
        let files = vec![
            ("a.csv".to_string(), b"x,y\n".to_vec()),
            ("a.json".to_string(), b"{}".to_vec()),
        ];

        let bytes = bundle(&files).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name("a.csv")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "x,y\n");
    }
}
