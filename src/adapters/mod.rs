// Adapters layer: concrete implementations for record sources, storage and output.

pub mod csv_source;
pub mod export;
pub mod render;
pub mod sheets;
pub mod storage;

use crate::config::toml_config::{DashboardConfig, SourceKind};
use crate::domain::ports::RecordSource;
use crate::utils::error::{DashboardError, Result};
use csv_source::{CsvLocation, CsvSource};
use sheets::SheetsSource;
use std::time::Duration;

/// Builds the record source named by `[source]`.
pub fn build_source(config: &DashboardConfig) -> Result<Box<dyn RecordSource>> {
    let source = &config.source;
    let timeout = source.timeout_seconds.map(Duration::from_secs);

    match source.kind {
        SourceKind::GoogleSheets => {
            let spreadsheet = source.spreadsheet.as_deref().ok_or_else(|| {
                DashboardError::MissingConfigError {
                    field: "source.spreadsheet".to_string(),
                }
            })?;
            let worksheet = source.worksheet.as_deref().ok_or_else(|| {
                DashboardError::MissingConfigError {
                    field: "source.worksheet".to_string(),
                }
            })?;

            let mut sheets = SheetsSource::new(
                config.api_base(),
                spreadsheet,
                worksheet,
                source.credentials.clone(),
            )?;
            if let Some(timeout) = timeout {
                sheets = sheets.with_timeout(timeout);
            }
            Ok(Box::new(sheets))
        }
        SourceKind::Csv => {
            let location = match (&source.path, &source.url) {
                (Some(path), _) => CsvLocation::File(path.into()),
                (None, Some(url)) => CsvLocation::Url(url.clone()),
                (None, None) => {
                    return Err(DashboardError::MissingConfigError {
                        field: "source.path or source.url".to_string(),
                    })
                }
            };

            let mut csv = CsvSource::new(location);
            if let Some(timeout) = timeout {
                csv = csv.with_timeout(timeout);
            }
            Ok(Box::new(csv))
        }
    }
}
