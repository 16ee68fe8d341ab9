use crate::domain::model::{CellValue, Table};
use crate::domain::ports::RecordSource;
use crate::utils::error::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvLocation {
    File(PathBuf),
    Url(String),
}

/// A CSV export of the booking sheet, from disk or over HTTP.
pub struct CsvSource {
    location: CsvLocation,
    client: Client,
    timeout: Option<Duration>,
}

impl CsvSource {
    pub fn new(location: CsvLocation) -> Self {
        Self {
            location,
            client: Client::new(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn read_bytes(&self) -> Result<Vec<u8>> {
        match &self.location {
            CsvLocation::File(path) => tokio::fs::read(path)
                .await
                .map_err(|e| DashboardError::source_access(self.describe(), e.to_string())),
            CsvLocation::Url(url) => {
                let mut request = self.client.get(url);
                if let Some(timeout) = self.timeout {
                    request = request.timeout(timeout);
                }

                let response = request
                    .send()
                    .await
                    .map_err(|e| DashboardError::source_access(self.describe(), e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(DashboardError::source_access(
                        self.describe(),
                        format!("HTTP {}", status),
                    ));
                }

                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

fn parse_field(raw: &str) -> CellValue {
    if raw.is_empty() {
        return CellValue::Empty;
    }
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(raw.to_string()),
    }
}

/// First record is the header. Numeric-looking fields become numbers.
pub fn parse_csv(data: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let columns = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(columns);

    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(parse_field).collect());
    }

    Ok(table)
}

#[async_trait]
impl RecordSource for CsvSource {
    fn describe(&self) -> String {
        match &self.location {
            CsvLocation::File(path) => format!("CSV file {}", path.display()),
            CsvLocation::Url(url) => format!("CSV export {}", url),
        }
    }

    async fn fetch(&self) -> Result<Table> {
        let data = self.read_bytes().await?;
        tracing::debug!("Read {} bytes from {}", data.len(), self.describe());
        parse_csv(&data)
    }
}
