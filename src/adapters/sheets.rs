use crate::config::credentials::CredentialsConfig;
use crate::domain::model::{CellValue, Table};
use crate::domain::ports::RecordSource;
use crate::utils::error::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Reads one worksheet through the Sheets v4 `values` endpoint.
/// The first row is the header, the rest are records.
pub struct SheetsSource {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    worksheet: String,
    credentials: CredentialsConfig,
    timeout: Option<Duration>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsSource {
    pub fn new(
        api_base: &str,
        spreadsheet: &str,
        worksheet: &str,
        credentials: CredentialsConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            api_base: api_base.to_string(),
            spreadsheet_id: spreadsheet_id(spreadsheet)?,
            worksheet: worksheet.to_string(),
            credentials,
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn values_url(&self) -> Result<Url> {
        let invalid = |reason: String| DashboardError::InvalidConfigValueError {
            field: "source.api_base".to_string(),
            value: self.api_base.clone(),
            reason,
        };

        let mut url = Url::parse(&self.api_base).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                self.worksheet.as_str(),
            ]);
        Ok(url)
    }
}

/// Accepts a bare spreadsheet ID or any docs.google.com spreadsheet URL.
pub fn spreadsheet_id(input: &str) -> Result<String> {
    let input = input.trim();
    let id_pattern = regex::Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)").map_err(|e| {
        DashboardError::ConfigError {
            message: format!("invalid spreadsheet pattern: {}", e),
        }
    })?;

    if let Some(caps) = id_pattern.captures(input) {
        return Ok(caps[1].to_string());
    }

    if !input.is_empty()
        && input
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Ok(input.to_string());
    }

    Err(DashboardError::InvalidConfigValueError {
        field: "source.spreadsheet".to_string(),
        value: input.to_string(),
        reason: "expected a spreadsheet ID or a docs.google.com/spreadsheets/d/<id> URL"
            .to_string(),
    })
}

/// Header row plus records; ragged rows are squared to the header width.
fn table_from_values(values: Vec<Vec<serde_json::Value>>) -> Table {
    let mut rows = values.into_iter();
    let Some(header) = rows.next() else {
        return Table::default();
    };

    let columns = header
        .into_iter()
        .map(|v| CellValue::from(v).as_text().into_owned())
        .collect();

    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row.into_iter().map(CellValue::from).collect());
    }
    table
}

#[async_trait]
impl RecordSource for SheetsSource {
    fn describe(&self) -> String {
        format!("Google Sheet {} / '{}'", self.spreadsheet_id, self.worksheet)
    }

    async fn fetch(&self) -> Result<Table> {
        let credential = self.credentials.resolve()?;
        let url = self.values_url()?;

        tracing::debug!(
            "Requesting {} ({})",
            url,
            self.credentials.describe()
        );

        let mut request = self
            .client
            .get(url)
            .query(&[("valueRenderOption", "UNFORMATTED_VALUE")]);
        request = credential.apply(request);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DashboardError::source_access(self.describe(), e.to_string()))?;

        let status = response.status();
        tracing::debug!("Sheets API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail: String = body.chars().take(200).collect();
            return Err(DashboardError::source_access(
                self.describe(),
                format!("HTTP {}: {}", status, detail.trim()),
            ));
        }

        let range: ValueRange = response.json().await?;
        Ok(table_from_values(range.values))
    }
}
