use crate::config::credentials::CredentialsConfig;
use crate::core::aggregate::DEFAULT_GROUP_FIELD;
use crate::core::classify::{DEFAULT_BOOKED_COLUMN, DEFAULT_MARKER};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
pub const SUPPORTED_OUTPUT_FORMATS: [&str; 3] = ["xlsx", "csv", "json"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub dashboard: DashboardSection,
    pub source: SourceConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSection {
    pub title: String,
    pub group_field: String,
    pub booked_column: String,
    pub marker: String,
    pub export_prefix: String,
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            title: "Guest Room Dashboard".to_string(),
            group_field: DEFAULT_GROUP_FIELD.to_string(),
            booked_column: DEFAULT_BOOKED_COLUMN.to_string(),
            marker: DEFAULT_MARKER.to_string(),
            export_prefix: "guest_rooms".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    GoogleSheets,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// Spreadsheet ID or its full docs.google.com URL.
    pub spreadsheet: Option<String>,
    pub worksheet: Option<String>,
    pub api_base: Option<String>,
    /// Local CSV file.
    pub path: Option<String>,
    /// CSV over HTTP, e.g. a published sheet export link.
    pub url: Option<String>,
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    pub interval_seconds: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

fn default_output_path() -> String {
    "./output".to_string()
}

fn default_output_formats() -> Vec<String> {
    vec!["xlsx".to_string()]
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            output_formats: default_output_formats(),
            compression: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

impl DashboardConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DashboardError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SHEET_ID})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| DashboardError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        let dashboard = &self.dashboard;
        validation::validate_non_empty_string("dashboard.group_field", &dashboard.group_field)?;
        validation::validate_non_empty_string("dashboard.booked_column", &dashboard.booked_column)?;
        validation::validate_non_empty_string("dashboard.marker", &dashboard.marker)?;
        validation::validate_non_empty_string("dashboard.export_prefix", &dashboard.export_prefix)?;

        self.validate_source()?;

        validation::validate_positive_number(
            "refresh.interval_seconds",
            self.refresh.interval_seconds,
            1,
        )?;

        validation::validate_path("load.output_path", &self.load.output_path)?;
        if self.load.output_formats.is_empty() {
            return Err(DashboardError::InvalidConfigValueError {
                field: "load.output_formats".to_string(),
                value: "[]".to_string(),
                reason: "At least one output format is required".to_string(),
            });
        }
        validation::validate_choices(
            "load.output_formats",
            &self.load.output_formats,
            &SUPPORTED_OUTPUT_FORMATS,
        )?;
        if let Some(compression) = &self.load.compression {
            validation::validate_non_empty_string(
                "load.compression.filename",
                &compression.filename,
            )?;
        }

        Ok(())
    }

    fn validate_source(&self) -> Result<()> {
        let source = &self.source;

        if let Some(timeout) = source.timeout_seconds {
            validation::validate_range("source.timeout_seconds", timeout, 1, 300)?;
        }
        source.credentials.validate()?;

        match source.kind {
            SourceKind::GoogleSheets => {
                let spreadsheet =
                    validation::validate_required_field("source.spreadsheet", &source.spreadsheet)?;
                validation::validate_non_empty_string("source.spreadsheet", spreadsheet)?;
                let worksheet =
                    validation::validate_required_field("source.worksheet", &source.worksheet)?;
                validation::validate_non_empty_string("source.worksheet", worksheet)?;
                if let Some(api_base) = &source.api_base {
                    validation::validate_url("source.api_base", api_base)?;
                }
            }
            SourceKind::Csv => match (&source.path, &source.url) {
                (Some(path), None) => validation::validate_path("source.path", path)?,
                (None, Some(url)) => validation::validate_url("source.url", url)?,
                (None, None) => {
                    return Err(DashboardError::MissingConfigError {
                        field: "source.path or source.url".to_string(),
                    })
                }
                (Some(_), Some(_)) => {
                    return Err(DashboardError::ConfigError {
                        message: "set either source.path or source.url, not both".to_string(),
                    })
                }
            },
        }

        Ok(())
    }

    pub fn api_base(&self) -> &str {
        self.source
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_SHEETS_API_BASE)
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh.interval_seconds)
    }
}

impl ConfigProvider for DashboardConfig {
    fn title(&self) -> &str {
        &self.dashboard.title
    }

    fn group_field(&self) -> &str {
        &self.dashboard.group_field
    }

    fn booked_column(&self) -> &str {
        &self.dashboard.booked_column
    }

    fn marker(&self) -> &str {
        &self.dashboard.marker
    }

    fn export_prefix(&self) -> &str {
        &self.dashboard.export_prefix
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn bundle_name(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }
}

impl Validate for DashboardConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
