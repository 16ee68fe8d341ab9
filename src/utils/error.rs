use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Cannot reach record source {source_name}: {message}")]
    SourceAccessError {
        source_name: String,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Spreadsheet export failed: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Source,
    Configuration,
    Processing,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashboardError {
    pub fn source_access(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceAccessError {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceAccessError { .. } | Self::ApiError(_) => ErrorCategory::Source,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::ProcessingError { .. }
            | Self::ValidationError { .. } => ErrorCategory::Processing,
            Self::IoError(_) | Self::XlsxError(_) | Self::ZipError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 來源暫時無法連線，下一次刷新可能恢復
            Self::SourceAccessError { .. } | Self::ApiError(_) => ErrorSeverity::Medium,
            Self::ValidationError { .. } | Self::ProcessingError { .. } | Self::CsvError(_) => {
                ErrorSeverity::High
            }
            Self::SerializationError(_) | Self::XlsxError(_) | Self::ZipError(_) => {
                ErrorSeverity::High
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Source => {
                "Check the credentials, the spreadsheet ID and that the worksheet is shared with this account"
            }
            ErrorCategory::Configuration => {
                "Fix the configuration file or the command line options and run again"
            }
            ErrorCategory::Processing => {
                "Inspect the source sheet for malformed rows or a wrong filter selection"
            }
            ErrorCategory::Output => {
                "Make sure the output directory exists and is writable"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::SourceAccessError { source_name, .. } => {
                format!("Could not load booking data from {}", source_name)
            }
            Self::ApiError(_) => "Could not connect to the booking spreadsheet".to_string(),
            Self::MissingConfigError { field } => {
                format!("Configuration is missing '{}'", field)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
