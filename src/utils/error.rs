use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// 輸入不合法或邏輯不一致，計算前就會被擋下
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Start date {start} is after end date {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("Unrecognized weekday label: {label}")]
    UnknownWeekday { label: String },

    #[error("Required field is missing: {field}")]
    MissingField { field: String },

    #[error("{field} must be above 0 (got {value})")]
    NonPositive { field: String, value: u32 },
}

/// 單筆來源資料格式錯誤；該筆被拒絕，其餘照常處理
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Malformed record {record}: {reason}")]
pub struct DataError {
    pub record: String,
    pub reason: String,
}

impl DataError {
    pub fn new(record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Snapshot request to {endpoint} returned HTTP {status}")]
    HttpStatusError { endpoint: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Data error: {0}")]
    DataError(#[from] DataError),

    #[error("No data available for the selected date range")]
    EmptyRange,

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Input,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => ErrorCategory::Network,
            EtlError::ZipError(_) | EtlError::IoError(_) => ErrorCategory::Storage,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::ValidationError(_)
            | EtlError::DataError(_)
            | EtlError::SerializationError(_) => ErrorCategory::Input,
            EtlError::CsvError(_) | EtlError::EmptyRange | EtlError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::EmptyRange => ErrorSeverity::Low,
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => ErrorSeverity::Medium,
            EtlError::ZipError(_) | EtlError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the snapshot URL, the auth parameter and network connectivity, then retry",
            ErrorCategory::Storage => "Check that the output directory exists and is writable",
            ErrorCategory::Configuration => "Fix the configuration value named in the message and run again",
            ErrorCategory::Input => "Inspect the source snapshot; the offending record or field is named in the message",
            ErrorCategory::Processing => "Widen the date range or check the patient/exercise filter",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ValidationError(e) => e.to_string(),
            EtlError::EmptyRange => self.to_string(),
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration '{}' is invalid: {}", field, reason)
            }
            EtlError::MissingConfigError { field } => {
                format!("Configuration '{}' is required", field)
            }
            EtlError::HttpStatusError { status, .. } => {
                format!("Could not download the snapshot (HTTP {})", status)
            }
            other => format!("{:?} failure: {}", other.category(), other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
