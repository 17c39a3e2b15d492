use crate::domain::model::InvalidGroupError;
use crate::record::DecodeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Record decode error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("Invalid household group: {0}")]
    InvalidGroupError(#[from] InvalidGroupError),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 檔案、壓縮、序列化等 I/O 問題
    Io,
    /// 資料與 schema 不符
    Data,
    /// 設定錯誤
    Configuration,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ZipError(_) | EtlError::IoError(_) | EtlError::SerializationError(_) => {
                ErrorCategory::Io
            }
            EtlError::CsvError(_)
            | EtlError::DecodeError(_)
            | EtlError::InvalidGroupError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    /// 本 crate 的錯誤都不可重試，必須從資料來源修正
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("Could not read or write pipeline files: {}", self),
            ErrorCategory::Data => format!("Input data does not match the household schema: {}", self),
            ErrorCategory::Configuration => format!("Configuration is invalid: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::DecodeError(_) | EtlError::CsvError(_) => {
                "Check that input columns are first_name,last_name,age,street,house_number,city and that age/house_number are integers"
            }
            EtlError::InvalidGroupError(_) => {
                "Make sure every externally collected group has at least one member"
            }
            EtlError::ProcessingError { .. } => "Inspect the input rows reported in the log",
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Fix the configuration file or command line flags and run again"
            }
            EtlError::ZipError(_) | EtlError::IoError(_) | EtlError::SerializationError(_) => {
                "Check that the input file exists and the output path is writable"
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Data => 1,
            ErrorCategory::Configuration => 2,
            ErrorCategory::Io => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
