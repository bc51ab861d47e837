use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Store API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Store operation failed: {message}")]
    StoreError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

impl ImportError {
    /// 給終端使用者看的錯誤訊息,不帶內部細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(_) | Self::StoreError { .. } => {
                "Could not reach the case management store".to_string()
            }
            Self::CsvError(_) => "The rejects file could not be written".to_string(),
            Self::IoError(_) => "A file could not be read or written".to_string(),
            Self::SerializationError(_) => "The report could not be serialized".to_string(),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            Self::MissingConfigError { field } => format!("Missing setting '{}'", field),
            Self::ProcessingError { message } => format!("The roster could not be processed: {}", message),
        }
    }

    /// 建議的處理方式
    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ApiError(_) | Self::StoreError { .. } => {
                "Check the store base URL and your network connection".to_string()
            }
            Self::IoError(_) => "Check the file path and permissions".to_string(),
            Self::CsvError(_) | Self::SerializationError(_) => {
                "Check that the output path is writable".to_string()
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Review the firm profile and command-line flags".to_string()
            }
            Self::ProcessingError { .. } => {
                "Check that the file is a CSV export with a header row".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
