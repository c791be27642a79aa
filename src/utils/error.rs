use thiserror::Error;

/// Failure to reach or write the durable store. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PersistError {
    pub message: String,
}

impl PersistError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Failed to load input '{path}': {message}")]
    InputLoadError { path: String, message: String },

    #[error("Input is missing required column '{column}'")]
    MissingColumnError { column: String },

    #[error("Persistence error: {0}")]
    PersistError(#[from] PersistError),

    #[error("Dispatch error: {message}")]
    DispatchError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Storage,
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
    pub fn input_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputLoadError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_)
            | Self::IoError(_)
            | Self::InputLoadError { .. }
            | Self::MissingColumnError { .. } => ErrorCategory::Input,
            Self::PersistError(_) => ErrorCategory::Storage,
            Self::SerializationError(_) | Self::DispatchError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DispatchError { .. } => ErrorSeverity::Low,
            Self::PersistError(_) => ErrorSeverity::Medium,
            Self::SerializationError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check ETL_CONFIG and the ETL_* environment variables"
            }
            ErrorCategory::Input => {
                "Make sure the input CSV exists and has a header row with name, age and city"
            }
            ErrorCategory::Storage => "Check store credentials, region and table name",
            ErrorCategory::Processing => "Re-run the batch; report the issue if it persists",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InputLoadError { path, .. } => format!("Could not read input file {}", path),
            Self::MissingColumnError { column } => {
                format!("Input file has no '{}' column", column)
            }
            Self::MissingConfigError { field } => format!("Missing setting: {}", field),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting {}: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
