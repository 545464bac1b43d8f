use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Places API returned {status}: {message}")]
    PlacesApiError { status: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Provider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl LeadError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LeadError::HttpError(_) => ErrorCategory::Network,
            LeadError::CsvError(_) | LeadError::IoError(_) => ErrorCategory::Storage,
            LeadError::SerializationError(_) | LeadError::PlacesApiError { .. } => {
                ErrorCategory::Provider
            }
            LeadError::ConfigError { .. }
            | LeadError::MissingConfigError { .. }
            | LeadError::InvalidConfigValueError { .. }
            | LeadError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LeadError::HttpError(_) | LeadError::PlacesApiError { .. } => ErrorSeverity::Medium,
            LeadError::SerializationError(_)
            | LeadError::ConfigError { .. }
            | LeadError::MissingConfigError { .. }
            | LeadError::InvalidConfigValueError { .. }
            | LeadError::ConfigValidationError { .. } => ErrorSeverity::High,
            LeadError::CsvError(_) | LeadError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LeadError::HttpError(_) => {
                "Check your network connection and try again".to_string()
            }
            LeadError::CsvError(_) | LeadError::IoError(_) => {
                "Check that the output file is writable and not open in another program".to_string()
            }
            LeadError::SerializationError(_) => {
                "The provider returned an unexpected response; try again later".to_string()
            }
            LeadError::MissingConfigError { field } => {
                format!("Set {} in your environment, .env file or config file", field)
            }
            LeadError::ConfigError { .. }
            | LeadError::InvalidConfigValueError { .. }
            | LeadError::ConfigValidationError { .. } => {
                "Review the command-line flags and config file values".to_string()
            }
            LeadError::PlacesApiError { status, .. } => match status.as_str() {
                "REQUEST_DENIED" => "Verify GOOGLE_PLACES_API_KEY and that the Places API is enabled".to_string(),
                "OVER_QUERY_LIMIT" => "Places quota is exhausted; wait for it to reset or raise the limit".to_string(),
                _ => "Try a different search query".to_string(),
            },
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LeadError::HttpError(e) if e.is_timeout() => "A request timed out".to_string(),
            LeadError::HttpError(_) => "Could not reach the provider".to_string(),
            LeadError::CsvError(_) | LeadError::IoError(_) => {
                format!("Could not read or write the output file: {}", self)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LeadError>;
