use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Unknown category: {key}")]
    UnknownCategory { key: String },

    #[error("Listing not found: {category}/{id}")]
    NotFound { category: String, id: String },

    #[error("Validation error: {message} ({})", fields.join(", "))]
    Validation { fields: Vec<String>, message: String },

    #[error("Price unavailable for listing {listing_id}: {reason}")]
    PriceUnresolvable { listing_id: String, reason: String },

    #[error("Store error for category {category}: {message}")]
    Store { category: String, message: String },

    #[error("Operation cancelled by caller")]
    Cancelled,

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Request,
    Data,
    Store,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CatalogError {
    pub fn validation(fields: Vec<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            fields,
            message: message.into(),
        }
    }

    pub fn store(category: &str, message: impl Into<String>) -> Self {
        Self::Store {
            category: category.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownCategory { .. }
            | Self::NotFound { .. }
            | Self::Validation { .. }
            | Self::Cancelled => ErrorCategory::Request,
            Self::PriceUnresolvable { .. } | Self::SerializationError(_) => ErrorCategory::Data,
            Self::Store { .. } | Self::ApiError(_) => ErrorCategory::Store,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cancelled => ErrorSeverity::Low,
            Self::NotFound { .. } | Self::Store { .. } | Self::ApiError(_) => ErrorSeverity::Medium,
            Self::UnknownCategory { .. }
            | Self::Validation { .. }
            | Self::PriceUnresolvable { .. }
            | Self::SerializationError(_) => ErrorSeverity::High,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Only transport-level failures are worth retrying. Everything else is
    /// a caller or data problem that a retry will reproduce.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store { .. } | Self::ApiError(_))
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::UnknownCategory { key } => format!("'{}' is not a known category", key),
            Self::NotFound { .. } => "The requested listing was not found".to_string(),
            Self::Validation { fields, .. } if !fields.is_empty() => {
                format!("Please fix the following fields: {}", fields.join(", "))
            }
            Self::Validation { message, .. } => message.clone(),
            Self::PriceUnresolvable { .. } => "Price unavailable".to_string(),
            Self::Store { category, .. } => {
                format!("Listings for '{}' are temporarily unavailable", category)
            }
            Self::Cancelled => "Request cancelled".to_string(),
            Self::ApiError(_) => "The listing service could not be reached".to_string(),
            Self::IoError(e) => format!("File access failed: {}", e),
            Self::SerializationError(_) => "Received malformed listing data".to_string(),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::MissingConfigError { field } => format!("Missing configuration: {}", field),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration for {}: {}", field, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Request => "Check the category key, listing id and request fields",
            ErrorCategory::Data => "Inspect the listing document in the backing store",
            ErrorCategory::Store => "Check that the backing store is reachable and retry",
            ErrorCategory::Configuration => "Review the configuration file and environment",
            ErrorCategory::System => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
