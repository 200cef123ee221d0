use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Invalid target URL '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },

    #[error("Review container not found after waiting {waited:?}")]
    ContainerNotFound { waited: Duration },

    #[error("Failed to extract field '{field}': {message}")]
    FieldExtraction { field: String, message: String },

    #[error("Browser session error: {0}")]
    Browser(#[from] anyhow::Error),

    #[error("Harvest cancelled")]
    Cancelled,

    #[error("Time budget exhausted while {stage}")]
    DeadlineExceeded { stage: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Browser,
    Page,
    Extraction,
    Output,
    Configuration,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HarvestError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HarvestError::InvalidTarget { .. } => ErrorCategory::Input,
            HarvestError::ContainerNotFound { .. } => ErrorCategory::Page,
            HarvestError::FieldExtraction { .. } => ErrorCategory::Extraction,
            HarvestError::Browser(_) | HarvestError::TaskError(_) => ErrorCategory::Browser,
            HarvestError::Cancelled | HarvestError::DeadlineExceeded { .. } => {
                ErrorCategory::Interrupted
            }
            HarvestError::IoError(_)
            | HarvestError::CsvError(_)
            | HarvestError::SerializationError(_) => ErrorCategory::Output,
            HarvestError::ConfigError { .. }
            | HarvestError::ConfigValidationError { .. }
            | HarvestError::InvalidConfigValueError { .. }
            | HarvestError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HarvestError::FieldExtraction { .. }
            | HarvestError::Cancelled
            | HarvestError::DeadlineExceeded { .. } => ErrorSeverity::Low,
            HarvestError::ContainerNotFound { .. } => ErrorSeverity::Medium,
            HarvestError::InvalidTarget { .. }
            | HarvestError::ConfigError { .. }
            | HarvestError::ConfigValidationError { .. }
            | HarvestError::InvalidConfigValueError { .. }
            | HarvestError::MissingConfigError { .. }
            | HarvestError::CsvError(_)
            | HarvestError::SerializationError(_) => ErrorSeverity::High,
            HarvestError::Browser(_) | HarvestError::TaskError(_) | HarvestError::IoError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HarvestError::InvalidTarget { .. } => {
                "Please enter a valid Google Maps URL".to_string()
            }
            HarvestError::ContainerNotFound { .. } => "Could not find reviews section. Please make sure this is a valid Google Maps place page with reviews.".to_string(),
            HarvestError::Browser(e) => format!("Scraping failed: {}", e),
            HarvestError::Cancelled => "Scraping was cancelled before it finished".to_string(),
            HarvestError::DeadlineExceeded { stage } => {
                format!("⏱️ Time budget exhausted while {}, no reviews were loaded", stage)
            }
            HarvestError::IoError(e) => format!("Could not write output: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Copy the full place URL from the browser address bar (it starts with https://www.google.com/maps)",
            ErrorCategory::Page => "Open the place's Reviews tab in the browser and copy that URL, or raise timing.container_wait_ms",
            ErrorCategory::Browser => "Check that Chrome or Chromium is installed, or pass --chrome-path",
            ErrorCategory::Extraction => "The page layout may have changed; update the rating/text selectors",
            ErrorCategory::Output => "Check that the output directory exists and is writable",
            ErrorCategory::Configuration => "Review the configuration file and command line flags",
            ErrorCategory::Interrupted => "Run the harvest again to collect the remaining reviews",
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
