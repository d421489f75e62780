//! Custom error types for document operations

use thiserror::Error;

/// Errors raised by the translation, detection and summarization services
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Request rejected before any remote call
    #[error("{message}")]
    Validation {
        message: String,
    },

    /// Target language missing from the supported table
    #[error("Target language '{code}' not supported")]
    UnsupportedLanguage {
        code: String,
    },

    /// Inference API answered with an error
    #[error("API error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded for model {model}")]
    RateLimitError {
        model: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        message: String,
    },

    /// Request timeout
    #[error("Request timeout")]
    TimeoutError,

    /// Upload is neither PDF nor plain text
    #[error("Unsupported file type: {file_type}")]
    UnsupportedFileType {
        file_type: String,
    },

    /// Text could not be pulled out of a document
    #[error("Text extraction failed: {message}")]
    ExtractionError {
        message: String,
    },

    /// File operation error
    #[error("File error: {path} - {message}")]
    FileError {
        path: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ServiceError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
        }
    }

    /// True for errors raised before any network call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ServiceError::Validation { .. }
                | ServiceError::UnsupportedLanguage { .. }
                | ServiceError::UnsupportedFileType { .. }
                | ServiceError::ExtractionError { .. }
        )
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        ServiceError::InternalError(err.to_string())
    }
}

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;
