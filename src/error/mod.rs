use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Full Bedrock access verified
    Success = 0,
    /// One or more checks failed
    CheckFailure = 1,
    /// No usable credentials, nothing could be checked
    CredentialFailure = 2,
    /// Network failure during diagnostics
    NetworkFailure = 3,
    /// Configuration error
    ConfigError = 4,
    /// Invalid input
    InvalidInput = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Failure taxonomy for collaborator (AWS-side) errors.
///
/// Every external-call failure is classified into exactly one of these
/// categories at its stage boundary; the report keys remediation text off
/// the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No usable credentials could be resolved
    Credential,
    /// Credentials are valid but denied for the action/region/model
    Authorization,
    /// Endpoint or service not enabled in the region
    ServiceUnavailable,
    /// Rate or quota exceeded
    Throttling,
    /// Unexpected response shape from the service
    MalformedResponse,
    /// Anything else
    Unknown,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Credential => write!(f, "credential error"),
            ErrorKind::Authorization => write!(f, "authorization error"),
            ErrorKind::ServiceUnavailable => write!(f, "service unavailable"),
            ErrorKind::Throttling => write!(f, "throttling"),
            ErrorKind::MalformedResponse => write!(f, "malformed response"),
            ErrorKind::Unknown => write!(f, "unknown error"),
        }
    }
}

/// Classified error returned by the `BedrockApi` collaborator.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Credential, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    pub fn throttling(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Throttling, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedResponse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }
}

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Timeout: {0}")]
    Timeout(String),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::Config(_) | AppError::TomlParse(_) => ExitCode::ConfigError,
            AppError::Credential(_) => ExitCode::CredentialFailure,
            AppError::Network(_) | AppError::Http(_) | AppError::Timeout(_) => {
                ExitCode::NetworkFailure
            }
            AppError::InvalidInput(_)
            | AppError::FileNotFound(_)
            | AppError::UrlParse(_)
            | AppError::Io(_) => ExitCode::InvalidInput,
            AppError::Json(_) => ExitCode::CheckFailure,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(
            AppError::Config("bad".into()).exit_code(),
            ExitCode::ConfigError
        );
        assert_eq!(
            AppError::Credential("none".into()).exit_code(),
            ExitCode::CredentialFailure
        );
        assert_eq!(
            AppError::FileNotFound("x".into()).exit_code(),
            ExitCode::InvalidInput
        );
    }

    #[test]
    fn test_api_error_display() {
        let e = ApiError::authorization("AccessDeniedException");
        assert_eq!(e.to_string(), "authorization error: AccessDeniedException");
        assert_eq!(e.kind, ErrorKind::Authorization);
    }
}
