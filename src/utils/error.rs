use thiserror::Error;

#[derive(Error, Debug)]
pub enum PifError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("GitHub API returned {status}: {message}")]
    GitHubApiError { status: u16, message: String },

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

    #[error("system.prop not found in ZIP")]
    SystemPropNotFound,

    #[error("No fingerprint found in system.prop")]
    MissingFingerprint,

    #[error("{message}")]
    ValidationError { field: String, message: String },

    #[error("No files generated ({failed} of {total} assets failed)")]
    NoFilesGenerated { failed: usize, total: usize },

    #[error("{failed} of {total} releases failed to process")]
    WorkflowFailed { failed: usize, total: usize },

    #[error("Publishing incomplete: {failed} of {total} uploads failed")]
    PublishIncomplete { failed: usize, total: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
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

impl PifError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        PifError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        PifError::ConfigError {
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            PifError::GitHubApiError { status, .. } => Some(*status),
            PifError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PifError::HttpError(_)
            | PifError::GitHubApiError { .. }
            | PifError::PublishIncomplete { .. } => ErrorCategory::Network,
            PifError::ZipError(_)
            | PifError::SerializationError(_)
            | PifError::SystemPropNotFound
            | PifError::MissingFingerprint
            | PifError::ValidationError { .. }
            | PifError::NoFilesGenerated { .. }
            | PifError::WorkflowFailed { .. } => ErrorCategory::Data,
            PifError::ConfigError { .. }
            | PifError::MissingConfigError { .. }
            | PifError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            PifError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PifError::HttpError(_) | PifError::PublishIncomplete { .. } => ErrorSeverity::Medium,
            PifError::GitHubApiError { status, .. } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            PifError::GitHubApiError { .. } => ErrorSeverity::High,
            PifError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PifError::HttpError(_) => "Check network connectivity and retry",
            PifError::PublishIncomplete { .. } => {
                "Re-run; files already on the release are skipped and only failed uploads are retried"
            }
            PifError::GitHubApiError { status: 401, .. }
            | PifError::GitHubApiError { status: 403, .. } => {
                "Check that GITHUB_TOKEN is set and has the contents:write scope"
            }
            PifError::GitHubApiError { status: 404, .. } => {
                "Check the repository name and that the release exists"
            }
            PifError::GitHubApiError { .. } => "Retry later; the GitHub API may be rate limiting",
            PifError::ZipError(_) | PifError::SystemPropNotFound => {
                "Verify the asset is a flashable ZIP containing system.prop"
            }
            PifError::MissingFingerprint | PifError::ValidationError { .. } => {
                "The upstream build properties are incomplete; skip this asset or wait for a fixed release"
            }
            PifError::NoFilesGenerated { .. } | PifError::WorkflowFailed { .. } => {
                "Inspect the per-asset errors logged above"
            }
            PifError::SerializationError(_) => "Check that JSON input is well formed",
            PifError::ConfigError { .. }
            | PifError::MissingConfigError { .. }
            | PifError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command-line arguments"
            }
            PifError::IoError(_) => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Data => format!("Could not build PIF data: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// Process exit code derived from severity.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, PifError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_displays_message_only() {
        let err = PifError::validation("MODEL", "Field 'MODEL' is empty or missing");
        assert_eq!(err.to_string(), "Field 'MODEL' is empty or missing");
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_github_status_severity() {
        let unprocessable = PifError::GitHubApiError {
            status: 422,
            message: "already_exists".to_string(),
        };
        assert_eq!(unprocessable.status(), Some(422));
        assert_eq!(unprocessable.severity(), ErrorSeverity::High);

        let unavailable = PifError::GitHubApiError {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(unavailable.severity(), ErrorSeverity::Medium);
        assert_eq!(unavailable.exit_code(), 2);
    }

    #[test]
    fn test_publish_incomplete_is_retryable() {
        let err = PifError::PublishIncomplete {
            failed: 2,
            total: 5,
        };
        assert_eq!(err.to_string(), "Publishing incomplete: 2 of 5 uploads failed");
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_io_error_is_critical() {
        let err = PifError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(err.category(), ErrorCategory::System);
        assert_eq!(err.exit_code(), 3);
        assert!(err.user_friendly_message().starts_with("System error"));
    }
}
