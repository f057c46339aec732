use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CinemaError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("HTTP GET {uri} returned status {status}")]
    HttpStatus { uri: String, status: StatusCode },

    #[error("Provider request {uri} failed after {attempts} attempt(s): {source}")]
    ProviderFailure {
        uri: String,
        attempts: u32,
        #[source]
        source: Box<CinemaError>,
    },

    #[error("Failed to decode response from provider '{provider}': {source}")]
    DecodeError {
        provider: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Provider '{provider}' did not answer within {after:?}")]
    Timeout { provider: String, after: Duration },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

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

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Provider,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit status for a failed CLI run; never zero.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl CinemaError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CinemaError::ApiError(_) | CinemaError::HttpStatus { .. } | CinemaError::Timeout { .. } => {
                ErrorCategory::Network
            }
            CinemaError::ProviderFailure { .. } => ErrorCategory::Provider,
            CinemaError::DecodeError { .. } => ErrorCategory::Data,
            CinemaError::ConfigError { .. }
            | CinemaError::ConfigValidationError { .. }
            | CinemaError::InvalidConfigValueError { .. }
            | CinemaError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CinemaError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 單一供應商失敗只會少一筆影院資料
            ErrorCategory::Network | ErrorCategory::Provider => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 傳輸層錯誤才值得重試；解碼與設定錯誤重試也不會改變結果
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CinemaError::ApiError(_) | CinemaError::HttpStatus { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CinemaError::ApiError(_) => "Check network connectivity and the provider base URI",
            CinemaError::HttpStatus { status, .. } if *status == StatusCode::FORBIDDEN || *status == StatusCode::UNAUTHORIZED => {
                "Check the API key configured under [headers]"
            }
            CinemaError::HttpStatus { .. } | CinemaError::ProviderFailure { .. } => {
                "The provider is unavailable; try again later or raise retry.max_attempts"
            }
            CinemaError::DecodeError { .. } => "The provider payload format changed; inspect the raw response",
            CinemaError::Timeout { .. } => "Increase service.deadline_seconds or service.request_timeout_seconds",
            CinemaError::IoError(_) => "Check that the configuration file exists and is readable",
            CinemaError::ConfigError { .. }
            | CinemaError::ConfigValidationError { .. }
            | CinemaError::InvalidConfigValueError { .. }
            | CinemaError::MissingConfigError { .. } => "Fix the configuration file and run again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CinemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        let status = CinemaError::HttpStatus {
            uri: "http://provider/movies".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert!(status.is_retryable());

        let decode = CinemaError::DecodeError {
            provider: "filmworld".to_string(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };
        assert!(!decode.is_retryable());
        assert_eq!(decode.category(), ErrorCategory::Data);
    }

    #[test]
    fn test_provider_failure_keeps_last_cause() {
        let err = CinemaError::ProviderFailure {
            uri: "http://provider/movies".to_string(),
            attempts: 3,
            source: Box::new(CinemaError::HttpStatus {
                uri: "http://provider/movies".to_string(),
                status: StatusCode::FORBIDDEN,
            }),
        };

        let message = err.to_string();
        assert!(message.contains("3 attempt(s)"));
        assert!(message.contains("403"));
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = CinemaError::MissingConfigError {
            field: "providers".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_every_error_exits_non_zero() {
        let errors = vec![
            CinemaError::HttpStatus {
                uri: "http://provider/movies".to_string(),
                status: StatusCode::INTERNAL_SERVER_ERROR,
            },
            CinemaError::DecodeError {
                provider: "filmworld".to_string(),
                source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
            },
            CinemaError::MissingConfigError {
                field: "providers".to_string(),
            },
            CinemaError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "missing")),
        ];

        let codes: Vec<i32> = errors.iter().map(|e| e.severity().exit_code()).collect();
        assert_eq!(codes, vec![2, 1, 1, 3]);
    }
}
