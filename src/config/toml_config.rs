use crate::core::transport::{
    RetryPolicy, DEFAULT_BACKOFF_BASE_SECONDS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_REQUEST_TIMEOUT_SECONDS,
};
use crate::domain::model::{Provider, ProviderRegistry};
use crate::utils::error::{CinemaError, Result};
use crate::utils::validation::{self, Validate};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CinemaConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    /// Sent with every provider request, e.g. the API key.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub request_timeout_seconds: Option<u64>,
    pub deadline_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: Option<u32>,
    pub backoff_base_seconds: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub base_uri: String,
    pub location: String,
}

impl CinemaConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CinemaError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CinemaError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CINEMA_API_KEY})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CinemaError::ConfigError {
            message: format!("Invalid env var pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(CinemaError::MissingConfigError {
                field: "providers".to_string(),
            });
        }

        for provider in &self.providers {
            validation::validate_non_empty_string("providers.name", &provider.name)?;
            validation::validate_url("providers.base_uri", &provider.base_uri)?;
            validation::validate_non_empty_string("providers.location", &provider.location)?;
        }
        validation::validate_unique_names(
            "providers.name",
            self.providers.iter().map(|p| p.name.as_str()),
        )?;

        validation::validate_positive_number(
            "retry.max_attempts",
            u64::from(self.max_attempts()),
            1,
        )?;
        validation::validate_range(
            "retry.backoff_base_seconds",
            self.backoff_base_seconds(),
            0.0,
            60.0,
        )?;

        if let Some(timeout) = self.service.request_timeout_seconds {
            validation::validate_positive_number("service.request_timeout_seconds", timeout, 1)?;
        }
        if let Some(deadline) = self.service.deadline_seconds {
            validation::validate_positive_number("service.deadline_seconds", deadline, 1)?;
        }

        self.header_map()?;
        Ok(())
    }

    pub fn max_attempts(&self) -> u32 {
        self.retry.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }

    pub fn backoff_base_seconds(&self) -> f64 {
        self.retry
            .backoff_base_seconds
            .unwrap_or(DEFAULT_BACKOFF_BASE_SECONDS)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts(), self.backoff_base_seconds())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.service
                .request_timeout_seconds
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        )
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.service.deadline_seconds.map(Duration::from_secs)
    }

    /// 將 header 設定轉成不可變的 `HeaderMap`
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            if value.contains("${") {
                tracing::warn!("Header '{}' still contains an unresolved ${{...}} placeholder", name);
            }

            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| CinemaError::InvalidConfigValueError {
                    field: "headers".to_string(),
                    value: name.clone(),
                    reason: format!("Invalid header name: {}", e),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| CinemaError::InvalidConfigValueError {
                    field: format!("headers.{}", name),
                    value: value.clone(),
                    reason: format!("Invalid header value: {}", e),
                })?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }

    pub fn to_registry(&self) -> Result<ProviderRegistry> {
        let providers = self
            .providers
            .iter()
            .map(|p| Provider {
                name: p.name.clone(),
                base_uri: p.base_uri.clone(),
                location: p.location.clone(),
            })
            .collect();

        Ok(ProviderRegistry::new(providers, self.header_map()?))
    }
}

impl Validate for CinemaConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
