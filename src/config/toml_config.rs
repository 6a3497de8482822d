use crate::config::{NormalizerSettings, DEFAULT_CONCURRENT_REQUESTS, DEFAULT_TIMEOUT_MS, MAX_TIMEOUT_MS};
use crate::core::ConfigProvider;
use crate::utils::error::{NormalizeError, Result};
use crate::utils::validation::{validate_path, validate_positive_number, validate_range, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub context: ContextConfig,
    pub cache: Option<CacheConfig>,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestConfig {
    pub default_timeout_ms: Option<u64>,
    pub max_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextConfig {
    pub publisher_lookups: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub concurrent_requests: Option<usize>,
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| NormalizeError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CACHE_PATH})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| NormalizeError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn settings(&self) -> NormalizerSettings {
        NormalizerSettings {
            default_timeout_ms: self.default_timeout_ms(),
            max_timeout_ms: self.max_timeout_ms(),
            publisher_lookups: self.publisher_lookups(),
            concurrent_requests: self.concurrent_requests(),
        }
    }

    pub fn cache_path(&self) -> Option<&str> {
        self.cache.as_ref().map(|c| c.path.as_str())
    }

    pub fn log_level(&self) -> &str {
        self.runtime.log_level.as_deref().unwrap_or("info")
    }

    pub fn json_logs(&self) -> bool {
        self.runtime.json_logs.unwrap_or(false)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_positive_number("request.max_timeout_ms", self.max_timeout_ms(), 1)?;
        validate_range(
            "request.default_timeout_ms",
            self.default_timeout_ms(),
            1,
            self.max_timeout_ms(),
        )?;

        validate_positive_number(
            "runtime.concurrent_requests",
            self.concurrent_requests() as u64,
            1,
        )?;

        if let Some(path) = self.cache_path() {
            validate_path("cache.path", path)?;
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level()) {
            return Err(NormalizeError::InvalidConfigValueError {
                field: "runtime.log_level".to_string(),
                value: self.log_level().to_string(),
                reason: format!("Valid levels: {}", valid_levels.join(", ")),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn default_timeout_ms(&self) -> u64 {
        self.request.default_timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    fn max_timeout_ms(&self) -> u64 {
        self.request.max_timeout_ms.unwrap_or(MAX_TIMEOUT_MS)
    }

    fn publisher_lookups(&self) -> bool {
        self.context.publisher_lookups.unwrap_or(true)
    }

    fn concurrent_requests(&self) -> usize {
        self.runtime
            .concurrent_requests
            .unwrap_or(DEFAULT_CONCURRENT_REQUESTS)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
