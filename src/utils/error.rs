use thiserror::Error;

/// 快取服務查詢失敗
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("lookup not supported: {0}")]
    NotSupported(String),

    #[error("cache service is closed")]
    Closed,

    #[error("cache backend error: {0}")]
    Backend(String),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    #[error("Invalid ad unit '{ad_unit}': {reason}")]
    InvalidAdUnit { ad_unit: String, reason: String },

    #[error("Failed to resolve config '{config_id}': {reason}")]
    ConfigResolutionError { config_id: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Worker error: {message}")]
    WorkerError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorCategory {
    Request,
    AdUnit,
    Config,
    Cache,
    System,
}

impl NormalizeError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    pub fn invalid_ad_unit(ad_unit: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAdUnit {
            ad_unit: ad_unit.into(),
            reason: reason.into(),
        }
    }

    pub fn config_resolution(config_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigResolutionError {
            config_id: config_id.into(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedRequest { .. } => ErrorCategory::Request,
            Self::InvalidAdUnit { .. } => ErrorCategory::AdUnit,
            Self::ConfigResolutionError { .. } => ErrorCategory::Cache,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Config
            }
            Self::IoError(_) | Self::WorkerError { .. } => ErrorCategory::System,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Request => "Check that the body is JSON with `tid` and a non-empty `ad_units` array",
            ErrorCategory::AdUnit => "Give every ad unit a unique code, at least one size and exactly one of `bids` or `config_id`",
            ErrorCategory::Cache => "Verify the referenced config_id exists in the cache backend",
            ErrorCategory::Config => "Review the configuration file and command line flags",
            ErrorCategory::System => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
