#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT_MS: u64 = 1000;
pub const MAX_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 4;

/// 正規化參數的預設值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerSettings {
    pub default_timeout_ms: u64,
    pub max_timeout_ms: u64,
    pub publisher_lookups: bool,
    pub concurrent_requests: usize,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            max_timeout_ms: MAX_TIMEOUT_MS,
            publisher_lookups: true,
            concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
        }
    }
}

impl ConfigProvider for NormalizerSettings {
    fn default_timeout_ms(&self) -> u64 {
        self.default_timeout_ms
    }

    fn max_timeout_ms(&self) -> u64 {
        self.max_timeout_ms
    }

    fn publisher_lookups(&self) -> bool {
        self.publisher_lookups
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }
}

#[cfg(feature = "cli")]
pub use cli::CliConfig;
