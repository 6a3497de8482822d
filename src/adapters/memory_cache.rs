use crate::domain::ports::{AccountInfo, AppInfo, CacheService, DomainInfo};
use crate::utils::error::{CacheError, CacheResult, NormalizeError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cache file layout:
///
/// ```toml
/// accounts_supported = true
///
/// [[domains]]
/// domain = "nytimes.com"
///
/// [[apps]]
/// bundle = "com.one.com"
///
/// [[accounts]]
/// id = "pub-1"
/// price_granularity = "medium"
///
/// [configs]
/// abcd = '''[{"bidder": "appnexus", "bid_id": "1", "params": {"placementId": "10433394"}}]'''
/// ```
#[derive(Debug, Default, Deserialize)]
struct CacheFile {
    #[serde(default)]
    accounts_supported: bool,
    #[serde(default)]
    domains: Vec<DomainInfo>,
    #[serde(default)]
    apps: Vec<AppInfo>,
    #[serde(default)]
    accounts: Vec<AccountInfo>,
    #[serde(default)]
    configs: HashMap<String, String>,
}

/// In-memory cache backend, for local runs and tests.
///
/// Contents are fixed once built, so lookups need no locking.
#[derive(Debug, Default)]
pub struct MemoryCache {
    domains: HashMap<String, DomainInfo>,
    apps: HashMap<String, AppInfo>,
    accounts: HashMap<String, AccountInfo>,
    configs: HashMap<String, String>,
    accounts_supported: bool,
    closed: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        self.domains.insert(domain.clone(), DomainInfo { domain });
        self
    }

    pub fn with_app(mut self, bundle: impl Into<String>) -> Self {
        let bundle = bundle.into();
        self.apps.insert(bundle.clone(), AppInfo { bundle });
        self
    }

    pub fn with_account(mut self, id: impl Into<String>, price_granularity: Option<String>) -> Self {
        let id = id.into();
        self.accounts.insert(
            id.clone(),
            AccountInfo {
                id,
                price_granularity,
            },
        );
        self
    }

    /// 儲存序列化後的 bidder 設定
    pub fn with_config(mut self, id: impl Into<String>, bundle: impl Into<String>) -> Self {
        self.configs.insert(id.into(), bundle.into());
        self
    }

    pub fn accounts_supported(mut self, supported: bool) -> Self {
        self.accounts_supported = supported;
        self
    }

    /// 從 TOML 檔案載入快取內容
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CacheFile = toml::from_str(content).map_err(|e| NormalizeError::ConfigError {
            message: format!("Cache file parsing error: {}", e),
        })?;

        let mut cache = Self::new().accounts_supported(file.accounts_supported);
        for domain in file.domains {
            cache.domains.insert(domain.domain.clone(), domain);
        }
        for app in file.apps {
            cache.apps.insert(app.bundle.clone(), app);
        }
        for account in file.accounts {
            cache.accounts.insert(account.id.clone(), account);
        }
        cache.configs = file.configs;

        tracing::debug!(
            "Loaded cache: {} domains, {} apps, {} accounts, {} configs",
            cache.domains.len(),
            cache.apps.len(),
            cache.accounts.len(),
            cache.configs.len()
        );
        Ok(cache)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> CacheResult<()> {
        if self.is_closed() {
            return Err(CacheError::Closed);
        }
        Ok(())
    }
}

impl CacheService for MemoryCache {
    fn get_domain(&self, domain: &str) -> CacheResult<DomainInfo> {
        self.ensure_open()?;
        self.domains
            .get(domain)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(domain.to_string()))
    }

    fn get_app(&self, bundle: &str) -> CacheResult<AppInfo> {
        self.ensure_open()?;
        self.apps
            .get(bundle)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(bundle.to_string()))
    }

    fn get_account(&self, id: &str) -> CacheResult<AccountInfo> {
        self.ensure_open()?;
        if !self.accounts_supported {
            return Err(CacheError::NotSupported(format!("account {}", id)));
        }
        self.accounts
            .get(id)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(id.to_string()))
    }

    fn get_config(&self, id: &str) -> CacheResult<String> {
        self.ensure_open()?;
        self.configs
            .get(id)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(id.to_string()))
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
