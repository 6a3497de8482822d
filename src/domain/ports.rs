use crate::utils::error::CacheResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub bundle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_granularity: Option<String>,
}

/// Lookup service for publisher metadata and named bidder configurations.
///
/// Calls are synchronous and may block. Implementations must be safe to share
/// between workers normalizing unrelated requests.
pub trait CacheService: Send + Sync {
    fn get_domain(&self, domain: &str) -> CacheResult<DomainInfo>;
    fn get_app(&self, bundle: &str) -> CacheResult<AppInfo>;
    fn get_account(&self, id: &str) -> CacheResult<AccountInfo>;
    /// Returns the serialized bidder-spec bundle stored under `id`.
    fn get_config(&self, id: &str) -> CacheResult<String>;
    fn close(&self);
}

impl<T: CacheService + ?Sized> CacheService for &T {
    fn get_domain(&self, domain: &str) -> CacheResult<DomainInfo> {
        (**self).get_domain(domain)
    }

    fn get_app(&self, bundle: &str) -> CacheResult<AppInfo> {
        (**self).get_app(bundle)
    }

    fn get_account(&self, id: &str) -> CacheResult<AccountInfo> {
        (**self).get_account(id)
    }

    fn get_config(&self, id: &str) -> CacheResult<String> {
        (**self).get_config(id)
    }

    fn close(&self) {
        (**self).close()
    }
}

impl<T: CacheService + ?Sized> CacheService for Arc<T> {
    fn get_domain(&self, domain: &str) -> CacheResult<DomainInfo> {
        (**self).get_domain(domain)
    }

    fn get_app(&self, bundle: &str) -> CacheResult<AppInfo> {
        (**self).get_app(bundle)
    }

    fn get_account(&self, id: &str) -> CacheResult<AccountInfo> {
        (**self).get_account(id)
    }

    fn get_config(&self, id: &str) -> CacheResult<String> {
        (**self).get_config(id)
    }

    fn close(&self) {
        (**self).close()
    }
}

impl<T: CacheService + ?Sized> CacheService for Box<T> {
    fn get_domain(&self, domain: &str) -> CacheResult<DomainInfo> {
        (**self).get_domain(domain)
    }

    fn get_app(&self, bundle: &str) -> CacheResult<AppInfo> {
        (**self).get_app(bundle)
    }

    fn get_account(&self, id: &str) -> CacheResult<AccountInfo> {
        (**self).get_account(id)
    }

    fn get_config(&self, id: &str) -> CacheResult<String> {
        (**self).get_config(id)
    }

    fn close(&self) {
        (**self).close()
    }
}

pub trait ConfigProvider: Send + Sync {
    /// Timeout applied when the request omits one or asks for too much.
    fn default_timeout_ms(&self) -> u64;
    fn max_timeout_ms(&self) -> u64;
    /// Whether the context extractor consults the cache for publisher metadata.
    fn publisher_lookups(&self) -> bool;
    fn concurrent_requests(&self) -> usize;
}
