pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::memory_cache::MemoryCache;
pub use config::{toml_config::TomlConfig, NormalizerSettings};
pub use core::normalizer::{normalize, RequestNormalizer};
pub use domain::model::{
    AdUnitDemand, AdUnitSpec, BidderBatch, Demand, NormalizedAuctionRequest, RequestContext,
    ResolvedBidSpec,
};
pub use domain::ports::{CacheService, ConfigProvider};
pub use utils::error::{CacheError, NormalizeError, Result};
