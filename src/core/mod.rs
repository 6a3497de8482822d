pub mod batcher;
pub mod context;
pub mod demand;
pub mod envelope;
pub mod normalizer;

pub use crate::domain::model::{
    AdUnitDemand, AdUnitSpec, BidderBatch, Demand, NormalizedAuctionRequest, RequestContext,
    ResolvedBidSpec,
};
pub use crate::domain::ports::{CacheService, ConfigProvider};
pub use crate::utils::error::Result;
