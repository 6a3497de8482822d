use crate::domain::ports::{AccountInfo, AppInfo, DomainInfo};
use serde::{Deserialize, Serialize};

/// 競價參數，保持原樣傳給下游
pub type BidParams = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

/// Inline bid entry as declared on an ad unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineBid {
    #[serde(default)]
    pub bidder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BidParams>,
}

/// Where an ad unit's bid demand comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Demand {
    InlineBids(Vec<InlineBid>),
    ConfigRef(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdUnitSpec {
    pub code: String,
    pub sizes: Vec<Size>,
    pub demand: Demand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBidSpec {
    pub bidder_code: String,
    pub bid_id: String,
    pub params: BidParams,
}

/// One ad unit with its demand already resolved, ready for batching.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAdUnit {
    pub code: String,
    pub sizes: Vec<Size>,
    pub bids: Vec<ResolvedBidSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdUnitDemand {
    pub ad_unit_code: String,
    pub sizes: Vec<Size>,
    pub bid_id: String,
    pub params: BidParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidderBatch {
    pub bidder_code: String,
    pub ad_units: Vec<AdUnitDemand>,
}

/// 來自快取的發佈商資料，查不到時留空
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublisherMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<DomainInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<AppInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub effective_url: String,
    pub registrable_domain: String,
    pub device_user_agent: String,
    pub device_ip: String,
    pub secure: bool,
    pub publisher: PublisherMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAuctionRequest {
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_bundle: Option<String>,
    pub timeout_millis: u64,
    pub is_debug: bool,
    pub context: RequestContext,
    pub ad_units: Vec<AdUnitSpec>,
    pub bidders: Vec<BidderBatch>,
}

impl NormalizedAuctionRequest {
    pub fn effective_url(&self) -> &str {
        &self.context.effective_url
    }

    pub fn registrable_domain(&self) -> &str {
        &self.context.registrable_domain
    }

    pub fn device_user_agent(&self) -> &str {
        &self.context.device_user_agent
    }

    /// 所有批次中的需求總數
    pub fn demand_count(&self) -> usize {
        self.bidders.iter().map(|b| b.ad_units.len()).sum()
    }
}
