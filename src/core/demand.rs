use crate::domain::model::{AdUnitSpec, BidParams, Demand, InlineBid, ResolvedBidSpec};
use crate::domain::ports::CacheService;
use crate::utils::error::{NormalizeError, Result};
use crate::utils::validation::is_blank;
use serde::Deserialize;

/// One entry of a stored bidder-config bundle.
#[derive(Debug, Deserialize)]
struct BundleEntry {
    #[serde(default)]
    bidder: Option<String>,
    #[serde(default)]
    bid_id: Option<String>,
    #[serde(default)]
    params: Option<BidParams>,
}

/// Expands an ad unit's demand into concrete bidder specs, in declaration order.
pub struct DemandResolver<'a, C: CacheService + ?Sized> {
    cache: &'a C,
}

impl<'a, C: CacheService + ?Sized> DemandResolver<'a, C> {
    pub fn new(cache: &'a C) -> Self {
        Self { cache }
    }

    pub fn resolve(&self, ad_unit: &AdUnitSpec) -> Result<Vec<ResolvedBidSpec>> {
        match &ad_unit.demand {
            Demand::InlineBids(bids) => resolve_inline(&ad_unit.code, bids),
            Demand::ConfigRef(config_id) => self.resolve_config(&ad_unit.code, config_id),
        }
    }

    fn resolve_config(&self, ad_unit_code: &str, config_id: &str) -> Result<Vec<ResolvedBidSpec>> {
        tracing::debug!(
            "Resolving config {} for ad unit {}",
            config_id,
            ad_unit_code
        );

        let bundle = self
            .cache
            .get_config(config_id)
            .map_err(|e| NormalizeError::config_resolution(config_id, e.to_string()))?;

        let bids = parse_config_bundle(config_id, &bundle)?;
        tracing::debug!("Config {} resolved to {} bidders", config_id, bids.len());
        Ok(bids)
    }
}

fn resolve_inline(ad_unit_code: &str, bids: &[InlineBid]) -> Result<Vec<ResolvedBidSpec>> {
    bids.iter()
        .enumerate()
        .map(|(index, bid)| {
            if is_blank(&bid.bidder) {
                return Err(NormalizeError::invalid_ad_unit(
                    ad_unit_code,
                    format!("bid #{} has a blank bidder code", index),
                ));
            }

            Ok(ResolvedBidSpec {
                bidder_code: bid.bidder.clone(),
                bid_id: String::new(),
                params: bid.params.clone().unwrap_or_default(),
            })
        })
        .collect()
}

/// 解析快取中的 bidder 設定，保留原本順序
pub fn parse_config_bundle(config_id: &str, bundle: &str) -> Result<Vec<ResolvedBidSpec>> {
    let entries: Vec<BundleEntry> = serde_json::from_str(bundle).map_err(|e| {
        NormalizeError::config_resolution(config_id, format!("unparseable bundle: {}", e))
    })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let bidder_code = entry
                .bidder
                .filter(|code| !is_blank(code))
                .ok_or_else(|| {
                    NormalizeError::config_resolution(
                        config_id,
                        format!("entry #{} is missing a bidder code", index),
                    )
                })?;

            Ok(ResolvedBidSpec {
                bidder_code,
                bid_id: entry.bid_id.unwrap_or_default(),
                params: entry.params.unwrap_or_default(),
            })
        })
        .collect()
}
