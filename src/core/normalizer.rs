use crate::config::NormalizerSettings;
use crate::core::batcher::BidderBatcher;
use crate::core::context::ContextExtractor;
use crate::core::demand::DemandResolver;
use crate::core::envelope::{RawAdUnit, RawAuctionRequest};
use crate::domain::model::{AdUnitSpec, NormalizedAuctionRequest, ResolvedAdUnit};
use crate::domain::ports::{CacheService, ConfigProvider};
use crate::utils::error::{NormalizeError, Result};
use http::HeaderMap;
use std::collections::HashSet;

/// Turns raw auction requests into bidder work plans.
///
/// Holds no per-request state, so one instance can serve many workers at once
/// as long as the cache service is shareable.
pub struct RequestNormalizer<C: CacheService, P: ConfigProvider> {
    cache: C,
    config: P,
}

impl<C: CacheService, P: ConfigProvider> RequestNormalizer<C, P> {
    pub fn new(cache: C, config: P) -> Self {
        Self { cache, config }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn config(&self) -> &P {
        &self.config
    }

    pub fn normalize(&self, raw_body: &[u8], headers: &HeaderMap) -> Result<NormalizedAuctionRequest> {
        // 1. 解析請求
        let raw = RawAuctionRequest::from_slice(raw_body)?;

        // 2. 至少要有一個 ad unit
        if raw.ad_units.is_empty() {
            return Err(NormalizeError::malformed("request has no ad units"));
        }

        let account_id = raw.account_id().map(str::to_string);
        let app_bundle = raw.app_bundle().map(str::to_string);
        let timeout_millis = self.effective_timeout(raw.timeout_millis);

        let ad_units = validate_ad_units(raw.ad_units)?;

        // 3. 頁面 / app 資訊，失敗不影響請求
        let mut context = ContextExtractor::new(&self.cache, self.config.publisher_lookups())
            .extract(headers, app_bundle.as_deref(), account_id.as_deref());
        context.secure |= raw.secure == 1;

        // 4. 依宣告順序展開每個 ad unit 的需求
        let resolver = DemandResolver::new(&self.cache);
        let mut batcher = BidderBatcher::new();
        let mut resolved_count = 0;

        for ad_unit in &ad_units {
            let bids = resolver.resolve(ad_unit)?;
            tracing::debug!("Ad unit {} resolved {} bids", ad_unit.code, bids.len());
            resolved_count += bids.len();

            // 5. 分批
            batcher.push_ad_unit(ResolvedAdUnit {
                code: ad_unit.code.clone(),
                sizes: ad_unit.sizes.clone(),
                bids,
            });
        }

        let bidders = batcher.finish();

        tracing::info!(
            tid = %raw.tid,
            ad_units = ad_units.len(),
            demands = resolved_count,
            batches = bidders.len(),
            "Normalized auction request"
        );

        // 6. 組合結果
        Ok(NormalizedAuctionRequest {
            transaction_id: raw.tid,
            account_id,
            app_bundle,
            timeout_millis,
            is_debug: raw.is_debug,
            context,
            ad_units,
            bidders,
        })
    }

    /// 非正值或超過上限時改用預設逾時
    fn effective_timeout(&self, requested: i64) -> u64 {
        match u64::try_from(requested) {
            Ok(ms) if ms > 0 && ms <= self.config.max_timeout_ms() => ms,
            _ => self.config.default_timeout_ms(),
        }
    }
}

fn validate_ad_units(raw_units: Vec<RawAdUnit>) -> Result<Vec<AdUnitSpec>> {
    let mut seen = HashSet::new();
    let mut ad_units = Vec::with_capacity(raw_units.len());

    for raw_unit in raw_units {
        let ad_unit = raw_unit.into_spec()?;
        if !seen.insert(ad_unit.code.clone()) {
            return Err(NormalizeError::invalid_ad_unit(
                &ad_unit.code,
                "duplicate ad unit code",
            ));
        }
        ad_units.push(ad_unit);
    }

    Ok(ad_units)
}

/// Normalizes one request with default settings.
pub fn normalize<C: CacheService + ?Sized>(
    raw_body: &[u8],
    headers: &HeaderMap,
    cache: &C,
) -> Result<NormalizedAuctionRequest> {
    RequestNormalizer::new(cache, NormalizerSettings::default()).normalize(raw_body, headers)
}
