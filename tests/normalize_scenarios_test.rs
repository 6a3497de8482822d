use anyhow::Result;
use auction_normalizer::{
    normalize, BidderBatch, CacheError, CacheService, MemoryCache, NormalizeError,
};
use http::{HeaderMap, HeaderValue};

const BUNDLE: &str = r#"
[
    {
        "bidder": "indexExchange",
        "bid_id": "22222222",
        "params": {"id": "4", "siteID": "186774", "timeout": "10000"}
    },
    {
        "bidder": "audienceNetwork",
        "bid_id": "22222225",
        "params": {}
    },
    {
        "bidder": "pubmatic",
        "bid_id": "22222223",
        "params": {"publisherId": "156009", "adSlot": "39620189@728x90"}
    },
    {
        "bidder": "appnexus",
        "bid_id": "22222224",
        "params": {"placementId": "10433394"}
    }
]
"#;

fn dummy_cache() -> MemoryCache {
    MemoryCache::new()
        .with_domain("nytimes.com")
        .with_app("com.one.com")
        .with_config("abcd", BUNDLE)
}

fn referer_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("referer", HeaderValue::from_static("http://nytimes.com/cool.html"));
    headers
}

fn batch_shape(batches: &[BidderBatch]) -> Vec<(&str, usize)> {
    batches
        .iter()
        .map(|b| (b.bidder_code.as_str(), b.ad_units.len()))
        .collect()
}

#[test]
fn test_parse_simple_request() -> Result<()> {
    let body = br#"{
        "tid": "abcd",
        "ad_units": [
            {
                "code": "first",
                "sizes": [{"w": 300, "h": 250}],
                "bids": [{"bidder": "indexExchange"}, {"bidder": "appnexus"}]
            },
            {
                "code": "second",
                "sizes": [{"w": 728, "h": 90}],
                "bids": [{"bidder": "indexExchange"}, {"bidder": "appnexus"}]
            }
        ]
    }"#;

    let request = normalize(body, &referer_headers(), &dummy_cache())?;

    assert_eq!(request.transaction_id, "abcd");
    assert_eq!(request.ad_units.len(), 2);
    assert_eq!(
        batch_shape(&request.bidders),
        vec![("indexExchange", 1), ("appnexus", 2), ("indexExchange", 1)]
    );

    let appnexus = &request.bidders[1];
    assert_eq!(appnexus.ad_units[0].ad_unit_code, "first");
    assert_eq!(appnexus.ad_units[1].ad_unit_code, "second");
    assert_eq!(appnexus.ad_units[1].sizes[0].w, 728);
    Ok(())
}

#[test]
fn test_header_parsing() -> Result<()> {
    let body = br#"{
        "tid": "abcd",
        "ad_units": [
            {
                "code": "first",
                "sizes": [{"w": 300, "h": 250}],
                "bidders": [
                    {"bidder": "indexExchange", "params": {"id": "417", "siteID": "test-site"}}
                ]
            }
        ]
    }"#;

    let mut headers = referer_headers();
    headers.insert("user-agent", HeaderValue::from_static("Mozilla/"));

    let request = normalize(body, &headers, &dummy_cache())?;

    assert_eq!(request.effective_url(), "http://nytimes.com/cool.html");
    assert_eq!(request.registrable_domain(), "nytimes.com");
    assert_eq!(request.device_user_agent(), "Mozilla/");
    assert_eq!(
        request.context.publisher.domain.as_ref().map(|d| d.domain.as_str()),
        Some("nytimes.com")
    );

    let demand = &request.bidders[0].ad_units[0];
    assert_eq!(demand.params["id"], "417");
    assert_eq!(demand.params["siteID"], "test-site");
    Ok(())
}

#[test]
fn test_parse_config() -> Result<()> {
    let body = br#"{
        "tid": "abcd",
        "ad_units": [
            {
                "code": "first",
                "sizes": [{"w": 300, "h": 250}],
                "bids": [{"bidder": "indexExchange"}, {"bidder": "appnexus"}]
            },
            {
                "code": "second",
                "sizes": [{"w": 728, "h": 90}],
                "config_id": "abcd"
            }
        ]
    }"#;

    let request = normalize(body, &referer_headers(), &dummy_cache())?;

    assert_eq!(request.transaction_id, "abcd");
    assert_eq!(request.ad_units.len(), 2);
    assert_eq!(
        batch_shape(&request.bidders),
        vec![
            ("indexExchange", 1),
            ("appnexus", 2),
            ("indexExchange", 1),
            ("audienceNetwork", 1),
            ("pubmatic", 1),
        ]
    );

    // 設定檔中的 bid_id 與參數會帶到批次
    let appnexus = &request.bidders[1];
    assert_eq!(appnexus.ad_units[0].bid_id, "");
    assert_eq!(appnexus.ad_units[1].bid_id, "22222224");
    assert_eq!(appnexus.ad_units[1].params["placementId"], "10433394");
    assert_eq!(request.bidders[2].ad_units[0].bid_id, "22222222");
    Ok(())
}

#[test]
fn test_conservation_and_determinism() -> Result<()> {
    let body = br#"{
        "tid": "abcd",
        "ad_units": [
            {"code": "a", "sizes": [{"w": 300, "h": 250}], "config_id": "abcd"},
            {"code": "b", "sizes": [{"w": 300, "h": 250}], "bids": [{"bidder": "appnexus"}]},
            {"code": "c", "sizes": [{"w": 300, "h": 250}], "bids": []},
            {"code": "d", "sizes": [{"w": 300, "h": 600}], "bids": [{"bidder": "pubmatic"}, {"bidder": "appnexus"}]},
            {"code": "e", "sizes": [{"w": 728, "h": 90}], "config_id": "abcd"}
        ]
    }"#;

    let cache = dummy_cache();
    let first = normalize(body, &HeaderMap::new(), &cache)?;
    let second = normalize(body, &HeaderMap::new(), &cache)?;

    assert_eq!(first.demand_count(), 4 + 1 + 0 + 2 + 4);
    assert_eq!(first.bidders, second.bidders);

    // appnexus 的尾端需求一路合併
    assert_eq!(first.bidders[3].bidder_code, "appnexus");
    let codes: Vec<&str> = first.bidders[3]
        .ad_units
        .iter()
        .map(|d| d.ad_unit_code.as_str())
        .collect();
    assert_eq!(codes, vec!["a", "b", "d", "e"]);
    Ok(())
}

#[test]
fn test_unresolvable_config_fails_whole_request() {
    let body = br#"{
        "tid": "abcd",
        "ad_units": [
            {"code": "first", "sizes": [{"w": 300, "h": 250}], "bids": [{"bidder": "appnexus"}]},
            {"code": "second", "sizes": [{"w": 728, "h": 90}], "config_id": "unknown"}
        ]
    }"#;

    let err = normalize(body, &referer_headers(), &dummy_cache()).unwrap_err();
    match err {
        NormalizeError::ConfigResolutionError { config_id, .. } => assert_eq!(config_id, "unknown"),
        other => panic!("expected ConfigResolutionError, got {:?}", other),
    }
}

#[test]
fn test_closed_cache_fails_config_resolution() {
    let cache = dummy_cache();
    cache.close();
    assert_eq!(cache.get_config("abcd"), Err(CacheError::Closed));

    let body = br#"{
        "tid": "abcd",
        "ad_units": [{"code": "second", "sizes": [{"w": 728, "h": 90}], "config_id": "abcd"}]
    }"#;

    let err = normalize(body, &referer_headers(), &cache).unwrap_err();
    assert!(matches!(err, NormalizeError::ConfigResolutionError { .. }));
}

#[test]
fn test_both_or_neither_demand_source_is_invalid() {
    let both = br#"{
        "tid": "abcd",
        "ad_units": [
            {"code": "first", "sizes": [{"w": 300, "h": 250}], "bids": [{"bidder": "appnexus"}], "config_id": "abcd"}
        ]
    }"#;
    let neither = br#"{
        "tid": "abcd",
        "ad_units": [{"code": "first", "sizes": [{"w": 300, "h": 250}]}]
    }"#;

    for body in [&both[..], &neither[..]] {
        let err = normalize(body, &HeaderMap::new(), &dummy_cache()).unwrap_err();
        assert!(
            matches!(err, NormalizeError::InvalidAdUnit { ref ad_unit, .. } if ad_unit == "first"),
            "unexpected error: {:?}",
            err
        );
    }
}

#[test]
fn test_blank_bidder_code_is_invalid() {
    let body = br#"{
        "tid": "abcd",
        "ad_units": [
            {"code": "first", "sizes": [{"w": 300, "h": 250}], "bids": [{"bidder": "appnexus"}, {"params": {"id": "1"}}]}
        ]
    }"#;

    let err = normalize(body, &HeaderMap::new(), &dummy_cache()).unwrap_err();
    assert!(matches!(err, NormalizeError::InvalidAdUnit { .. }));
}

#[test]
fn test_missing_referer_is_not_an_error() -> Result<()> {
    let body = br#"{
        "tid": "abcd",
        "app": {"bundle": "com.one.com"},
        "ad_units": [{"code": "first", "sizes": [{"w": 320, "h": 50}], "bids": [{"bidder": "appnexus"}]}]
    }"#;

    let request = normalize(body, &HeaderMap::new(), &dummy_cache())?;
    assert_eq!(request.effective_url(), "");
    assert_eq!(request.registrable_domain(), "");
    assert_eq!(request.device_user_agent(), "");
    assert_eq!(request.app_bundle.as_deref(), Some("com.one.com"));
    assert!(request.context.publisher.app.is_some());
    Ok(())
}

#[test]
fn test_malformed_referer_degrades_gracefully() -> Result<()> {
    let body = br#"{
        "tid": "abcd",
        "ad_units": [{"code": "first", "sizes": [{"w": 300, "h": 250}], "bids": [{"bidder": "appnexus"}]}]
    }"#;

    let mut headers = HeaderMap::new();
    headers.insert("referer", HeaderValue::from_static("::not a url::"));

    let request = normalize(body, &headers, &dummy_cache())?;
    assert_eq!(request.effective_url(), "::not a url::");
    assert_eq!(request.registrable_domain(), "");
    assert!(request.context.publisher.domain.is_none());
    Ok(())
}

#[test]
fn test_normalized_request_serializes() -> Result<()> {
    let body = br#"{
        "tid": "abcd",
        "ad_units": [{"code": "second", "sizes": [{"w": 728, "h": 90}], "config_id": "abcd"}]
    }"#;

    let request = normalize(body, &referer_headers(), &dummy_cache())?;
    let json = serde_json::to_value(&request)?;

    assert_eq!(json["transaction_id"], "abcd");
    assert_eq!(json["ad_units"][0]["demand"]["config_ref"], "abcd");
    assert_eq!(json["bidders"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["context"]["registrable_domain"], "nytimes.com");
    Ok(())
}
