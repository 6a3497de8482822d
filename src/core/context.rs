use crate::domain::model::{PublisherMetadata, RequestContext};
use crate::domain::ports::CacheService;
use http::header::{HeaderMap, REFERER, USER_AGENT};
use std::borrow::Cow;
use url::Url;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Builds page/app context from request headers.
///
/// Never fails: missing or malformed headers leave the matching fields empty,
/// and cache lookups that fail just leave the publisher metadata unset.
pub struct ContextExtractor<'a, C: CacheService + ?Sized> {
    cache: &'a C,
    publisher_lookups: bool,
}

impl<'a, C: CacheService + ?Sized> ContextExtractor<'a, C> {
    pub fn new(cache: &'a C, publisher_lookups: bool) -> Self {
        Self {
            cache,
            publisher_lookups,
        }
    }

    pub fn extract(
        &self,
        headers: &HeaderMap,
        app_bundle: Option<&str>,
        account_id: Option<&str>,
    ) -> RequestContext {
        let effective_url = header_str(headers, REFERER.as_str()).into_owned();
        let registrable_domain = registrable_domain(&effective_url);

        let publisher = if self.publisher_lookups {
            self.lookup_publisher(&registrable_domain, app_bundle, account_id)
        } else {
            PublisherMetadata::default()
        };

        RequestContext {
            device_user_agent: header_str(headers, USER_AGENT.as_str()).into_owned(),
            device_ip: device_ip(headers),
            secure: header_str(headers, X_FORWARDED_PROTO).eq_ignore_ascii_case("https"),
            effective_url,
            registrable_domain,
            publisher,
        }
    }

    fn lookup_publisher(
        &self,
        domain: &str,
        app_bundle: Option<&str>,
        account_id: Option<&str>,
    ) -> PublisherMetadata {
        let mut metadata = PublisherMetadata::default();

        if !domain.is_empty() {
            metadata.domain = match self.cache.get_domain(domain) {
                Ok(info) => Some(info),
                Err(e) => {
                    tracing::debug!("Domain lookup for {} failed: {}", domain, e);
                    None
                }
            };
        }

        if let Some(bundle) = app_bundle {
            metadata.app = match self.cache.get_app(bundle) {
                Ok(info) => Some(info),
                Err(e) => {
                    tracing::debug!("App lookup for {} failed: {}", bundle, e);
                    None
                }
            };
        }

        if let Some(id) = account_id {
            metadata.account = match self.cache.get_account(id) {
                Ok(info) => Some(info),
                Err(e) => {
                    tracing::warn!("Account lookup for {} failed: {}", id, e);
                    None
                }
            };
        }

        metadata
    }
}

/// 取得 header 字串值，不存在時回傳空字串；非 UTF-8 位元組以替代字元保留
fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Cow<'h, str> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
        .unwrap_or(Cow::Borrowed(""))
}

fn device_ip(headers: &HeaderMap) -> String {
    let forwarded = header_str(headers, X_FORWARDED_FOR);
    let forwarded = forwarded
        .split(',')
        .next()
        .unwrap_or("")
        .trim();

    if !forwarded.is_empty() {
        return forwarded.to_string();
    }

    header_str(headers, X_REAL_IP).trim().to_string()
}

/// Reduces a URL's host to its registrable domain (public suffix plus one label).
///
/// Returns an empty string for malformed URLs, IP hosts, and hosts that are
/// themselves a public suffix.
pub fn registrable_domain(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("Cannot parse referer {:?}: {}", url, e);
            return String::new();
        }
    };

    parsed
        .domain()
        .map(|host| host.trim_end_matches('.'))
        .and_then(psl::domain_str)
        .map(str::to_string)
        .unwrap_or_default()
}
