use crate::domain::model::{AdUnitSpec, Demand, InlineBid, Size};
use crate::utils::error::{NormalizeError, Result};
use crate::utils::validation::is_blank;
use serde::Deserialize;

/// Top-level auction request body as sent by the page or app.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAuctionRequest {
    #[serde(default)]
    pub tid: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub timeout_millis: i64,
    #[serde(default)]
    pub secure: i64,
    #[serde(default)]
    pub is_debug: bool,
    #[serde(default)]
    pub app: Option<RawApp>,
    #[serde(default)]
    pub ad_units: Vec<RawAdUnit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawApp {
    #[serde(default)]
    pub bundle: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAdUnit {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub sizes: Vec<Size>,
    #[serde(default, alias = "bidders")]
    pub bids: Option<Vec<InlineBid>>,
    #[serde(default)]
    pub config_id: Option<String>,
}

impl RawAuctionRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| NormalizeError::malformed(e.to_string()))
    }

    pub fn app_bundle(&self) -> Option<&str> {
        self.app
            .as_ref()
            .map(|app| app.bundle.as_str())
            .filter(|bundle| !is_blank(bundle))
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref().filter(|id| !is_blank(id))
    }
}

impl RawAdUnit {
    /// 檢查 ad unit 並轉成單一需求來源
    pub fn into_spec(self) -> Result<AdUnitSpec> {
        if is_blank(&self.code) {
            return Err(NormalizeError::invalid_ad_unit(&self.code, "code is blank"));
        }

        if self.sizes.is_empty() {
            return Err(NormalizeError::invalid_ad_unit(
                &self.code,
                "at least one size is required",
            ));
        }

        // 空字串的 config_id 等同未提供
        let config_id = self.config_id.filter(|id| !is_blank(id));

        let demand = match (self.bids, config_id) {
            (Some(bids), None) => Demand::InlineBids(bids),
            (None, Some(config_id)) => Demand::ConfigRef(config_id),
            (Some(_), Some(_)) => {
                return Err(NormalizeError::invalid_ad_unit(
                    &self.code,
                    "both bids and config_id are present",
                ))
            }
            (None, None) => {
                return Err(NormalizeError::invalid_ad_unit(
                    &self.code,
                    "neither bids nor config_id is present",
                ))
            }
        };

        Ok(AdUnitSpec {
            code: self.code,
            sizes: self.sizes,
            demand,
        })
    }
}
