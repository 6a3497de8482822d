use crate::config::toml_config::TomlConfig;
use crate::config::NormalizerSettings;
use crate::utils::error::{NormalizeError, Result};
use crate::utils::validation::{validate_path, validate_positive_number, Validate};
use clap::Parser;
use http::header::{HeaderMap, HeaderName, HeaderValue, REFERER, USER_AGENT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "auction-normalizer")]
#[command(about = "Normalize auction requests into per-bidder batches")]
pub struct CliConfig {
    /// Request body files (JSON)
    #[arg(required = true)]
    pub requests: Vec<String>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<String>,

    /// Cache file with domains, apps, accounts and bidder configs
    #[arg(long)]
    pub cache: Option<String>,

    #[arg(long)]
    pub referer: Option<String>,

    #[arg(long)]
    pub user_agent: Option<String>,

    /// Extra request header, e.g. "X-Forwarded-For: 203.0.113.7"
    #[arg(long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    #[arg(long)]
    pub concurrent_requests: Option<usize>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 組出每個請求共用的 headers
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        for raw in &self.headers {
            let (name, value) = parse_header(raw)?;
            headers.append(name, value);
        }

        if let Some(referer) = &self.referer {
            headers.insert(REFERER, header_value("referer", referer)?);
        }

        if let Some(user_agent) = &self.user_agent {
            headers.insert(USER_AGENT, header_value("user_agent", user_agent)?);
        }

        Ok(headers)
    }

    /// 命令列參數優先於 TOML 配置
    pub fn settings(&self, file_config: Option<&TomlConfig>) -> NormalizerSettings {
        let mut settings = file_config
            .map(TomlConfig::settings)
            .unwrap_or_default();

        if let Some(concurrent) = self.concurrent_requests {
            settings.concurrent_requests = concurrent;
        }

        settings
    }

    pub fn cache_path<'a>(&'a self, file_config: Option<&'a TomlConfig>) -> Option<&'a str> {
        self.cache
            .as_deref()
            .or_else(|| file_config.and_then(TomlConfig::cache_path))
    }
}

fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| NormalizeError::InvalidConfigValueError {
            field: "header".to_string(),
            value: raw.to_string(),
            reason: "Expected \"Name: value\"".to_string(),
        })?;

    let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| {
        NormalizeError::InvalidConfigValueError {
            field: "header".to_string(),
            value: raw.to_string(),
            reason: format!("Invalid header name: {}", e),
        }
    })?;

    Ok((name, header_value("header", value.trim())?))
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| NormalizeError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: format!("Invalid header value: {}", e),
    })
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        for path in &self.requests {
            validate_path("requests", path)?;
        }

        if let Some(path) = &self.cache {
            validate_path("cache", path)?;
        }

        if let Some(path) = &self.config {
            validate_path("config", path)?;
        }

        if let Some(concurrent) = self.concurrent_requests {
            validate_positive_number("concurrent_requests", concurrent as u64, 1)?;
        }

        self.header_map().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        CliConfig::parse_from(std::iter::once("auction-normalizer").chain(args.iter().copied()))
    }

    #[test]
    fn test_header_map() {
        let config = parse(&[
            "request.json",
            "--referer",
            "http://nytimes.com/cool.html",
            "--user-agent",
            "Mozilla/",
            "--header",
            "X-Forwarded-For: 203.0.113.7",
        ]);

        let headers = config.header_map().unwrap();
        assert_eq!(headers.get(REFERER).unwrap(), "http://nytimes.com/cool.html");
        assert_eq!(headers.get(USER_AGENT).unwrap(), "Mozilla/");
        assert_eq!(headers.get("x-forwarded-for").unwrap(), "203.0.113.7");
    }

    #[test]
    fn test_invalid_header_rejected() {
        let config = parse(&["request.json", "--header", "no-colon-here"]);
        assert!(config.header_map().is_err());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_overrides_file_settings() {
        let file_config = TomlConfig::from_toml_str(
            r#"
[request]
default_timeout_ms = 700

[cache]
path = "from-file.toml"

[runtime]
concurrent_requests = 2
"#,
        )
        .unwrap();

        let config = parse(&["request.json", "--concurrent-requests", "6"]);
        let settings = config.settings(Some(&file_config));
        assert_eq!(settings.default_timeout_ms, 700);
        assert_eq!(settings.concurrent_requests, 6);
        assert_eq!(config.cache_path(Some(&file_config)), Some("from-file.toml"));

        let config = parse(&["request.json", "--cache", "from-cli.toml"]);
        assert_eq!(config.cache_path(Some(&file_config)), Some("from-cli.toml"));
        assert_eq!(config.settings(Some(&file_config)).concurrent_requests, 2);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = parse(&["request.json", "--concurrent-requests", "0"]);
        assert!(config.validate().is_err());
    }
}
