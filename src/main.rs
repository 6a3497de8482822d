use anyhow::Context;
use auction_normalizer::app::runner::normalize_files;
use auction_normalizer::utils::error::ErrorCategory;
use auction_normalizer::utils::{logger, validation::Validate};
use auction_normalizer::{CacheService, CliConfig, MemoryCache, RequestNormalizer, TomlConfig};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 載入 TOML 配置（可選）
    let file_config = match &config.config {
        Some(path) => Some(
            TomlConfig::from_file(path)
                .with_context(|| format!("Failed to load config file '{}'", path))?,
        ),
        None => None,
    };

    // 初始化日誌
    let json_logs = config.json_logs || file_config.as_ref().is_some_and(TomlConfig::json_logs);
    if json_logs {
        let level = if config.verbose {
            "debug"
        } else {
            file_config.as_ref().map_or("info", TomlConfig::log_level)
        };
        logger::init_json_logger(level);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting auction-normalizer");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    let validation = config
        .validate()
        .and_then(|_| file_config.as_ref().map_or(Ok(()), |c| c.validate()));
    if let Err(e) = validation {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let settings = config.settings(file_config.as_ref());
    let headers = config.header_map()?;

    let cache = match config.cache_path(file_config.as_ref()) {
        Some(path) => {
            tracing::info!("📁 Loading cache from: {}", path);
            MemoryCache::from_file(path)
                .with_context(|| format!("Failed to load cache file '{}'", path))?
        }
        None => {
            tracing::warn!("No cache file given, config_id lookups will fail");
            MemoryCache::new()
        }
    };

    let normalizer = Arc::new(RequestNormalizer::new(cache, settings));
    let outcomes = normalize_files(Arc::clone(&normalizer), config.requests.clone(), headers).await;
    normalizer.cache().close();

    let mut worst: Option<ErrorCategory> = None;
    for outcome in outcomes {
        match outcome.result {
            Ok(request) => {
                tracing::info!(
                    "✅ {}: {} bidder batches",
                    outcome.source,
                    request.bidders.len()
                );
                println!("{}", serde_json::to_string_pretty(&request)?);
            }
            Err(e) => {
                tracing::error!(
                    "❌ {} failed: {} (Category: {:?})",
                    outcome.source,
                    e,
                    e.category()
                );
                eprintln!("❌ {}: {}", outcome.source, e);
                eprintln!("💡 建議: {}", e.recovery_suggestion());
                worst = worst.max(Some(e.category()));
            }
        }
    }

    // 根據最嚴重的錯誤類別決定退出碼
    if let Some(category) = worst {
        let exit_code = match category {
            ErrorCategory::Request | ErrorCategory::AdUnit => 2,
            ErrorCategory::Config => 1,
            ErrorCategory::Cache => 3,
            ErrorCategory::System => 4,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}
