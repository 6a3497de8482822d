use crate::core::normalizer::RequestNormalizer;
use crate::core::{CacheService, ConfigProvider, NormalizedAuctionRequest};
use crate::utils::error::{NormalizeError, Result};
use http::HeaderMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// 單一請求檔案的處理結果
#[derive(Debug)]
pub struct RequestOutcome {
    pub source: String,
    pub result: Result<NormalizedAuctionRequest>,
}

/// Normalizes each request file on the blocking pool, at most
/// `concurrent_requests` at a time. Outcomes come back in input order and
/// one failing file does not affect the others.
pub async fn normalize_files<C, P>(
    normalizer: Arc<RequestNormalizer<C, P>>,
    files: Vec<String>,
    headers: HeaderMap,
) -> Vec<RequestOutcome>
where
    C: CacheService + 'static,
    P: ConfigProvider + 'static,
{
    let limit = normalizer.config().concurrent_requests().max(1);
    let semaphore = Arc::new(Semaphore::new(limit));
    let headers = Arc::new(headers);

    tracing::debug!("Normalizing {} files with {} workers", files.len(), limit);

    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            let normalizer = Arc::clone(&normalizer);
            let semaphore = Arc::clone(&semaphore);
            let headers = Arc::clone(&headers);
            let source = path.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire().await.map_err(|_| NormalizeError::WorkerError {
                    message: "worker semaphore closed".to_string(),
                })?;

                let body = tokio::fs::read(&path).await?;
                let request =
                    tokio::task::spawn_blocking(move || normalizer.normalize(&body, &headers))
                        .await
                        .map_err(|e| NormalizeError::WorkerError {
                            message: e.to_string(),
                        })??;
                Ok::<_, NormalizeError>(request)
            });

            (source, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (source, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(NormalizeError::WorkerError {
                message: e.to_string(),
            }),
        };

        outcomes.push(RequestOutcome { source, result });
    }

    outcomes
}
