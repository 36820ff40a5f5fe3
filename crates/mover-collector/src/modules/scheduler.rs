//! 동시성 제한 작업 스케줄러.
//!
//! 작업 목록을 최대 `limit`개씩 동시에 처리합니다.
//! 개별 작업의 실패나 빈 결과는 결과에서 빠질 뿐 다른 작업을 중단시키지 않습니다.

use std::{fmt::Display, future::Future};

use futures::{stream, StreamExt};
use tracing::debug;

/// 진행률 콜백 `(processed, total)`.
pub type ProgressFn<'a> = &'a (dyn Fn(usize, usize) + Send + Sync);

/// 동시성 제한 하에 모든 항목 처리.
///
/// - `work`는 항목마다 정확히 한 번 호출됩니다.
/// - `on_progress`는 완료될 때마다 호출되며 `processed`는 1부터 `total`까지 증가합니다.
/// - `Ok(Some(_))`만 결과에 포함되며 결과 순서는 보장되지 않습니다.
/// - `limit`이 0이거나 항목이 없으면 아무 작업 없이 빈 결과를 반환합니다.
pub async fn process_with_concurrency<T, R, E, F, Fut>(
    items: Vec<T>,
    limit: usize,
    work: F,
    on_progress: Option<ProgressFn<'_>>,
) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<Option<R>, E>>,
    E: Display,
{
    let total = items.len();
    if limit == 0 || total == 0 {
        return Vec::new();
    }

    let mut in_flight = stream::iter(items).map(work).buffer_unordered(limit.min(total));

    let mut results = Vec::with_capacity(total);
    let mut processed = 0;
    while let Some(outcome) = in_flight.next().await {
        processed += 1;
        match outcome {
            Ok(Some(result)) => results.push(result),
            Ok(None) => {}
            Err(e) => debug!(error = %e, "작업 실패, 결과에서 제외"),
        }
        if let Some(callback) = on_progress {
            callback(processed, total);
        }
    }

    results
}
