//! 거래소 API 재시도 유틸리티.
//!
//! 네트워크 오류, HTTP 오류, API 에러 코드 등 일시적인 실패에 대해 자동 재시도를 수행합니다.
//! 재시도 횟수와 대기 시간 계산은 [`RetryConfig`]에 모여 있어
//! 호출부를 수정하지 않고 백오프 전략을 바꿀 수 있습니다.
//!
//! # 예시
//!
//! ```rust,ignore
//! use mover_exchange::retry::{with_retry, RetryConfig};
//!
//! let config = RetryConfig::default(); // 3회 시도, 300ms 고정 대기
//! let candles = with_retry(&config, || async {
//!     client.get_kline(&query).await
//! }).await?;
//! ```

use std::{future::Future, time::Duration};

use tracing::{debug, warn};

use crate::ExchangeError;

/// 재시도 설정.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 최대 시도 횟수 (초기 시도 포함, 최소 1).
    pub max_attempts: u32,
    /// 기본 대기 시간.
    pub base_delay: Duration,
    /// 최대 대기 시간.
    pub max_delay: Duration,
    /// 지수 백오프 사용 여부 (false면 고정 대기).
    pub use_exponential_backoff: bool,
    /// 백오프 배수 (지수 백오프 시 사용).
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::fixed(3, Duration::from_millis(300))
    }
}

impl RetryConfig {
    /// 고정 간격 재시도.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay: delay,
            max_delay: delay,
            use_exponential_backoff: false,
            backoff_multiplier: 1.0,
        }
    }

    /// 지수 백오프 재시도.
    pub fn exponential(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            use_exponential_backoff: true,
            backoff_multiplier: 2.0,
        }
    }

    /// `attempt`번째 실패(0부터) 이후 대기 시간.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay = if self.use_exponential_backoff && attempt > 0 {
            let multiplier = self.backoff_multiplier.powi(attempt as i32);
            Duration::from_secs_f64(self.base_delay.as_secs_f64() * multiplier)
        } else {
            self.base_delay
        };

        delay.min(self.max_delay.max(self.base_delay))
    }
}

/// 재시도가 포함된 비동기 작업 실행.
///
/// # Returns
/// * `Ok(T)` - 작업 성공 결과
/// * `Err(ExchangeError)` - 재시도 불가 에러, 또는 시도 횟수 소진 후 마지막 에러
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, operation: F) -> Result<T, ExchangeError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ExchangeError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(attempts = attempt + 1, "재시도 후 성공");
                }
                return Ok(result);
            }
            Err(e) => {
                if !e.is_retryable() {
                    debug!(error = %e, "재시도 불가능한 에러, 즉시 실패 반환");
                    return Err(e);
                }

                if attempt + 1 >= max_attempts {
                    warn!(
                        error = %e,
                        attempts = attempt + 1,
                        "최대 시도 횟수 초과"
                    );
                    return Err(e);
                }

                let delay = config.calculate_delay(attempt);
                debug!(
                    error = %e,
                    attempt = attempt + 1,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "재시도 대기 중"
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
