//! 공용 캐시 인프라.
//!
//! 종목 카탈로그와 시세 스냅샷 조회에서 공통으로 사용하는 TTL 기반 캐시를 제공합니다.
//!
//! # 구조
//!
//! ```text
//! Clock                // 현재 시각 공급자 (SystemClock / ManualClock)
//! TtlCache<T>          // 범용 TTL 캐시 (시계 주입)
//! MarketCache          // 시장 데이터 전용 캐시 묶음
//! ├── instruments      // 종목 카탈로그 (기본 1시간)
//! └── tickers          // 전체 시세 스냅샷 (기본 15초)
//! ```
//!
//! 만료는 다음 조회 시점에만 판단하며 백그라운드 정리 작업은 없습니다.
//! 값은 `now - cached_at < ttl` 인 동안에만 유효합니다.

use std::{
    fmt,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{Instrument, TickerEntry};

// ==================== Clock ====================

/// 현재 시각 공급자.
///
/// 캐시 만료와 분석 기준 시각 계산에 사용됩니다.
/// 테스트에서는 [`ManualClock`]을 주입하여 시간을 직접 제어합니다.
pub trait Clock: Send + Sync + fmt::Debug {
    /// 현재 UTC 시각.
    fn now(&self) -> DateTime<Utc>;
}

/// 시스템 시계.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 수동으로 진행시키는 시계 (테스트/재현용).
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// 지정 시각에서 멈춰 있는 시계 생성.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// 시계를 `delta`만큼 진행.
    pub fn advance(&self, delta: Duration) {
        self.millis
            .fetch_add(delta.as_millis() as i64, Ordering::SeqCst);
    }

    /// 시계를 특정 시각으로 설정.
    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

// ==================== TtlCache<T> ====================

/// TTL 기반 범용 캐시.
///
/// 지정된 TTL(Time-To-Live)이 지나면 `get()`이 `None`을 반환하고,
/// `set()`으로 새 값을 저장합니다.
///
/// # 스레드 안전성
///
/// 내부적으로 `RwLock`을 사용하므로 확인-후-덮어쓰기 과정에서 찢어진 읽기가 없습니다.
/// 만료 직후 두 호출자가 동시에 네트워크 조회를 수행할 수는 있으며,
/// 마지막 `set()`이 이깁니다.
pub struct TtlCache<T> {
    data: RwLock<Option<TtlEntry<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

/// 캐시 내부 저장 항목.
struct TtlEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

impl<T: Clone + Send + Sync> TtlCache<T> {
    /// 주어진 시계를 사용하는 빈 캐시 생성.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            data: RwLock::new(None),
            ttl,
            clock,
        }
    }

    /// 캐시된 값 조회.
    ///
    /// TTL이 만료되었으면 `None`을 반환합니다.
    pub async fn get(&self) -> Option<T> {
        let guard = self.data.read().await;
        guard.as_ref().and_then(|entry| {
            if self.is_fresh(entry) {
                Some(entry.data.clone())
            } else {
                None
            }
        })
    }

    /// 값을 캐시에 저장.
    ///
    /// 기존 값이 있으면 덮어씁니다.
    pub async fn set(&self, data: T) {
        let mut guard = self.data.write().await;
        *guard = Some(TtlEntry {
            data,
            cached_at: self.clock.now(),
        });
    }

    fn elapsed(&self, entry: &TtlEntry<T>) -> Duration {
        // 시계가 뒤로 간 경우 경과 시간 0으로 취급
        (self.clock.now() - entry.cached_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    fn is_fresh(&self, entry: &TtlEntry<T>) -> bool {
        self.elapsed(entry) < self.ttl
    }
}

impl<T> fmt::Debug for TtlCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache").field("ttl", &self.ttl).finish()
    }
}

// ==================== MarketCache ====================

/// 종목 카탈로그 캐시 키 (엔드포인트 + 고정 쿼리).
pub const INSTRUMENTS_CACHE_KEY: &str = "/v5/market/instruments-info?category=linear&limit=1000";

/// 시세 스냅샷 캐시 키 (엔드포인트 + 고정 쿼리).
pub const TICKERS_CACHE_KEY: &str = "/v5/market/tickers?category=linear";

/// 시장 캐시 설정.
#[derive(Debug, Clone)]
pub struct MarketCacheConfig {
    /// 종목 카탈로그 TTL
    pub instruments_ttl: Duration,
    /// 시세 스냅샷 TTL
    pub tickers_ttl: Duration,
}

impl Default for MarketCacheConfig {
    fn default() -> Self {
        Self {
            instruments_ttl: Duration::from_secs(3600),
            tickers_ttl: Duration::from_secs(15),
        }
    }
}

/// 시장 데이터 공용 캐시.
///
/// 요청 시그니처별로 하나의 슬롯을 가집니다
/// ([`INSTRUMENTS_CACHE_KEY`], [`TICKERS_CACHE_KEY`]).
/// 한 번 생성하여 조회기(fetcher)들에 참조로 전달합니다.
pub struct MarketCache {
    /// 종목 카탈로그 캐시
    instruments: TtlCache<Vec<Instrument>>,
    /// 시세 스냅샷 캐시
    tickers: TtlCache<Arc<Vec<TickerEntry>>>,
}

impl MarketCache {
    /// 설정과 시계 기반 캐시 생성.
    pub fn new(config: MarketCacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            instruments: TtlCache::with_clock(config.instruments_ttl, Arc::clone(&clock)),
            tickers: TtlCache::with_clock(config.tickers_ttl, clock),
        }
    }

    // ===== 종목 카탈로그 =====

    /// 캐시된 종목 카탈로그 조회.
    pub async fn get_instruments(&self) -> Option<Vec<Instrument>> {
        self.instruments.get().await
    }

    /// 종목 카탈로그 캐시 저장.
    pub async fn set_instruments(&self, data: Vec<Instrument>) {
        self.instruments.set(data).await;
    }

    // ===== 시세 스냅샷 =====

    /// 캐시된 시세 스냅샷 조회.
    ///
    /// TTL 동안 모든 호출자가 같은 배열을 공유합니다.
    pub async fn get_tickers(&self) -> Option<Arc<Vec<TickerEntry>>> {
        self.tickers.get().await
    }

    /// 시세 스냅샷 캐시 저장.
    pub async fn set_tickers(&self, data: Arc<Vec<TickerEntry>>) {
        self.tickers.set(data).await;
    }
}

impl fmt::Debug for MarketCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketCache")
            .field("instruments", &self.instruments)
            .field("tickers", &self.tickers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;

    fn manual_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn ttl_cache_basic_operations() {
        let clock = manual_clock();
        let cache: TtlCache<String> = TtlCache::with_clock(Duration::from_secs(10), clock.clone());

        assert!(cache.get().await.is_none());

        cache.set("hello".to_string()).await;
        assert_eq!(cache.get().await, Some("hello".to_string()));

        clock.advance(Duration::from_secs(4));
        assert_eq!(cache.get().await, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn ttl_cache_expires_exactly_at_ttl() {
        let clock = manual_clock();
        let cache: TtlCache<i32> = TtlCache::with_clock(Duration::from_secs(15), clock.clone());

        cache.set(42).await;
        clock.advance(Duration::from_millis(14_999));
        assert_eq!(cache.get().await, Some(42));

        // now - cached_at == ttl 이면 만료
        clock.advance(Duration::from_millis(1));
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn ttl_cache_overwrite_restarts_ttl() {
        let clock = manual_clock();
        let cache: TtlCache<String> = TtlCache::with_clock(Duration::from_secs(10), clock.clone());

        cache.set("first".to_string()).await;
        clock.advance(Duration::from_secs(8));
        cache.set("second".to_string()).await;
        clock.advance(Duration::from_secs(8));
        assert_eq!(cache.get().await, Some("second".to_string()));
    }

    #[tokio::test]
    async fn ttl_cache_survives_clock_going_backwards() {
        let clock = manual_clock();
        let cache: TtlCache<i32> = TtlCache::with_clock(Duration::from_secs(15), clock.clone());

        cache.set(7).await;
        clock.set(Utc.with_ymd_and_hms(2025, 3, 1, 11, 59, 0).unwrap());
        assert_eq!(cache.get().await, Some(7));
    }

    #[tokio::test]
    async fn market_cache_slots_expire_independently() {
        let clock = manual_clock();
        let cache = MarketCache::new(MarketCacheConfig::default(), clock.clone());

        cache
            .set_instruments(vec![Instrument {
                symbol: "BTCUSDT".to_string(),
                launch_time: 1_585_526_400_000,
                tick_size: dec!(0.10),
            }])
            .await;
        cache
            .set_tickers(Arc::new(vec![TickerEntry {
                symbol: "BTCUSDT".to_string(),
                last_price: dec!(65000),
                price_24h_pcnt: dec!(0.0123),
            }]))
            .await;

        clock.advance(Duration::from_secs(16));
        assert!(cache.get_tickers().await.is_none());
        assert_eq!(cache.get_instruments().await.map(|v| v.len()), Some(1));

        clock.advance(Duration::from_secs(3600));
        assert!(cache.get_instruments().await.is_none());
    }
}
