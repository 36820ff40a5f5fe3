//! 거래소 중립 시장 데이터 Provider.
//!
//! 분석 파이프라인은 [`MarketDataProvider`] trait만 알고 있으며,
//! 캐시와 재시도는 구현체가 담당합니다.
//!
//! - [`BybitMarketProvider`]: Bybit v5 공개 API 구현

mod bybit;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mover_core::{Candle, Instrument, KlineInterval, TickerEntry};

use crate::ExchangeError;

pub use bybit::BybitMarketProvider;

/// 시장 데이터 조회 인터페이스.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// 거래 가능한 종목 카탈로그.
    ///
    /// 페이지 조회 중 하나라도 실패하면 전체가 실패하며 부분 결과는 캐시되지 않습니다.
    async fn fetch_instruments(&self) -> Result<Vec<Instrument>, ExchangeError>;

    /// 전체 시세 스냅샷. 유효 기간 동안 모든 호출자가 같은 배열을 공유합니다.
    async fn fetch_tickers(&self) -> Result<Arc<Vec<TickerEntry>>, ExchangeError>;

    /// `target` 시각 부근에서 시작하는 캔들 1개.
    ///
    /// 재시도 소진이나 데이터 없음은 `None`으로 반환되며 에러를 올리지 않습니다.
    async fn fetch_kline_at(
        &self,
        symbol: &str,
        interval: KlineInterval,
        target: DateTime<Utc>,
    ) -> Option<Candle>;

    /// 차트용 캔들 시계열 (시간 오름차순). 재시도 소진 시 에러를 반환합니다.
    async fn fetch_kline_series(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: u32,
    ) -> Result<Vec<Candle>, ExchangeError>;

    /// Provider 이름.
    fn provider_name(&self) -> &str;
}
