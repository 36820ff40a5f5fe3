//! Bybit MarketDataProvider 구현.
//!
//! BybitClient를 래핑하여 카탈로그/시세 캐시와 캔들 재시도를 추가합니다.

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mover_core::{
    cache::{INSTRUMENTS_CACHE_KEY, TICKERS_CACHE_KEY},
    Candle, Instrument, KlineInterval, MarketCache, TickerEntry,
};
use tracing::{debug, info, warn};

use super::MarketDataProvider;
use crate::connector::bybit::{parse_candle, BybitClient, KlineQuery};
use crate::retry::{with_retry, RetryConfig};
use crate::ExchangeError;

/// 카탈로그 페이지네이션 상한. 초과하면 카탈로그 전체가 실패합니다.
const MAX_INSTRUMENT_PAGES: usize = 50;

/// Bybit 시장 데이터 Provider.
pub struct BybitMarketProvider {
    client: Arc<BybitClient>,
    cache: Arc<MarketCache>,
    retry: RetryConfig,
    quote_coin: String,
}

impl BybitMarketProvider {
    /// 새 Provider 생성 (기본 재시도: 3회, 300ms 고정 대기).
    pub fn new(client: Arc<BybitClient>, cache: Arc<MarketCache>) -> Self {
        Self {
            client,
            cache,
            retry: RetryConfig::default(),
            quote_coin: "USDT".to_string(),
        }
    }

    /// 캔들 조회 재시도 정책 교체.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// 카탈로그 결제 통화 필터 교체.
    pub fn with_quote_coin(mut self, quote_coin: impl Into<String>) -> Self {
        self.quote_coin = quote_coin.into().to_uppercase();
        self
    }

    #[cfg(test)]
    fn market_cache(&self) -> Arc<MarketCache> {
        Arc::clone(&self.cache)
    }

    async fn load_all_instruments(&self) -> Result<Vec<Instrument>, ExchangeError> {
        let mut instruments = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();

        for page_no in 1..=MAX_INSTRUMENT_PAGES {
            let page = self.client.get_instruments_page(cursor.as_deref()).await?;
            debug!(page = page_no, count = page.list.len(), "Bybit 종목 페이지 수신");

            for raw in page.list.iter().filter(|i| i.is_trading()) {
                if !raw.symbol.ends_with(&self.quote_coin) {
                    continue;
                }
                instruments.push(raw.to_instrument());
            }

            let Some(next) = page.next_page_cursor.filter(|c| !c.is_empty()) else {
                return Ok(instruments);
            };
            if !seen_cursors.insert(next.clone()) {
                warn!(cursor = %next, page = page_no, "종목 페이지 커서 반복");
                return Err(ExchangeError::ParseError(format!(
                    "instrument cursor loop at {next:?}"
                )));
            }
            cursor = Some(next);
        }

        warn!(max_pages = MAX_INSTRUMENT_PAGES, "종목 페이지 상한 도달");
        Err(ExchangeError::ParseError(format!(
            "instrument catalog exceeded {MAX_INSTRUMENT_PAGES} pages"
        )))
    }
}

// ==================== MarketDataProvider ====================

#[async_trait]
impl MarketDataProvider for BybitMarketProvider {
    async fn fetch_instruments(&self) -> Result<Vec<Instrument>, ExchangeError> {
        if let Some(cached) = self.cache.get_instruments().await {
            debug!(
                key = INSTRUMENTS_CACHE_KEY,
                count = cached.len(),
                "Bybit 종목 카탈로그 캐시 히트"
            );
            return Ok(cached);
        }

        let instruments = self.load_all_instruments().await?;
        info!(count = instruments.len(), quote = %self.quote_coin, "Bybit 종목 카탈로그 조회 완료");
        self.cache.set_instruments(instruments.clone()).await;
        Ok(instruments)
    }

    async fn fetch_tickers(&self) -> Result<Arc<Vec<TickerEntry>>, ExchangeError> {
        if let Some(cached) = self.cache.get_tickers().await {
            debug!(key = TICKERS_CACHE_KEY, count = cached.len(), "Bybit 시세 캐시 히트");
            return Ok(cached);
        }

        let page = self.client.get_tickers().await?;
        let entries: Vec<TickerEntry> = page
            .list
            .iter()
            .filter_map(|raw| match raw.to_entry() {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(symbol = %raw.symbol, error = %e, "시세 변환 실패, 건너뜀");
                    None
                }
            })
            .collect();

        let entries = Arc::new(entries);
        self.cache.set_tickers(Arc::clone(&entries)).await;
        Ok(entries)
    }

    async fn fetch_kline_at(
        &self,
        symbol: &str,
        interval: KlineInterval,
        target: DateTime<Utc>,
    ) -> Option<Candle> {
        let query = KlineQuery {
            symbol: symbol.to_string(),
            interval,
            start: Some(target.timestamp_millis()),
            limit: 1,
        };

        let result = with_retry(&self.retry, || async {
            let page = self.client.get_kline(&query).await?;
            // 빈 목록은 확정적인 "데이터 없음"이므로 재시도하지 않음
            page.list.first().map(|row| parse_candle(row)).transpose()
        })
        .await;

        match result {
            Ok(Some(candle)) => Some(candle),
            Ok(None) => {
                debug!(symbol, interval = %interval, "캔들 데이터 없음");
                None
            }
            Err(e) => {
                warn!(symbol, interval = %interval, error = %e, "캔들 조회 실패, 심볼 건너뜀");
                None
            }
        }
    }

    async fn fetch_kline_series(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: u32,
    ) -> Result<Vec<Candle>, ExchangeError> {
        let query = KlineQuery {
            symbol: symbol.to_string(),
            interval,
            start: None,
            limit,
        };

        let mut candles = with_retry(&self.retry, || async {
            let page = self.client.get_kline(&query).await?;
            page.list
                .iter()
                .map(|row| parse_candle(row))
                .collect::<Result<Vec<_>, _>>()
        })
        .await?;

        // 거래소는 최신순으로 반환
        candles.sort_by_key(|c| c.time);
        debug!(symbol, interval = %interval, count = candles.len(), "차트 캔들 조회 완료");
        Ok(candles)
    }

    fn provider_name(&self) -> &str {
        "bybit"
    }
}
