//! 심볼별 변동률 계산.
//!
//! 24시간 조회는 거래소의 24시간 변동률을 그대로 사용하고,
//! 그 외 기간은 현재가와 과거 캔들 종가를 비교합니다.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mover_core::{Candle, ChangeRecord, SkipReason, SymbolOutcome, TickerEntry};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::window::AnalysisWindow;

/// 변동률 표시 소수 자릿수.
pub const PERCENT_SCALE: u32 = 2;

/// 소수 둘째 자리 반올림 (0.5는 0에서 먼 쪽으로).
pub fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// 24시간 변동 비율 → 퍼센트 (0.0534 → 5.34).
pub fn ticker_change_percent(price_24h_pcnt: Decimal) -> Decimal {
    round_percent(price_24h_pcnt * dec!(100))
}

/// 기준 종가 대비 변동률. 기준 가격이 0이면 `None`.
pub fn candle_change_percent(current: Decimal, reference: Decimal) -> Option<Decimal> {
    if reference.is_zero() {
        return None;
    }
    Some(round_percent((current - reference) / reference * dec!(100)))
}

/// 조회 구간 시작 이후 상장 여부. 상장 시각 0(미상)은 제외하지 않습니다.
pub fn listed_after_cutoff(launch_time_ms: i64, cutoff: DateTime<Utc>) -> bool {
    launch_time_ms != 0 && launch_time_ms > cutoff.timestamp_millis()
}

/// 시세 스냅샷을 심볼로 색인.
pub fn index_tickers(tickers: &[TickerEntry]) -> HashMap<&str, &TickerEntry> {
    tickers.iter().map(|t| (t.symbol.as_str(), t)).collect()
}

/// 24시간 경로: 시세 스냅샷만으로 계산.
pub fn evaluate_ticker_path(symbol: &str, ticker: Option<&TickerEntry>) -> SymbolOutcome {
    match ticker {
        Some(ticker) => SymbolOutcome::Priced(ChangeRecord::new(
            symbol,
            ticker_change_percent(ticker.price_24h_pcnt),
        )),
        None => SymbolOutcome::skipped(symbol, SkipReason::MissingTicker),
    }
}

/// 캔들 경로: 현재가와 기준 캔들 종가 비교.
pub fn evaluate_candle_path(
    symbol: &str,
    ticker: Option<&TickerEntry>,
    candle: Option<&Candle>,
    window: &AnalysisWindow,
) -> SymbolOutcome {
    let Some(candle) = candle else {
        return SymbolOutcome::skipped(symbol, SkipReason::NoCandle);
    };
    if !window.accepts(candle) {
        return SymbolOutcome::skipped(symbol, SkipReason::StaleCandle);
    }
    let Some(ticker) = ticker else {
        return SymbolOutcome::skipped(symbol, SkipReason::MissingTicker);
    };

    match candle_change_percent(ticker.last_price, candle.close) {
        Some(change) => SymbolOutcome::Priced(ChangeRecord::new(symbol, change)),
        None => SymbolOutcome::skipped(symbol, SkipReason::ZeroReference),
    }
}
